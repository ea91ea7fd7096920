use std::collections::{HashMap, HashSet, VecDeque};

use foldertally_scan::{ListingError, MemoryListing, ScanConfig, TreeScanner};
use proptest::prelude::*;

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_root_with_one_subfolder() {
    let mut listing = MemoryListing::new();
    listing
        .add_file("", "/one.txt")
        .add_file("", "/two.txt")
        .add_folder("", "/A")
        .add_file("/A", "/A/x")
        .add_file("/A", "/A/y")
        .add_file("/A", "/A/z");

    let report = TreeScanner::new(listing).scan(&ScanConfig::new(""));

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].path(), "/");
    assert_eq!(report.records[0].file_count(), 2);
    assert_eq!(report.records[1].path(), "/A");
    assert_eq!(report.records[1].file_count(), 3);
}

#[test]
fn test_failed_folder_is_not_descended() {
    let mut listing = MemoryListing::new();
    listing
        .add_folder("", "/A")
        .add_folder("/A", "/A/hidden")
        .add_file("/A/hidden", "/A/hidden/f")
        .fail_listing("/A", ListingError::status(409, "path/not_found/"));

    let scanner = TreeScanner::new(listing);
    let report = scanner.scan(&ScanConfig::default());

    assert_eq!(report.records.len(), 2);
    let failed = &report.records[1];
    assert_eq!(failed.path(), "/A");
    assert_eq!(failed.file_count(), -1);
    assert_eq!(
        failed.error(),
        Some("Provider returned status 409: path/not_found/")
    );
    assert!(!scanner.client().listed_paths().contains(&"/A/hidden".to_string()));
}

#[test]
fn test_scan_of_subtree() {
    let mut listing = MemoryListing::new();
    listing
        .add_folder("", "/work")
        .add_file("/work", "/work/a")
        .add_folder("", "/play")
        .add_file("/play", "/play/b");

    let report = TreeScanner::new(listing).scan(&ScanConfig::new("work/"));

    assert_eq!(report.root, "/work");
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].path(), "/work");
    assert_eq!(report.totals.total_files, 1);
}

// =============================================================================
// Properties
// =============================================================================

/// A generated tree: folder paths with their files and subfolders.
#[derive(Debug, Clone)]
struct Tree {
    folders: Vec<String>,
    files: HashMap<String, u64>,
    subfolders: HashMap<String, Vec<String>>,
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), 0usize..4), 0..40).prop_map(
        |nodes| {
            const NAMES: [&str; 4] = ["a", "B", "c", "D"];
            let mut tree = Tree {
                folders: vec![String::new()],
                files: HashMap::from([(String::new(), 0)]),
                subfolders: HashMap::new(),
            };
            for (i, (parent, is_folder, name)) in nodes.into_iter().enumerate() {
                let parent = tree.folders[parent.index(tree.folders.len())].clone();
                if is_folder {
                    let path = format!("{parent}/{}{i}", NAMES[name]);
                    tree.subfolders.entry(parent).or_default().push(path.clone());
                    tree.files.insert(path.clone(), 0);
                    tree.folders.push(path);
                } else {
                    *tree.files.entry(parent).or_default() += 1;
                }
            }
            tree
        },
    )
}

fn build_listing(tree: &Tree, failing: &HashSet<String>, page_size: usize) -> MemoryListing {
    let mut listing = MemoryListing::new().with_page_size(page_size);
    for folder in &tree.folders {
        for n in 0..tree.files[folder] {
            listing.add_file(folder, &format!("{folder}/file{n}"));
        }
        for sub in tree.subfolders.get(folder).into_iter().flatten() {
            listing.add_folder(folder, sub);
        }
        if failing.contains(folder) {
            listing.fail_listing(folder, ListingError::transport("unreachable"));
        }
    }
    listing
}

/// Folders reachable from the root without listing through a failed folder.
fn reachable(tree: &Tree, failing: &HashSet<String>) -> Vec<String> {
    let mut seen = Vec::new();
    let mut queue = VecDeque::from([String::new()]);
    while let Some(path) = queue.pop_front() {
        if !failing.contains(&path) {
            queue.extend(tree.subfolders.get(&path).into_iter().flatten().cloned());
        }
        seen.push(path);
    }
    seen
}

proptest! {
    #[test]
    fn prop_records_match_reachable_folders(
        tree in arb_tree(),
        fail_mask in prop::collection::vec(any::<bool>(), 40),
        page_size in 1usize..5,
    ) {
        let failing: HashSet<String> = tree
            .folders
            .iter()
            .zip(fail_mask.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, fail)| **fail)
            .map(|(path, _)| path.clone())
            .collect();

        let listing = build_listing(&tree, &failing, page_size);
        let report = TreeScanner::new(listing).scan(&ScanConfig::default());
        let expected = reachable(&tree, &failing);

        prop_assert_eq!(report.records.len(), expected.len());

        let unique: HashSet<&str> = report.records.iter().map(|r| r.path()).collect();
        prop_assert_eq!(unique.len(), report.records.len());

        let expected_files: u64 = expected
            .iter()
            .filter(|p| !failing.contains(*p))
            .map(|p| tree.files[p])
            .sum();
        prop_assert_eq!(report.totals.total_files, expected_files);

        let summed: i64 = report
            .records
            .iter()
            .filter(|r| r.file_count() >= 0)
            .map(|r| r.file_count())
            .sum();
        prop_assert_eq!(summed as u64, report.totals.total_files);
    }

    #[test]
    fn prop_records_sorted_case_insensitively(tree in arb_tree(), page_size in 1usize..5) {
        let listing = build_listing(&tree, &HashSet::new(), page_size);
        let report = TreeScanner::new(listing).scan(&ScanConfig::default());

        for pair in report.records.windows(2) {
            prop_assert!(pair[0].path().to_lowercase() <= pair[1].path().to_lowercase());
        }
    }
}
