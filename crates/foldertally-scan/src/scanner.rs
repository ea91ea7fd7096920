//! Breadth-first folder scanner.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use foldertally_core::{
    EntryKind, FolderRecord, ListedEntry, ListingClient, ListingError, ScanConfig, ScanReport,
    compare_paths,
};

use crate::progress::{ProgressTracker, ScanProgress};

/// Walks a folder tree through a [`ListingClient`], one folder at a time.
pub struct TreeScanner<C> {
    client: C,
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl<C: ListingClient> TreeScanner<C> {
    /// Create a new scanner over `client`.
    pub fn new(client: C) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            client,
            progress_tx,
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// The underlying listing client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Scan the tree below `config.root`.
    ///
    /// Never fails: a folder that cannot be listed is recorded as an error and
    /// its subfolders stay undiscovered. Records come back sorted
    /// case-insensitively by path.
    pub fn scan(&self, config: &ScanConfig) -> ScanReport {
        let start = Instant::now();
        let root = config.normalized_root();
        info!(root = %display_path(&root), "Starting scan");

        let mut queue: VecDeque<String> = VecDeque::from([root.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut records: Vec<FolderRecord> = Vec::new();
        let mut tracker = ProgressTracker::new();

        while let Some(path) = queue.pop_front() {
            if !visited.insert(path.clone()) {
                debug!(path = %display_path(&path), "Skipping folder listed twice");
                continue;
            }
            if config.max_folders.is_some_and(|limit| records.len() >= limit) {
                warn!(
                    limit = records.len(),
                    remaining = queue.len() + 1,
                    "Folder limit reached, stopping scan early"
                );
                break;
            }

            let record = self.visit(&path, &mut queue);
            tracker.record(&record, queue.len());
            let _ = self.progress_tx.send(tracker.snapshot());
            records.push(record);
        }

        records.sort_by(|a, b| compare_paths(a.path(), b.path()));

        let report = ScanReport::new(root, records, start.elapsed());
        info!(
            folders = report.totals.total_folders,
            files = report.totals.total_files,
            failed = report.totals.failed_folders,
            elapsed_ms = report.scan_duration.as_millis() as u64,
            "Scan finished"
        );
        report
    }

    /// List one folder and enqueue its subfolders.
    fn visit(&self, path: &str, queue: &mut VecDeque<String>) -> FolderRecord {
        match self.list_all(path) {
            Ok(entries) => {
                let files = classify(entries, queue);
                debug!(path = %display_path(path), files, "Counted folder");
                FolderRecord::counted(path, files)
            }
            Err(err) => {
                warn!(
                    path = %display_path(path),
                    error = %err,
                    transient = err.is_transient(),
                    "Could not list folder"
                );
                FolderRecord::failed(path, err.to_string())
            }
        }
    }

    /// Fetch every page of a folder listing.
    ///
    /// The entry set is complete only once the provider reports no further
    /// pages; a failure on any page discards what was gathered.
    fn list_all(&self, path: &str) -> Result<Vec<ListedEntry>, ListingError> {
        let mut page = self.client.list_first_page(path)?;
        let mut entries = std::mem::take(&mut page.entries);
        let mut pages = 1u32;

        while page.has_more {
            let cursor = page.cursor.take().ok_or_else(|| {
                ListingError::decode("listing reported more pages without a cursor")
            })?;
            page = self.client.list_next_page(&cursor)?;
            entries.append(&mut page.entries);
            pages += 1;
        }

        debug!(path = %display_path(path), pages, entries = entries.len(), "Listed folder");
        Ok(entries)
    }
}

/// Count files and enqueue folders; other entry kinds are ignored.
fn classify(entries: Vec<ListedEntry>, queue: &mut VecDeque<String>) -> u64 {
    let mut files = 0u64;
    for entry in entries {
        match entry.kind {
            EntryKind::File => files += 1,
            EntryKind::Folder => queue.push_back(entry.path.into_string()),
            EntryKind::Other => {}
        }
    }
    files
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryListing;

    fn create_test_tree() -> MemoryListing {
        let mut listing = MemoryListing::new();
        listing
            .add_file("", "/readme.txt")
            .add_file("", "/todo.txt")
            .add_folder("", "/a")
            .add_file("/a", "/a/1.jpg")
            .add_file("/a", "/a/2.jpg")
            .add_file("/a", "/a/3.jpg")
            .add_folder("/a", "/a/deep")
            .add_file("/a/deep", "/a/deep/x.bin");
        listing
    }

    #[test]
    fn test_basic_scan() {
        let scanner = TreeScanner::new(create_test_tree());
        let report = scanner.scan(&ScanConfig::new(""));

        let summary: Vec<_> = report
            .records
            .iter()
            .map(|r| (r.path(), r.file_count()))
            .collect();
        assert_eq!(summary, vec![("/", 2), ("/a", 3), ("/a/deep", 1)]);
        assert_eq!(report.totals.total_files, 6);
        assert_eq!(report.totals.total_folders, 3);
    }

    #[test]
    fn test_visits_breadth_first() {
        let mut listing = create_test_tree();
        listing.add_folder("", "/b").add_folder("/b", "/b/inner");

        let scanner = TreeScanner::new(listing);
        scanner.scan(&ScanConfig::default());

        assert_eq!(
            scanner.client().listed_paths(),
            vec!["", "/a", "/b", "/a/deep", "/b/inner"]
        );
    }

    #[test]
    fn test_pagination_accumulates_all_pages() {
        let mut listing = MemoryListing::new().with_page_size(2);
        for i in 0..7 {
            listing.add_file("", &format!("/f{i}"));
        }
        listing.add_folder("", "/sub");

        let report = TreeScanner::new(listing).scan(&ScanConfig::default());
        assert_eq!(report.records[0].files(), Some(7));
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_continuation_failure_discards_partial_pages() {
        let mut listing = MemoryListing::new().with_page_size(1);
        listing
            .add_folder("", "/a")
            .add_file("/a", "/a/1")
            .add_folder("/a", "/a/child")
            .fail_continuation("/a", ListingError::transport("reset"));

        let report = TreeScanner::new(listing).scan(&ScanConfig::default());
        let paths: Vec<_> = report.records.iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["/", "/a"]);
        assert!(report.records[1].is_error());
    }

    #[test]
    fn test_root_failure_yields_single_record() {
        let mut listing = create_test_tree();
        listing.fail_listing("", ListingError::status(401, "invalid_access_token"));

        let report = TreeScanner::new(listing).scan(&ScanConfig::new("/"));
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].path(), "/");
        assert_eq!(report.records[0].file_count(), -1);
        assert_eq!(report.totals.total_files, 0);
    }

    #[test]
    fn test_ignores_other_entries() {
        let mut listing = MemoryListing::new();
        listing.add_entry(
            "",
            ListedEntry {
                kind: EntryKind::Other,
                path: "/gone.txt".into(),
            },
        );
        let report = TreeScanner::new(listing).scan(&ScanConfig::default());
        assert_eq!(report.records[0].files(), Some(0));
    }

    #[test]
    fn test_folder_reported_twice_is_visited_once() {
        let mut listing = create_test_tree();
        listing
            .add_folder("", "/shared")
            .add_file("/shared", "/shared/doc.txt")
            .add_entry("/a", ListedEntry::folder("/shared"))
            .add_entry("", ListedEntry::folder("/shared"));

        let scanner = TreeScanner::new(listing);
        let report = scanner.scan(&ScanConfig::default());

        let shared: Vec<_> = report
            .records
            .iter()
            .filter(|r| r.path() == "/shared")
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].file_count(), 1);
        assert_eq!(report.totals.total_folders, 4);
        assert_eq!(report.totals.total_files, 7);

        let listed = scanner.client().listed_paths();
        assert_eq!(listed.iter().filter(|p| *p == "/shared").count(), 1);
    }

    #[test]
    fn test_folder_limit() {
        let config = ScanConfig::builder()
            .max_folders(Some(2usize))
            .build()
            .unwrap();
        let report = TreeScanner::new(create_test_tree()).scan(&config);
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_progress_updates() {
        let scanner = TreeScanner::new(create_test_tree());
        let mut rx = scanner.subscribe();
        scanner.scan(&ScanConfig::default());

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert_eq!(last.folders_scanned, 3);
        assert_eq!(last.files_counted, 6);
        assert_eq!(last.queued, 0);
    }
}
