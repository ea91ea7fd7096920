use foldertally_core::{
    ERROR_SENTINEL, EntryKind, FolderOutcome, FolderRecord, ListedEntry, ListingError,
    ListingPage, ScanConfig, ScanReport, ScanTotals, compare_paths, normalize_root,
};
use std::time::Duration;

#[test]
fn test_entry_kind_display() {
    assert_eq!(EntryKind::File.to_string(), "file");
    assert_eq!(EntryKind::Folder.to_string(), "folder");
    assert_eq!(EntryKind::Other.to_string(), "other");
}

#[test]
fn test_listing_page_constructors() {
    let page = ListingPage::more(vec![ListedEntry::file("/a.txt")], "cursor-1");
    assert!(page.has_more);
    assert_eq!(page.cursor.as_deref(), Some("cursor-1"));

    let last = ListingPage::last(vec![ListedEntry::folder("/sub")]);
    assert!(!last.has_more);
    assert!(last.cursor.is_none());
    assert_eq!(last.entries[0].kind, EntryKind::Folder);
}

#[test]
fn test_record_outcomes() {
    let ok = FolderRecord::counted("/photos", 12);
    assert_eq!(ok.outcome(), &FolderOutcome::Counted(12));
    assert_eq!(ok.files(), Some(12));
    assert!(ok.error().is_none());

    let err = FolderRecord::failed("/photos/raw", ListingError::status(409, "not_found").to_string());
    assert_eq!(err.file_count(), ERROR_SENTINEL);
    assert!(err.error().unwrap().contains("409"));
}

#[test]
fn test_sorting_records_case_insensitively() {
    let mut records = vec![
        FolderRecord::counted("/b", 1),
        FolderRecord::counted("/A", 1),
        FolderRecord::counted("", 1),
        FolderRecord::counted("/a/C", 1),
        FolderRecord::counted("/a/b", 1),
    ];
    records.sort_by(|a, b| compare_paths(a.path(), b.path()));

    let paths: Vec<_> = records.iter().map(|r| r.path()).collect();
    assert_eq!(paths, vec!["/", "/A", "/a/b", "/a/C", "/b"]);
}

#[test]
fn test_report_serialization_keeps_sentinel() {
    let report = ScanReport::new(
        "/Work".to_string(),
        vec![
            FolderRecord::counted("/Work", 1),
            FolderRecord::failed("/Work/locked", "denied"),
        ],
        Duration::from_millis(5),
    );
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["records"][1]["file_count"], -1);
    assert_eq!(json["records"][1]["error"], "denied");
    assert_eq!(json["totals"]["total_files"], 1);

    let back: ScanReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.records, report.records);
    assert_eq!(
        back.totals,
        ScanTotals {
            total_files: 1,
            total_folders: 2,
            failed_folders: 1
        }
    );
}

#[test]
fn test_config_normalized_root() {
    assert_eq!(ScanConfig::new("/").normalized_root(), "");
    assert_eq!(ScanConfig::new("Camera Uploads").normalized_root(), "/Camera Uploads");
    assert_eq!(normalize_root("/a/b/"), "/a/b");
}
