//! Completed scan container and aggregate totals.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ROOT_DISPLAY;
use crate::record::FolderRecord;

/// Aggregate totals over one scan's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTotals {
    /// Sum of direct file counts over successfully listed folders.
    pub total_files: u64,
    /// Number of folders visited, failed ones included.
    pub total_folders: u64,
    /// Number of folders whose listing failed.
    pub failed_folders: u64,
}

impl ScanTotals {
    /// Compute totals from a set of records.
    pub fn from_records(records: &[FolderRecord]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.total_folders += 1;
            match record.files() {
                Some(files) => totals.total_files += files,
                None => totals.failed_folders += 1,
            }
        }
        totals
    }
}

/// Complete result of a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Normalized root that was scanned (`""` for the provider root).
    pub root: String,

    /// One record per visited folder, sorted case-insensitively by path.
    pub records: Vec<FolderRecord>,

    /// Aggregate totals.
    pub totals: ScanTotals,

    /// When this scan finished.
    pub scanned_at: DateTime<Utc>,

    /// Duration of the scan.
    pub scan_duration: Duration,
}

impl ScanReport {
    /// Create a report; totals are derived from `records`.
    pub fn new(root: String, records: Vec<FolderRecord>, scan_duration: Duration) -> Self {
        let totals = ScanTotals::from_records(&records);
        Self {
            root,
            records,
            totals,
            scanned_at: Utc::now(),
            scan_duration,
        }
    }

    /// Root in display form.
    pub fn display_root(&self) -> &str {
        if self.root.is_empty() {
            ROOT_DISPLAY
        } else {
            &self.root
        }
    }

    /// UTC calendar day of the scan.
    pub fn scan_date(&self) -> NaiveDate {
        self.scanned_at.date_naive()
    }

    /// Records whose listing failed.
    pub fn failures(&self) -> impl Iterator<Item = &FolderRecord> {
        self.records.iter().filter(|r| r.is_error())
    }

    /// Check if any folder failed to list.
    pub fn has_failures(&self) -> bool {
        self.totals.failed_folders > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_exclude_failed_records() {
        let records = vec![
            FolderRecord::counted("", 2),
            FolderRecord::failed("/a", "denied"),
            FolderRecord::counted("/b", 5),
        ];
        let totals = ScanTotals::from_records(&records);

        assert_eq!(totals.total_files, 7);
        assert_eq!(totals.total_folders, 3);
        assert_eq!(totals.failed_folders, 1);
    }

    #[test]
    fn test_display_root() {
        let report = ScanReport::new(String::new(), Vec::new(), Duration::ZERO);
        assert_eq!(report.display_root(), "/");
        assert!(!report.has_failures());

        let report = ScanReport::new("/Work".into(), Vec::new(), Duration::ZERO);
        assert_eq!(report.display_root(), "/Work");
    }
}
