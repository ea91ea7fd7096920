//! Per-folder scan records.

use std::cmp::Ordering;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::config::ROOT_DISPLAY;

/// Count reported in place of a file count when listing a folder failed.
pub const ERROR_SENTINEL: i64 = -1;

/// Result of listing one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// Listing completed; number of direct file children.
    Counted(u64),
    /// Listing failed; diagnostic message.
    Failed(String),
}

/// One visited folder and its direct (non-recursive) file count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawFolderRecord", try_from = "RawFolderRecord")]
pub struct FolderRecord {
    path: CompactString,
    outcome: FolderOutcome,
}

impl FolderRecord {
    /// Create a record for a folder whose listing completed.
    pub fn counted(path: &str, files: u64) -> Self {
        Self {
            path: record_path(path),
            outcome: FolderOutcome::Counted(files),
        }
    }

    /// Create a record for a folder whose listing failed.
    pub fn failed(path: &str, error: impl Into<String>) -> Self {
        Self {
            path: record_path(path),
            outcome: FolderOutcome::Failed(error.into()),
        }
    }

    /// Folder path; the provider root is shown as `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Listing outcome.
    pub fn outcome(&self) -> &FolderOutcome {
        &self.outcome
    }

    /// Direct file count, or `None` if listing failed.
    pub fn files(&self) -> Option<u64> {
        match self.outcome {
            FolderOutcome::Counted(n) => Some(n),
            FolderOutcome::Failed(_) => None,
        }
    }

    /// Direct file count in wire form: [`ERROR_SENTINEL`] for failures.
    pub fn file_count(&self) -> i64 {
        match self.outcome {
            FolderOutcome::Counted(n) => i64::try_from(n).unwrap_or(i64::MAX),
            FolderOutcome::Failed(_) => ERROR_SENTINEL,
        }
    }

    /// Diagnostic message for failed folders.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FolderOutcome::Counted(_) => None,
            FolderOutcome::Failed(message) => Some(message),
        }
    }

    /// Check if listing this folder failed.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, FolderOutcome::Failed(_))
    }
}

fn record_path(path: &str) -> CompactString {
    if path.is_empty() {
        CompactString::new(ROOT_DISPLAY)
    } else {
        CompactString::new(path)
    }
}

/// Case-insensitive path ordering with a byte-wise tie-break.
///
/// A path always sorts before its own extensions, so `/` precedes `/A`.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}

#[derive(Serialize, Deserialize)]
struct RawFolderRecord {
    path: CompactString,
    file_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<FolderRecord> for RawFolderRecord {
    fn from(record: FolderRecord) -> Self {
        let file_count = record.file_count();
        let error = match record.outcome {
            FolderOutcome::Counted(_) => None,
            FolderOutcome::Failed(message) => Some(message),
        };
        Self {
            path: record.path,
            file_count,
            error,
        }
    }
}

impl TryFrom<RawFolderRecord> for FolderRecord {
    type Error = String;

    fn try_from(raw: RawFolderRecord) -> Result<Self, Self::Error> {
        let outcome = match (raw.file_count, raw.error) {
            (ERROR_SENTINEL, Some(message)) => FolderOutcome::Failed(message),
            (ERROR_SENTINEL, None) => {
                return Err(format!("{}: error count without a message", raw.path));
            }
            (n, None) if n >= 0 => FolderOutcome::Counted(n as u64),
            (n, _) => return Err(format!("{}: invalid file count {n}", raw.path)),
        };
        Ok(Self {
            path: raw.path,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_record_uses_display_form() {
        let record = FolderRecord::counted("", 2);
        assert_eq!(record.path(), "/");
        assert_eq!(record.file_count(), 2);
        assert!(!record.is_error());
    }

    #[test]
    fn test_failed_record() {
        let record = FolderRecord::failed("/a", "boom");
        assert_eq!(record.file_count(), ERROR_SENTINEL);
        assert_eq!(record.files(), None);
        assert_eq!(record.error(), Some("boom"));
    }

    #[test]
    fn test_compare_paths() {
        assert_eq!(compare_paths("/", "/A"), Ordering::Less);
        assert_eq!(compare_paths("/a", "/B"), Ordering::Less);
        assert_eq!(compare_paths("/B", "/a"), Ordering::Greater);
        assert_eq!(compare_paths("/A", "/a"), Ordering::Less);
        assert_eq!(compare_paths("/a", "/a"), Ordering::Equal);
    }

    #[test]
    fn test_serialized_shape() {
        let ok = serde_json::to_value(FolderRecord::counted("/a", 3)).unwrap();
        assert_eq!(ok, serde_json::json!({"path": "/a", "file_count": 3}));

        let failed = serde_json::to_value(FolderRecord::failed("/b", "denied")).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"path": "/b", "file_count": -1, "error": "denied"})
        );
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_records() {
        let missing_message = r#"{"path": "/a", "file_count": -1}"#;
        assert!(serde_json::from_str::<FolderRecord>(missing_message).is_err());

        let stray_message = r#"{"path": "/a", "file_count": 4, "error": "x"}"#;
        assert!(serde_json::from_str::<FolderRecord>(stray_message).is_err());
    }
}
