//! Presentation model for a report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use strum::Display;

use foldertally_core::{ScanReport, ScanTotals};
use foldertally_history::HistoryLedger;

use crate::paths::display_path;

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Folder path relative to the scanned root.
    pub path: String,
    /// Direct file count, `-1` when listing failed.
    pub file_count: i64,
    /// Listing diagnostic for failed folders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One point of the history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_files: u64,
}

/// Direction of the change since the previous entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Growth,
    Shrinkage,
    Unchanged,
}

/// Change in total files since the previous history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Change {
    pub delta: i64,
    pub trend: Trend,
}

impl Change {
    /// Classify a signed delta.
    pub fn from_delta(delta: i64) -> Self {
        let trend = match delta {
            d if d > 0 => Trend::Growth,
            d if d < 0 => Trend::Shrinkage,
            _ => Trend::Unchanged,
        };
        Self { delta, trend }
    }
}

/// Everything a rendered report shows.
#[derive(Debug, Clone, Serialize)]
pub struct ReportModel {
    /// When the report was assembled.
    pub generated_at: DateTime<Utc>,
    /// Scan totals.
    pub totals: ScanTotals,
    /// Table rows in scan order.
    pub rows: Vec<ReportRow>,
    /// History chart points, oldest first.
    pub history: Vec<TrendPoint>,
    /// Change since the previous history entry.
    pub change: Option<Change>,
    /// Retention window the history covers, in days.
    pub retention_days: u32,
}

impl ReportModel {
    /// Assemble a report from a scan and the (already updated) ledger.
    pub fn assemble(scan: &ScanReport, ledger: &HistoryLedger, retention_days: u32) -> Self {
        let rows = scan
            .records
            .iter()
            .map(|record| ReportRow {
                path: display_path(record.path(), &scan.root),
                file_count: record.file_count(),
                error: record.error().map(str::to_string),
            })
            .collect();

        let history = ledger
            .entries()
            .iter()
            .map(|entry| TrendPoint {
                date: entry.date,
                total_files: entry.total_files,
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            totals: scan.totals,
            rows,
            history,
            change: ledger.change_since_previous().map(Change::from_delta),
            retention_days,
        }
    }

    /// Override the generation timestamp.
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Check if there is history to chart.
    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_classification() {
        assert_eq!(Change::from_delta(5).trend, Trend::Growth);
        assert_eq!(Change::from_delta(-3).trend, Trend::Shrinkage);
        assert_eq!(Change::from_delta(0).trend, Trend::Unchanged);
        assert_eq!(Trend::Shrinkage.to_string(), "shrinkage");
    }
}
