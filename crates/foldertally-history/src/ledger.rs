//! Date-keyed ledger of scan totals.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use foldertally_core::{RawStore, ScanTotals, StoreError};

use crate::error::LedgerError;

/// Totals recorded for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Day the totals were taken, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Total direct files across successfully listed folders.
    #[serde(default)]
    pub total_files: u64,
    /// Total folders visited.
    #[serde(default)]
    pub total_folders: u64,
}

/// Ordered history of daily totals.
///
/// Entries are unique by date and sorted ascending after every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLedger {
    #[serde(rename = "data", default)]
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from arbitrary entries; a later entry wins a date clash.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let by_date: BTreeMap<NaiveDate, HistoryEntry> =
            entries.into_iter().map(|e| (e.date, e)).collect();
        Self {
            entries: by_date.into_values().collect(),
        }
    }

    /// Decode persisted bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LedgerError> {
        let raw: HistoryLedger = serde_json::from_slice(bytes)?;
        Ok(Self::from_entries(raw.entries))
    }

    /// Load the ledger from `store`, falling back to an empty one.
    ///
    /// Missing, unreadable and malformed state are all recoverable: they are
    /// logged and an empty ledger is returned.
    pub fn load<S: RawStore + ?Sized>(store: &S) -> Self {
        let location = store.location();
        match store.read_raw() {
            Ok(Some(bytes)) => match Self::from_slice(&bytes) {
                Ok(ledger) => {
                    info!(%location, entries = ledger.len(), "Loaded history");
                    ledger
                }
                Err(err) => {
                    warn!(%location, error = %err, "Could not parse history, starting fresh");
                    Self::new()
                }
            },
            Ok(None) => {
                info!(%location, "No existing history found, starting fresh");
                Self::new()
            }
            Err(err) => {
                warn!(%location, error = %err, "Could not read history, starting fresh");
                Self::new()
            }
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Persist the ledger to `store`.
    pub fn save<S: RawStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        let json = self
            .to_json_pretty()
            .map_err(|err| StoreError::encoding(store.location(), err.to_string()))?;
        store.write_raw(json.as_bytes())?;
        info!(location = %store.location(), entries = self.len(), "History saved");
        Ok(())
    }

    /// Insert or replace the entry for `date`.
    pub fn upsert(&mut self, date: NaiveDate, total_files: u64, total_folders: u64) -> &mut Self {
        self.entries.retain(|entry| entry.date != date);
        self.entries.push(HistoryEntry {
            date,
            total_files,
            total_folders,
        });
        self.entries.sort_by_key(|entry| entry.date);
        debug!(%date, total_files, total_folders, "Recorded history entry");
        self
    }

    /// Insert or replace the entry for `date` from a scan's totals.
    pub fn record_scan(&mut self, date: NaiveDate, totals: &ScanTotals) -> &mut Self {
        self.upsert(date, totals.total_files, totals.total_folders)
    }

    /// Drop entries older than `retention_days` before today (UTC).
    pub fn trim(&mut self, retention_days: u32) -> &mut Self {
        self.trim_as_of(Utc::now().date_naive(), retention_days)
    }

    /// Drop entries dated before `today - retention_days`.
    ///
    /// The cutoff day itself is kept.
    pub fn trim_as_of(&mut self, today: NaiveDate, retention_days: u32) -> &mut Self {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(retention_days)))
            .unwrap_or(NaiveDate::MIN);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.date >= cutoff);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(%cutoff, dropped, "Trimmed history");
        }
        self
    }

    /// Change in total files between the two most recent entries.
    ///
    /// Positive means growth. `None` with fewer than two entries.
    pub fn change_since_previous(&self) -> Option<i64> {
        match self.entries.as_slice() {
            [.., previous, latest] => Some(signed(latest.total_files) - signed(previous.total_files)),
            _ => None,
        }
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn signed(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
