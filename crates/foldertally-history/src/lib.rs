//! Rolling history of scan totals for foldertally.
//!
//! The ledger keeps at most one [`HistoryEntry`] per UTC calendar day, always
//! sorted by date, and drops entries that fall outside a retention window.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use foldertally_history::HistoryLedger;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//!
//! let mut ledger = HistoryLedger::new();
//! ledger.upsert(day(1), 100, 10);
//! ledger.upsert(day(2), 90, 10);
//! ledger.trim_as_of(day(3), 14);
//!
//! assert_eq!(ledger.change_since_previous(), Some(-10));
//! ```
//!
//! Persistence goes through a [`RawStore`]; loading never fails; absent or
//! unreadable state yields an empty ledger.

mod config;
mod error;
mod ledger;
mod store;

pub use config::{DEFAULT_RETENTION_DAYS, HistoryConfig, HistoryConfigBuilder};
pub use error::LedgerError;
pub use ledger::{HistoryEntry, HistoryLedger};
pub use store::FileStore;

pub use foldertally_core::{MemoryStore, RawStore, StoreError};
