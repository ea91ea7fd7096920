//! Core types and traits for foldertally.
//!
//! This crate provides the data structures shared across the foldertally
//! workspace: folder records and scan reports, scan configuration, and the
//! two collaborator seams the engine is written against.
//!
//! - [`ListingClient`] lists the direct children of a folder, page by page.
//! - [`RawStore`] reads and writes an opaque persisted blob.

mod config;
mod error;
mod listing;
mod record;
mod report;
mod store;

pub use config::{ROOT_DISPLAY, ScanConfig, ScanConfigBuilder, normalize_root};
pub use error::{ListingError, SetupError, StoreError, is_transient_status};
pub use listing::{EntryKind, ListedEntry, ListingClient, ListingPage};
pub use record::{ERROR_SENTINEL, FolderOutcome, FolderRecord, compare_paths};
pub use report::{ScanReport, ScanTotals};
pub use store::{MemoryStore, RawStore};
