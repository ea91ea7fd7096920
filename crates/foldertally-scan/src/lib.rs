//! Folder-tree scanning engine for foldertally.
//!
//! This crate walks a storage provider's folder hierarchy breadth-first and
//! counts the direct files of every folder it visits.
//!
//! # Overview
//!
//! - **Paginated listing** through any [`ListingClient`]
//! - **Partial failure isolation**: a folder that cannot be listed becomes an
//!   error record and the walk continues
//! - **Deterministic output** sorted case-insensitively by path
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust
//! use foldertally_scan::{MemoryListing, ScanConfig, TreeScanner};
//!
//! let mut listing = MemoryListing::new();
//! listing.add_file("", "/notes.txt");
//! listing.add_folder("", "/a");
//! listing.add_file("/a", "/a/photo.jpg");
//!
//! let scanner = TreeScanner::new(listing);
//! let report = scanner.scan(&ScanConfig::new("/"));
//!
//! assert_eq!(report.totals.total_files, 2);
//! assert_eq!(report.records[0].path(), "/");
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use foldertally_scan::{MemoryListing, ScanConfig, TreeScanner};
//!
//! let scanner = TreeScanner::new(MemoryListing::new());
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Scanned {} folders", progress.folders_scanned);
//!     }
//! });
//! let _report = scanner.scan(&ScanConfig::default());
//! ```

mod memory;
mod progress;
mod scanner;

pub use memory::MemoryListing;
pub use progress::ScanProgress;
pub use scanner::TreeScanner;

// Re-export core types for convenience
pub use foldertally_core::{
    EntryKind, FolderOutcome, FolderRecord, ListedEntry, ListingClient, ListingError,
    ListingPage, ScanConfig, ScanReport, ScanTotals,
};
