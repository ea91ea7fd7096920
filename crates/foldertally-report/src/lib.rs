//! Report assembly and rendering for foldertally.
//!
//! Turns a [`ScanReport`](foldertally_core::ScanReport) and a
//! [`HistoryLedger`](foldertally_history::HistoryLedger) into a
//! presentation model, then into a standalone HTML page.
//!
//! Folder paths are shown relative to the scanned root; the scanner itself
//! always reports full provider paths.
//!
//! ```rust,ignore
//! use foldertally_report::{ReportModel, render_html};
//!
//! let model = ReportModel::assemble(&scan, &ledger, 14);
//! let html = render_html(&model)?;
//! ```

mod html;
mod model;
mod paths;

pub use html::{RenderError, render_html};
pub use model::{Change, ReportModel, ReportRow, Trend, TrendPoint};
pub use paths::display_path;
