//! The paginated listing seam between the scanner and a storage provider.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::ListingError;

/// Kind of a listed child entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Folder.
    Folder,
    /// Anything else the provider reports (deleted markers, etc.).
    Other,
}

/// A direct child of a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedEntry {
    /// Entry kind.
    pub kind: EntryKind,
    /// Provider-canonical absolute path.
    pub path: CompactString,
}

impl ListedEntry {
    /// Create a file entry.
    pub fn file(path: impl Into<CompactString>) -> Self {
        Self {
            kind: EntryKind::File,
            path: path.into(),
        }
    }

    /// Create a folder entry.
    pub fn folder(path: impl Into<CompactString>) -> Self {
        Self {
            kind: EntryKind::Folder,
            path: path.into(),
        }
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Entries on this page, in provider order.
    pub entries: Vec<ListedEntry>,
    /// Whether another page must be fetched with `cursor`.
    pub has_more: bool,
    /// Continuation token for the next page.
    pub cursor: Option<String>,
}

impl ListingPage {
    /// A final page holding `entries`.
    pub fn last(entries: Vec<ListedEntry>) -> Self {
        Self {
            entries,
            has_more: false,
            cursor: None,
        }
    }

    /// A page followed by another one reachable through `cursor`.
    pub fn more(entries: Vec<ListedEntry>, cursor: impl Into<String>) -> Self {
        Self {
            entries,
            has_more: true,
            cursor: Some(cursor.into()),
        }
    }
}

/// Lists the direct children of a folder, one page at a time.
///
/// Implementations perform blocking I/O; every call completes before the
/// scanner takes its next step.
pub trait ListingClient {
    /// Fetch the first page of `path`'s children. `""` is the provider root.
    fn list_first_page(&self, path: &str) -> Result<ListingPage, ListingError>;

    /// Exchange a continuation token for the next page.
    fn list_next_page(&self, cursor: &str) -> Result<ListingPage, ListingError>;
}

impl<T: ListingClient + ?Sized> ListingClient for &T {
    fn list_first_page(&self, path: &str) -> Result<ListingPage, ListingError> {
        (**self).list_first_page(path)
    }

    fn list_next_page(&self, cursor: &str) -> Result<ListingPage, ListingError> {
        (**self).list_next_page(cursor)
    }
}

impl<T: ListingClient + ?Sized> ListingClient for Box<T> {
    fn list_first_page(&self, path: &str) -> Result<ListingPage, ListingError> {
        (**self).list_first_page(path)
    }

    fn list_next_page(&self, cursor: &str) -> Result<ListingPage, ListingError> {
        (**self).list_next_page(cursor)
    }
}
