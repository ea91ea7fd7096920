//! In-memory listing client.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use foldertally_core::{ListedEntry, ListingClient, ListingError, ListingPage};

/// A folder tree held in memory, served page by page.
///
/// Useful for dry runs and for exercising the scanner without a provider.
/// Folders are keyed by their canonical path; `""` is the root.
#[derive(Debug, Clone, Default)]
pub struct MemoryListing {
    children: BTreeMap<String, Vec<ListedEntry>>,
    first_page_failures: HashMap<String, ListingError>,
    continuation_failures: HashMap<String, ListingError>,
    page_size: Option<usize>,
    listed: RefCell<Vec<String>>,
}

impl MemoryListing {
    /// Create a tree holding only an empty root.
    pub fn new() -> Self {
        let mut listing = Self::default();
        listing.children.insert(String::new(), Vec::new());
        listing
    }

    /// Serve at most `size` entries per page.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }

    /// Add a folder under `parent`.
    pub fn add_folder(&mut self, parent: &str, path: &str) -> &mut Self {
        self.add_entry(parent, ListedEntry::folder(path));
        self.children.entry(path.to_string()).or_default();
        self
    }

    /// Add a file under `parent`.
    pub fn add_file(&mut self, parent: &str, path: &str) -> &mut Self {
        self.add_entry(parent, ListedEntry::file(path))
    }

    /// Add an arbitrary entry under `parent`.
    pub fn add_entry(&mut self, parent: &str, entry: ListedEntry) -> &mut Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(entry);
        self
    }

    /// Make the first listing call for `path` fail.
    pub fn fail_listing(&mut self, path: &str, error: ListingError) -> &mut Self {
        self.first_page_failures.insert(path.to_string(), error);
        self
    }

    /// Make every continuation call for `path` fail.
    pub fn fail_continuation(&mut self, path: &str, error: ListingError) -> &mut Self {
        self.continuation_failures.insert(path.to_string(), error);
        self
    }

    /// Folders whose first page was requested, in request order.
    pub fn listed_paths(&self) -> Vec<String> {
        self.listed.borrow().clone()
    }

    fn page(&self, path: &str, offset: usize) -> ListingPage {
        let entries = self.children.get(path).map(Vec::as_slice).unwrap_or(&[]);
        let size = self.page_size.unwrap_or(entries.len().max(1));
        let start = offset.min(entries.len());
        let end = start.saturating_add(size).min(entries.len());
        let page_entries = entries[start..end].to_vec();

        if end < entries.len() {
            ListingPage::more(page_entries, format!("{end}:{path}"))
        } else {
            ListingPage::last(page_entries)
        }
    }
}

impl ListingClient for MemoryListing {
    fn list_first_page(&self, path: &str) -> Result<ListingPage, ListingError> {
        self.listed.borrow_mut().push(path.to_string());

        if let Some(err) = self.first_page_failures.get(path) {
            return Err(err.clone());
        }
        if !self.children.contains_key(path) {
            return Err(ListingError::status(409, format!("path/not_found/: {path}")));
        }
        Ok(self.page(path, 0))
    }

    fn list_next_page(&self, cursor: &str) -> Result<ListingPage, ListingError> {
        let (offset, path) = cursor
            .split_once(':')
            .and_then(|(offset, path)| Some((offset.parse::<usize>().ok()?, path)))
            .ok_or_else(|| ListingError::decode(format!("unknown cursor: {cursor}")))?;

        if let Some(err) = self.continuation_failures.get(path) {
            return Err(err.clone());
        }
        Ok(self.page(path, offset))
    }
}
