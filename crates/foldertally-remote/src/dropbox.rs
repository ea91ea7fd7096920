//! Dropbox folder listing over the HTTP API.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use foldertally_core::{EntryKind, ListedEntry, ListingClient, ListingError, ListingPage};

use crate::http::{RetryConfig, agent, error_body, send_with_retry};

/// Base URL of the Dropbox RPC endpoints.
pub const DROPBOX_API_BASE: &str = "https://api.dropboxapi.com/2";

/// Lists Dropbox folders with a bearer access token.
#[derive(Clone)]
pub struct DropboxClient {
    agent: ureq::Agent,
    access_token: String,
    api_base: String,
    retry: RetryConfig,
}

impl DropboxClient {
    /// Create a client authenticated with `access_token`.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            agent: agent(),
            access_token: access_token.into(),
            api_base: DROPBOX_API_BASE.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at a different API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn call(&self, endpoint: &str, body: serde_json::Value) -> Result<ListingPage, ListingError> {
        let url = format!("{}/{endpoint}", self.api_base);
        let auth = format!("Bearer {}", self.access_token);

        let response = send_with_retry(self.retry, || {
            self.agent
                .post(&url)
                .set("Authorization", &auth)
                .send_json(&body)
        })
        .map_err(listing_error)?;

        let parsed: ListFolderResponse = response
            .into_json()
            .map_err(|err| ListingError::decode(err.to_string()))?;
        let page = parsed.into_page()?;
        debug!(endpoint, entries = page.entries.len(), has_more = page.has_more, "Dropbox page");
        Ok(page)
    }
}

impl std::fmt::Debug for DropboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropboxClient")
            .field("api_base", &self.api_base)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ListingClient for DropboxClient {
    fn list_first_page(&self, path: &str) -> Result<ListingPage, ListingError> {
        self.call(
            "files/list_folder",
            json!({ "path": path, "recursive": false }),
        )
    }

    fn list_next_page(&self, cursor: &str) -> Result<ListingPage, ListingError> {
        self.call("files/list_folder/continue", json!({ "cursor": cursor }))
    }
}

fn listing_error(err: ureq::Error) -> ListingError {
    match err {
        ureq::Error::Status(code, response) => {
            ListingError::status(code, error_summary(&error_body(response)))
        }
        ureq::Error::Transport(transport) => ListingError::transport(transport.to_string()),
    }
}

/// Prefer Dropbox's `error_summary` over the raw body.
fn error_summary(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error_summary: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error_summary)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<DropboxEntry>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct DropboxEntry {
    #[serde(rename = ".tag")]
    tag: String,
    #[serde(default)]
    name: String,
    path_lower: Option<String>,
    path_display: Option<String>,
}

impl ListFolderResponse {
    fn into_page(self) -> Result<ListingPage, ListingError> {
        let entries = self
            .entries
            .into_iter()
            .map(DropboxEntry::into_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListingPage {
            entries,
            has_more: self.has_more,
            cursor: self.cursor,
        })
    }
}

impl DropboxEntry {
    fn into_entry(self) -> Result<ListedEntry, ListingError> {
        let kind = match self.tag.as_str() {
            "file" => EntryKind::File,
            "folder" => EntryKind::Folder,
            _ => EntryKind::Other,
        };
        let path = self.path_lower.or(self.path_display);
        match (kind, path) {
            (_, Some(path)) => Ok(ListedEntry {
                kind,
                path: path.into(),
            }),
            (EntryKind::Folder, None) => Err(ListingError::decode(format!(
                "folder entry {:?} has no path",
                self.name
            ))),
            (_, None) => Ok(ListedEntry {
                kind,
                path: self.name.into(),
            }),
        }
    }
}
