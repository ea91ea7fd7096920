//! Provider adapters for foldertally.
//!
//! - [`DropboxClient`] implements [`ListingClient`](foldertally_core::ListingClient)
//!   over the Dropbox `files/list_folder` endpoints.
//! - [`GitHubClient`] talks to the GitHub contents and Pages APIs;
//!   [`GitHubFileStore`] exposes one repository file as a
//!   [`RawStore`](foldertally_core::RawStore).
//!
//! All calls are blocking and go through a shared agent with connect/read
//! timeouts and bounded exponential backoff on transient failures.

mod dropbox;
mod error;
mod github;
mod http;

pub use dropbox::{DROPBOX_API_BASE, DropboxClient};
pub use error::GitHubError;
pub use github::{
    GITHUB_API_BASE, GitHubClient, GitHubFileStore, GitHubRepo, PublishedReport, RemoteFile,
};
pub use http::RetryConfig;
