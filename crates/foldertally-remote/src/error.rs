//! Error types for the GitHub adapter.

use thiserror::Error;

use crate::http::error_body;

/// Errors talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// GitHub answered with a non-success status.
    #[error("GitHub API error {code} at {url}: {message}")]
    Status {
        code: u16,
        url: String,
        message: String,
    },

    /// The request never produced a response.
    #[error("GitHub transport error at {url}: {message}")]
    Transport { url: String, message: String },

    /// A response body could not be decoded.
    #[error("Unexpected GitHub response at {url}: {message}")]
    Decode { url: String, message: String },
}

impl GitHubError {
    /// Convert a ureq failure, capturing the response body for status errors.
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => Self::Status {
                code,
                url: url.to_string(),
                message: error_body(response),
            },
            ureq::Error::Transport(transport) => Self::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        }
    }

    pub(crate) fn decode(url: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
