//! Error types shared by the scanner, the ledger and their collaborators.

use thiserror::Error;

/// Errors a [`ListingClient`](crate::ListingClient) can report for one folder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    /// The provider answered with a non-success status.
    #[error("Provider returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response body could not be understood.
    #[error("Malformed listing response: {message}")]
    Decode { message: String },
}

impl ListingError {
    /// Create a status error.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { code, .. } => is_transient_status(*code),
            Self::Transport { .. } => true,
            Self::Decode { .. } => false,
        }
    }
}

/// Statuses worth retrying: rate limiting and gateway/server hiccups.
pub fn is_transient_status(code: u16) -> bool {
    matches!(code, 429 | 500 | 502 | 503 | 504)
}

/// Errors reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local I/O failure.
    #[error("I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// A remote store rejected or failed the request.
    #[error("Remote store error at {location}: {message}")]
    Remote { location: String, message: String },

    /// The stored bytes could not be encoded or decoded.
    #[error("Invalid stored data at {location}: {message}")]
    Encoding { location: String, message: String },
}

impl StoreError {
    /// Create an I/O error with location context.
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }

    /// Create a remote store error.
    pub fn remote(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Configuration or precondition failures. These end a run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    /// A required setting was not provided.
    #[error("Missing required setting: {name}")]
    MissingSetting { name: String },

    /// A setting was provided but cannot be used.
    #[error("Invalid setting {name}: {message}")]
    InvalidSetting { name: String, message: String },
}

impl SetupError {
    /// Create a missing-setting error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingSetting { name: name.into() }
    }

    /// Create an invalid-setting error.
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_transience() {
        assert!(ListingError::status(503, "unavailable").is_transient());
        assert!(ListingError::status(429, "slow down").is_transient());
        assert!(!ListingError::status(409, "path/not_found").is_transient());
        assert!(ListingError::transport("connection reset").is_transient());
        assert!(!ListingError::decode("missing cursor").is_transient());
    }

    #[test]
    fn test_listing_error_message() {
        let err = ListingError::status(409, "path/not_found/");
        assert_eq!(err.to_string(), "Provider returned status 409: path/not_found/");
    }

    #[test]
    fn test_store_error_io() {
        let err = StoreError::io(
            "history.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("history.json"));
    }

    #[test]
    fn test_setup_error_message() {
        let err = SetupError::missing("DROPBOX_ACCESS_TOKEN");
        assert_eq!(
            err.to_string(),
            "Missing required setting: DROPBOX_ACCESS_TOKEN"
        );
    }
}
