//! Ledger error types.

use thiserror::Error;

/// Errors decoding persisted history.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The bytes are not a valid history document.
    #[error("Could not parse history: {0}")]
    Parse(#[from] serde_json::Error),
}
