//! History configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default number of trailing days kept in the ledger.
pub const DEFAULT_RETENTION_DAYS: u32 = 14;

/// Configuration for the history ledger.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct HistoryConfig {
    /// Number of trailing days to keep, counted back from today.
    #[builder(default = "DEFAULT_RETENTION_DAYS")]
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// File name the ledger is persisted under.
    #[builder(default = "\"history.json\".to_string()")]
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_file_name() -> String {
    "history.json".to_string()
}

impl HistoryConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(0) = self.retention_days {
            return Err("Retention must be at least one day".to_string());
        }
        if let Some(ref name) = self.file_name {
            if name.trim().is_empty() {
                return Err("History file name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl HistoryConfig {
    /// Create a new config builder.
    pub fn builder() -> HistoryConfigBuilder {
        HistoryConfigBuilder::default()
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_RETENTION_DAYS,
            file_name: default_file_name(),
        }
    }
}
