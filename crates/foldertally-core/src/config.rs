//! Scan configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Display form of the provider root, whose canonical key is the empty string.
pub const ROOT_DISPLAY: &str = "/";

/// Configuration for a tree scan.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan, as supplied by the user. Empty means provider root.
    #[builder(default)]
    #[serde(default)]
    pub root: String,

    /// Stop after visiting this many folders (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_folders: Option<usize>,
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            validate_root(root)?;
        }
        if let Some(Some(0)) = self.max_folders {
            return Err("max_folders must be at least 1".to_string());
        }
        Ok(())
    }
}

fn validate_root(root: &str) -> Result<(), String> {
    if root.chars().any(char::is_control) {
        return Err("Root path cannot contain control characters".to_string());
    }
    if root
        .split('/')
        .any(|segment| segment == "." || segment == "..")
    {
        return Err(format!("Root path cannot contain relative segments: {root}"));
    }
    Ok(())
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            max_folders: None,
        }
    }

    /// The canonical root key used for traversal.
    pub fn normalized_root(&self) -> String {
        normalize_root(&self.root)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Normalize a user-supplied root into the provider's canonical form.
///
/// Non-empty paths get exactly one leading `/` and no trailing `/`. The bare
/// separator collapses to `""`, the provider root.
pub fn normalize_root(raw: &str) -> String {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/Photos")
            .max_folders(Some(50usize))
            .build()
            .unwrap();

        assert_eq!(config.root, "/Photos");
        assert_eq!(config.max_folders, Some(50));
    }

    #[test]
    fn test_config_builder_defaults_to_provider_root() {
        let config = ScanConfig::builder().build().unwrap();
        assert_eq!(config.normalized_root(), "");
        assert!(config.max_folders.is_none());
    }

    #[test]
    fn test_config_builder_rejects_relative_segments() {
        let err = ScanConfig::builder().root("/Photos/../Work").build();
        assert!(err.is_err());
    }

    #[test]
    fn test_config_builder_rejects_zero_limit() {
        let err = ScanConfig::builder().max_folders(Some(0usize)).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root(""), "");
        assert_eq!(normalize_root("/"), "");
        assert_eq!(normalize_root("//"), "");
        assert_eq!(normalize_root("Photos"), "/Photos");
        assert_eq!(normalize_root("/Photos"), "/Photos");
        assert_eq!(normalize_root("//Photos/2024/"), "/Photos/2024");
    }
}
