//! Store configuration via `shelf.toml`
//!
//! Configuration is optional: `StoreConfig::default()` reproduces the
//! built-in behavior. A config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use shelfdb_core::{Error, Result};
use std::path::Path;

/// Conventional config file name placed next to a snapshot.
pub const CONFIG_FILE_NAME: &str = "shelf.toml";

/// Words dropped from `$fulltext` queries
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "i", "you", "the", "this", "is", "of", "a", "we", "us", "it", "them", "they",
];

/// Full-text scoring settings, under `[fulltext]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullTextConfig {
    /// Query tokens dropped before scoring (compared case-insensitively)
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
    /// Query tokens with fewer characters than this are dropped
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
}

fn default_stopwords() -> Vec<String> {
    DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect()
}

fn default_min_token_len() -> usize {
    2
}

impl Default for FullTextConfig {
    fn default() -> Self {
        Self {
            stopwords: default_stopwords(),
            min_token_len: default_min_token_len(),
        }
    }
}

impl FullTextConfig {
    /// True if `token` is on the stopword list
    pub fn is_stopword(&self, token: &str) -> bool {
        let lowered = token.to_lowercase();
        self.stopwords.iter().any(|w| w.to_lowercase() == lowered)
    }
}

/// Snapshot settings, under `[snapshot]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SnapshotConfig {
    /// Write indented JSON instead of a single line
    #[serde(default)]
    pub pretty: bool,
}

/// Store configuration loaded from `shelf.toml`.
///
/// # Example
///
/// ```toml
/// [fulltext]
/// stopwords = ["the", "a"]
/// min_token_len = 2
///
/// [snapshot]
/// pretty = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreConfig {
    /// Full-text scoring settings
    #[serde(default)]
    pub fulltext: FullTextConfig,
    /// Snapshot writer settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl StoreConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# shelfdb store configuration

[fulltext]
# Query words ignored by $fulltext (case-insensitive)
stopwords = ["i", "you", "the", "this", "is", "of", "a", "we", "us", "it", "them", "they"]
# Query words shorter than this many characters are ignored
min_token_len = 2

[snapshot]
# Indent snapshot JSON (default: false)
pretty = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        if config.fulltext.min_token_len == 0 {
            return Err(Error::ConfigError(
                "fulltext.min_token_len must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
