//! Repository configuration.

use crate::error::{OrgError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for an ORGV repository, stored as `config.toml` inside
/// the `.orgv` directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Identity configuration.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from the repository directory.
    ///
    /// A missing file yields defaults.
    pub fn load(orgv_root: &Path) -> Result<Self> {
        let path = orgv_root.join("config.toml");
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| OrgError::Config(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| OrgError::Config(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the repository directory.
    pub fn save(&self, orgv_root: &Path) -> Result<()> {
        let path = orgv_root.join("config.toml");
        let content = toml::to_string_pretty(self)
            .map_err(|e| OrgError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| OrgError::Config(format!("failed to write config: {}", e)))?;
        Ok(())
    }
}

/// Identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Author name recorded on commits.
    pub author: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            author: whoami_fallback(),
        }
    }
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of hex characters shown for abbreviated node hashes
    /// (default: 12).
    pub short_hash_len: usize,

    /// Maximum entries printed by log listings before truncation
    /// (default: 50).
    pub log_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            short_hash_len: 12,
            log_limit: 50,
        }
    }
}

fn whoami_fallback() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
