//! Catalog client configuration
//!
//! Mirror lists, retry policy and cache location. Every field has a
//! built-in default, so a missing or partial YAML file is fine:
//!
//! ```yaml
//! release_mirrors:
//!   - https://api.ipsw.me/v2.1/firmwares.json/condensed
//! max_attempts: 5
//! backoff_ms: 500
//! cache_dir: /var/cache/fwcat
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CacheError;
use crate::transport::RetryPolicy;
use crate::CatalogKind;

/// Primary and proxy endpoints for the full restore catalog
pub const DEFAULT_RELEASE_MIRRORS: &[&str] = &[
    "https://api.ipsw.me/v2.1/firmwares.json/condensed",
    "https://ghproxy.com/https://api.ipsw.me/v2.1/firmwares.json/condensed",
];

/// Primary and proxy endpoints for the OTA catalog
pub const DEFAULT_OTA_MIRRORS: &[&str] = &[
    "https://api.ipsw.me/v2.1/ota.json/condensed",
    "https://ghproxy.com/https://api.ipsw.me/v2.1/ota.json/condensed",
];

/// Top-level catalog configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Release catalog mirrors, primary first
    #[serde(default = "default_release_mirrors")]
    pub release_mirrors: Vec<String>,

    /// OTA catalog mirrors, primary first
    #[serde(default = "default_ota_mirrors")]
    pub ota_mirrors: Vec<String>,

    /// Total download attempts across all mirrors
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between failed attempts in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Payloads smaller than this are treated as error pages
    #[serde(default = "default_min_payload_bytes")]
    pub min_payload_bytes: usize,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Where cached catalogs live (platform cache dir if unset)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            release_mirrors: default_release_mirrors(),
            ota_mirrors: default_ota_mirrors(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            min_payload_bytes: default_min_payload_bytes(),
            request_timeout_seconds: default_request_timeout_seconds(),
            cache_dir: None,
        }
    }
}

fn default_release_mirrors() -> Vec<String> {
    DEFAULT_RELEASE_MIRRORS.iter().map(|s| s.to_string()).collect()
}

fn default_ota_mirrors() -> Vec<String> {
    DEFAULT_OTA_MIRRORS.iter().map(|s| s.to_string()).collect()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    2000
}

fn default_min_payload_bytes() -> usize {
    1000
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl CatalogConfig {
    /// Load configuration from a YAML file, or defaults if it does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No catalog config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog config: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse catalog config: {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml_ng::from_str(content).context("Failed to parse catalog config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every fetch fail
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }
        if self.release_mirrors.is_empty() || self.ota_mirrors.is_empty() {
            anyhow::bail!("Each catalog kind needs at least one mirror");
        }
        for url in self.release_mirrors.iter().chain(&self.ota_mirrors) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("Mirror URL must start with http:// or https://: {url}");
            }
        }
        Ok(())
    }

    /// Mirror list for a catalog kind
    pub fn mirrors(&self, kind: CatalogKind) -> &[String] {
        match kind {
            CatalogKind::Release => &self.release_mirrors,
            CatalogKind::Ota => &self.ota_mirrors,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
            min_payload_bytes: self.min_payload_bytes,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Resolve the cache directory: explicit setting, then platform default
    pub fn resolve_cache_dir(&self) -> Result<PathBuf, CacheError> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }

        directories::ProjectDirs::from("io", "fwcat", "fwcat")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .or_else(|| dirs::cache_dir().map(|d| d.join("fwcat")))
            .ok_or(CacheError::NoCacheDir)
    }
}
