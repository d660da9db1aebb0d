//! Catalog transport - mirror failover with bounded retries
//!
//! Mirrors are tried one at a time, round-robin across attempts: attempt
//! `n` uses `mirrors[n % mirrors.len()]`. An attempt fails when the download
//! errors or the payload is smaller than the configured minimum (mirrors
//! sometimes answer 200 with an empty or HTML error page). Between failed
//! attempts the transport sleeps for the backoff interval; it never sleeps
//! after the last attempt.
//!
//! The transport does not touch the cache; see [`crate::session`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{AttemptError, TransportError};
use crate::session::RawCatalog;
use crate::CatalogKind;

#[cfg(feature = "http")]
pub mod http;

/// Fetches raw bytes from a URL
///
/// Implementations report every failure as an [`AttemptError`]; retry and
/// failover decisions belong to [`CatalogTransport`].
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, AttemptError>;

    /// Downloader identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Attempt budget, backoff and payload plausibility threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub min_payload_bytes: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        CatalogConfig::default().retry_policy()
    }
}

/// Downloads catalogs from an ordered list of mirrors per kind
pub struct CatalogTransport {
    downloader: Box<dyn Downloader>,
    release_mirrors: Vec<String>,
    ota_mirrors: Vec<String>,
    policy: RetryPolicy,
}

impl CatalogTransport {
    /// Build a transport from config with an injected downloader
    pub fn new(downloader: Box<dyn Downloader>, config: &CatalogConfig) -> Self {
        Self {
            downloader,
            release_mirrors: config.release_mirrors.clone(),
            ota_mirrors: config.ota_mirrors.clone(),
            policy: config.retry_policy(),
        }
    }

    /// Build a transport that downloads over HTTP
    #[cfg(feature = "http")]
    pub fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let downloader = http::HttpDownloader::new(config.request_timeout())?;
        Ok(Self::new(Box::new(downloader), config))
    }

    /// Replace the mirror list for one kind
    pub fn with_mirrors(mut self, kind: CatalogKind, mirrors: Vec<String>) -> Self {
        match kind {
            CatalogKind::Release => self.release_mirrors = mirrors,
            CatalogKind::Ota => self.ota_mirrors = mirrors,
        }
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mirrors(&self, kind: CatalogKind) -> &[String] {
        match kind {
            CatalogKind::Release => &self.release_mirrors,
            CatalogKind::Ota => &self.ota_mirrors,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch the catalog for `kind`, failing over between mirrors
    pub async fn fetch(&self, kind: CatalogKind) -> Result<RawCatalog, TransportError> {
        let mirrors = self.mirrors(kind);
        if mirrors.is_empty() {
            return Err(TransportError::NoMirrors { kind });
        }

        let attempts = self.policy.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 0..attempts {
            let url = &mirrors[attempt as usize % mirrors.len()];
            info!(
                "Downloading {} catalog from {} (attempt {}/{})",
                kind,
                url,
                attempt + 1,
                attempts
            );

            match self.try_mirror(url).await {
                Ok(raw) => {
                    info!("Loaded {} catalog ({} bytes) from {}", kind, raw.len(), url);
                    return Ok(raw);
                }
                Err(e) => {
                    warn!("Catalog download failed via {}: {}", self.downloader.name(), e);
                    last_failure = Some((url.clone(), e));

                    if attempt + 1 < attempts {
                        debug!("Retrying in {:?}", self.policy.backoff);
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }

        let (last_url, last_error) = last_failure
            .map(|(url, e)| (url, e.to_string()))
            .unwrap_or_default();

        Err(TransportError::Exhausted {
            kind,
            attempts,
            last_url,
            last_error,
        })
    }

    async fn try_mirror(&self, url: &str) -> Result<RawCatalog, AttemptError> {
        let bytes = self.downloader.download(url).await?;

        if bytes.len() < self.policy.min_payload_bytes {
            return Err(AttemptError::PayloadTooSmall {
                url: url.to_string(),
                size: bytes.len(),
                min: self.policy.min_payload_bytes,
            });
        }

        Ok(RawCatalog::from(bytes))
    }
}
