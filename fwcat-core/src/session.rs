//! Catalog sessions - one generation of catalog bytes
//!
//! A session owns the raw bytes of one catalog kind and hands out parsed
//! views that borrow them. Opening a session follows the fetch policy:
//!
//! 1. fetch from the mirrors
//! 2. on success, write the payload through to the cache (best effort)
//! 3. on total network failure, fall back to the cached copy
//!
//! Switching kind or refreshing produces a new session; the old bytes and
//! everything parsed from them go away with it.

use std::fmt;

use crate::cache::CatalogCache;
use crate::error::{CacheError, CatalogError, ParseError};
use crate::index::ParsedCatalog;
use crate::transport::CatalogTransport;
use crate::CatalogKind;

#[cfg(feature = "http")]
use crate::config::CatalogConfig;

/// Catalog document bytes exactly as downloaded or cached
#[derive(Clone, PartialEq, Eq)]
pub struct RawCatalog(Vec<u8>);

impl RawCatalog {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RawCatalog {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for RawCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawCatalog({} bytes)", self.0.len())
    }
}

/// Where a session's bytes came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Network,
    Cache,
    Provided,
}

/// One catalog kind plus the bytes of one fetch
#[derive(Debug)]
pub struct CatalogSession {
    kind: CatalogKind,
    raw: RawCatalog,
    source: SessionSource,
}

impl CatalogSession {
    /// Open a session over HTTP using config for mirrors, retries and cache
    #[cfg(feature = "http")]
    pub async fn open(config: &CatalogConfig, kind: CatalogKind) -> anyhow::Result<Self> {
        let transport = CatalogTransport::from_config(config)?;
        let cache = CatalogCache::from_config(config)?;
        Ok(Self::open_with(&transport, &cache, kind).await?)
    }

    /// Open a session with explicit transport and cache
    pub async fn open_with(
        transport: &CatalogTransport,
        cache: &CatalogCache,
        kind: CatalogKind,
    ) -> Result<Self, CatalogError> {
        match transport.fetch(kind).await {
            Ok(raw) => {
                if let Err(e) = cache.store(kind, &raw) {
                    tracing::warn!("Failed to save catalog cache: {}", e);
                }
                Ok(Self {
                    kind,
                    raw,
                    source: SessionSource::Network,
                })
            }
            Err(transport_error) => {
                tracing::warn!("{}; trying cached catalog", transport_error);
                match cache.load(kind) {
                    Ok(raw) => {
                        tracing::info!(
                            "Using cached {} catalog from {}",
                            kind,
                            cache.path(kind).display()
                        );
                        Ok(Self {
                            kind,
                            raw,
                            source: SessionSource::Cache,
                        })
                    }
                    Err(cache_error) => Err(CatalogError::Unavailable {
                        transport: transport_error,
                        cache: cache_error,
                    }),
                }
            }
        }
    }

    /// Open a session from the cache only, without touching the network
    pub fn from_cache(cache: &CatalogCache, kind: CatalogKind) -> Result<Self, CacheError> {
        Ok(Self {
            kind,
            raw: cache.load(kind)?,
            source: SessionSource::Cache,
        })
    }

    /// Wrap bytes the caller already has
    pub fn from_raw(kind: CatalogKind, raw: RawCatalog) -> Self {
        Self {
            kind,
            raw,
            source: SessionSource::Provided,
        }
    }

    /// Fetch a fresh generation of the same kind
    pub async fn refresh(
        &self,
        transport: &CatalogTransport,
        cache: &CatalogCache,
    ) -> Result<Self, CatalogError> {
        Self::open_with(transport, cache, self.kind).await
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn source(&self) -> SessionSource {
        self.source
    }

    pub fn raw(&self) -> &RawCatalog {
        &self.raw
    }

    /// Parse the session's bytes; the view cannot outlive the session
    pub fn parse(&self) -> Result<ParsedCatalog<'_>, ParseError> {
        ParsedCatalog::parse(&self.raw, self.kind)
    }
}
