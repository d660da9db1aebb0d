//! On-disk cache of the last successfully fetched catalog
//!
//! One file per kind (`firmwares.json`, `ota.json`) holding the payload
//! verbatim. No header and no expiry: a file is only replaced by the next
//! successful fetch. The cache never validates JSON.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::CatalogConfig;
use crate::error::CacheError;
use crate::session::RawCatalog;
use crate::CatalogKind;

/// Catalog cache rooted at one directory
#[derive(Debug, Clone)]
pub struct CatalogCache {
    dir: PathBuf,
}

impl CatalogCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache rooted at the configured (or platform default) directory
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CacheError> {
        Ok(Self::new(config.resolve_cache_dir()?))
    }

    /// Cache file path for a kind
    pub fn path(&self, kind: CatalogKind) -> PathBuf {
        self.dir.join(kind.cache_file_name())
    }

    /// Read the cached catalog for `kind`
    pub fn load(&self, kind: CatalogKind) -> Result<RawCatalog, CacheError> {
        let path = self.path(kind);

        let bytes = std::fs::read(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                CacheError::Missing {
                    kind,
                    path: path.clone(),
                }
            } else {
                CacheError::Read {
                    kind,
                    path: path.clone(),
                    source,
                }
            }
        })?;

        if bytes.is_empty() {
            return Err(CacheError::Empty { kind, path });
        }

        tracing::debug!("Loaded cached {} catalog from {}", kind, path.display());
        Ok(RawCatalog::from(bytes))
    }

    /// Replace the cached catalog for `kind`
    pub fn store(&self, kind: CatalogKind, raw: &RawCatalog) -> Result<(), CacheError> {
        let path = self.path(kind);
        let write_error = |source| CacheError::Write {
            kind,
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_error)?;
        std::fs::write(&path, raw.as_bytes()).map_err(write_error)?;

        tracing::debug!("Stored {} catalog cache at {}", kind, path.display());
        Ok(())
    }

    /// Remove the cached catalog for `kind`; a missing file is not an error
    pub fn clear(&self, kind: CatalogKind) -> Result<(), CacheError> {
        let path = self.path(kind);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Write { kind, path, source }),
        }
    }
}
