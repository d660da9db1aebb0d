//! fwcat - firmware catalog client
//!
//! Discovers which firmware builds exist for a device and resolves a
//! version or build id to its download location.
//!
//! # Architecture
//!
//! ```text
//! Mirrors (api.ipsw.me, proxies)
//!     │
//!     ▼
//! CatalogTransport ──► retries round-robin, rejects tiny payloads
//!     │        │
//!     │        └──► CatalogCache  (firmwares.json / ota.json)
//!     ▼
//! CatalogSession  ──► owns the raw bytes for one catalog generation
//!     │
//!     ▼
//! ParsedCatalog   ──► device list + per-device versions (memoized)
//!     │
//!     ▼
//! resolver        ──► FirmwareDescriptor for TSS request construction
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod natural;
pub mod resolver;
pub mod session;
pub mod transport;

pub use cache::CatalogCache;
pub use config::CatalogConfig;
pub use error::{
    AttemptError, CacheError, CatalogError, NotFoundError, ParseError, TransportError,
};
pub use index::{FirmwareDescriptor, ParsedCatalog};
pub use natural::{natural_cmp, sort_natural_by_key, SortOrder};
pub use resolver::DeviceIdentifierMap;
pub use session::{CatalogSession, RawCatalog, SessionSource};
pub use transport::{CatalogTransport, Downloader, RetryPolicy};

#[cfg(feature = "http")]
pub use transport::http::HttpDownloader;

/// Which catalog document to work with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Full restore images (firmwares.json)
    Release,
    /// Over-the-air updates (ota.json)
    Ota,
}

impl CatalogKind {
    /// File name used for this kind in the cache directory
    pub fn cache_file_name(self) -> &'static str {
        match self {
            CatalogKind::Release => "firmwares.json",
            CatalogKind::Ota => "ota.json",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Release => f.write_str("release"),
            CatalogKind::Ota => f.write_str("OTA"),
        }
    }
}
