//! Catalog error types with enough context to reconstruct the failing operation

use std::path::PathBuf;
use thiserror::Error;

use crate::CatalogKind;

/// Top-level error for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Network fetch failed and the cache fallback failed too
    #[error("{transport}\n\nCache fallback also failed: {cache}")]
    Unavailable {
        transport: TransportError,
        cache: CacheError,
    },
}

/// All mirrors exhausted, or no mirrors to try
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No mirrors configured for the {kind} catalog")]
    NoMirrors { kind: CatalogKind },

    #[error("All mirrors failed for the {kind} catalog after {attempts} attempts; last error from {last_url}: {last_error}")]
    Exhausted {
        kind: CatalogKind,
        attempts: u32,
        last_url: String,
        last_error: String,
    },
}

/// A single failed download attempt, before retry bookkeeping
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("payload from {url} is implausibly small ({size} bytes, expected at least {min})")]
    PayloadTooSmall { url: String, size: usize, min: usize },
}

/// Missing, unreadable, or unwritable cache file
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached {kind} catalog at {path}")]
    Missing { kind: CatalogKind, path: PathBuf },

    #[error("Cached {kind} catalog at {path} is empty")]
    Empty { kind: CatalogKind, path: PathBuf },

    #[error("Failed to read cached {kind} catalog from {path}")]
    Read {
        kind: CatalogKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cached {kind} catalog to {path}")]
    Write {
        kind: CatalogKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine a cache directory")]
    NoCacheDir,
}

/// Malformed catalog document or entry
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{kind} catalog is not a valid JSON object")]
    Document {
        kind: CatalogKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} catalog has no top-level \"devices\" key")]
    MissingDevices { kind: CatalogKind },

    #[error("\"devices\" in the {kind} catalog is not a JSON object")]
    DevicesNotObject {
        kind: CatalogKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Device '{device}' has no \"firmwares\" array")]
    MissingFirmwares { device: String },

    #[error("Malformed entry for device '{device}'")]
    Device {
        device: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Firmware entry {position} of device '{device}' is missing \"{field}\"")]
    MissingField {
        device: String,
        position: usize,
        field: &'static str,
    },
}

/// No such device, or no firmware matching the selectors
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("Device '{device}' is not in the catalog")]
    UnknownDevice { device: String },

    #[error("No device known for CPID 0x{cpid:x} BDID 0x{bdid:x}")]
    UnknownBoard { cpid: u32, bdid: u32 },

    #[error("No firmwares found for device '{device}'")]
    NoFirmwares { device: String },

    #[error("Failed to find firmware for device '{device}' (version '{version}', build '{build}')")]
    NoMatch {
        device: String,
        version: String,
        build: String,
    },
}

impl CatalogError {
    /// True when the failure came from the network and a retry later may help
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::Transport(_) | CatalogError::Unavailable { .. }
        )
    }
}
