//! Catalog index - device and firmware queries over a raw catalog
//!
//! A [`ParsedCatalog`] borrows the bytes of one [`RawCatalog`]: device
//! bodies stay as raw JSON slices and are only decoded when a device's
//! firmware list is first requested. Both the device list and the
//! per-device firmware lists are memoized. A refreshed catalog is a new
//! `ParsedCatalog`; nothing here is ever patched in place.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{CatalogError, NotFoundError, ParseError};
use crate::natural::{sort_natural_by_key, SortOrder};
use crate::session::RawCatalog;
use crate::CatalogKind;

/// One downloadable firmware build
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareDescriptor {
    pub version: String,
    pub build: String,
    pub url: String,
}

type DeviceMap<'raw> = HashMap<Cow<'raw, str>, &'raw RawValue>;

#[derive(Deserialize)]
struct DeviceEntry {
    #[serde(default)]
    firmwares: Option<Vec<FirmwareRecord>>,
}

#[derive(Deserialize)]
struct FirmwareRecord {
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "buildid")]
    build: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Parsed view over a raw catalog
pub struct ParsedCatalog<'raw> {
    kind: CatalogKind,
    devices: DeviceMap<'raw>,
    device_names: OnceCell<Arc<[String]>>,
    versions: Mutex<HashMap<String, Arc<[FirmwareDescriptor]>>>,
}

impl<'raw> ParsedCatalog<'raw> {
    /// Parse a raw catalog and locate its device mapping
    ///
    /// Release catalogs must carry a top-level `devices` object. OTA
    /// catalogs may not; only for OTA, and only when `devices` is absent,
    /// the document root is used as the device mapping instead.
    pub fn parse(raw: &'raw RawCatalog, kind: CatalogKind) -> Result<Self, ParseError> {
        let root: DeviceMap<'raw> = serde_json::from_slice(raw.as_bytes())
            .map_err(|source| ParseError::Document { kind, source })?;

        let devices = match root.get("devices").copied() {
            Some(value) => serde_json::from_str(value.get())
                .map_err(|source| ParseError::DevicesNotObject { kind, source })?,
            None if kind == CatalogKind::Ota => {
                tracing::debug!("No \"devices\" key in OTA catalog, using document root");
                root
            }
            None => return Err(ParseError::MissingDevices { kind }),
        };

        Ok(Self {
            kind,
            devices,
            device_names: OnceCell::new(),
            versions: Mutex::new(HashMap::new()),
        })
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn contains_device(&self, device: &str) -> bool {
        self.devices.contains_key(device)
    }

    /// All device names in natural ascending order
    pub fn list_devices(&self) -> Arc<[String]> {
        self.device_names
            .get_or_init(|| {
                let mut names: Vec<String> =
                    self.devices.keys().map(|k| k.to_string()).collect();
                // Byte order first so names that tie naturally stay in a fixed order
                names.sort();
                sort_natural_by_key(&mut names, SortOrder::Ascending, |n| n.as_str());
                names.into()
            })
            .clone()
    }

    /// Firmwares for a device, newest build first
    ///
    /// A known device without any firmware entries yields an empty list.
    pub fn list_versions_for_device(
        &self,
        device: &str,
    ) -> Result<Arc<[FirmwareDescriptor]>, CatalogError> {
        if let Some(cached) = self.lock_versions().get(device) {
            return Ok(cached.clone());
        }

        let body = self
            .devices
            .get(device)
            .ok_or_else(|| NotFoundError::UnknownDevice {
                device: device.to_string(),
            })?;

        let mut firmwares = decode_firmwares(device, body)?;
        sort_natural_by_key(&mut firmwares, SortOrder::Descending, |f| f.build.as_str());

        if firmwares.is_empty() {
            tracing::debug!("No versions found for device '{}'", device);
        }

        let firmwares: Arc<[FirmwareDescriptor]> = firmwares.into();
        self.lock_versions()
            .insert(device.to_string(), firmwares.clone());
        Ok(firmwares)
    }

    fn lock_versions(&self) -> MutexGuard<'_, HashMap<String, Arc<[FirmwareDescriptor]>>> {
        // Entries are inserted whole; a poisoned map is still consistent
        self.versions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn decode_firmwares(
    device: &str,
    body: &RawValue,
) -> Result<Vec<FirmwareDescriptor>, ParseError> {
    let entry: DeviceEntry =
        serde_json::from_str(body.get()).map_err(|source| ParseError::Device {
            device: device.to_string(),
            source,
        })?;

    let records = entry.firmwares.ok_or_else(|| ParseError::MissingFirmwares {
        device: device.to_string(),
    })?;

    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| -> Result<FirmwareDescriptor, ParseError> {
            let missing = |field| ParseError::MissingField {
                device: device.to_string(),
                position,
                field,
            };
            Ok(FirmwareDescriptor {
                version: record.version.ok_or_else(|| missing("version"))?,
                build: record.build.ok_or_else(|| missing("buildid"))?,
                url: record.url.ok_or_else(|| missing("url"))?,
            })
        })
        .collect()
}
