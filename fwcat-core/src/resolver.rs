//! Version resolver - picks one firmware for a device
//!
//! Selection order for a device's firmwares (newest build first):
//!
//! 1. no selectors: the first entry (latest build)
//! 2. the first entry whose build matches the build selector (ASCII
//!    case-insensitive)
//! 3. the first entry whose version equals the version selector
//!
//! A caller passing both a version and a build that point at different
//! entries always gets the build match, whichever entry sorts first.

use std::collections::HashMap;

use crate::error::{CatalogError, NotFoundError};
use crate::index::{FirmwareDescriptor, ParsedCatalog};

/// Maps hardware chip/board ids to the catalog's device name
///
/// The lookup tables themselves live outside this crate.
pub trait DeviceIdentifierMap {
    fn product_type(&self, cpid: u32, bdid: u32) -> Option<String>;
}

impl DeviceIdentifierMap for HashMap<(u32, u32), String> {
    fn product_type(&self, cpid: u32, bdid: u32) -> Option<String> {
        self.get(&(cpid, bdid)).cloned()
    }
}

/// Resolve a device plus optional version/build to one firmware
///
/// Empty selector strings count as absent.
pub fn resolve(
    catalog: &ParsedCatalog<'_>,
    device: &str,
    version: Option<&str>,
    build: Option<&str>,
) -> Result<FirmwareDescriptor, CatalogError> {
    let firmwares = catalog.list_versions_for_device(device)?;

    let Some(latest) = firmwares.first() else {
        return Err(NotFoundError::NoFirmwares {
            device: device.to_string(),
        }
        .into());
    };

    let version = version.filter(|v| !v.is_empty());
    let build = build.filter(|b| !b.is_empty());

    if version.is_none() && build.is_none() {
        return Ok(latest.clone());
    }

    let by_build = build.and_then(|b| {
        firmwares
            .iter()
            .find(|f| f.build.eq_ignore_ascii_case(b))
    });
    let by_version = || version.and_then(|v| firmwares.iter().find(|f| f.version == v));

    if let Some(firmware) = by_build.or_else(by_version) {
        return Ok(firmware.clone());
    }

    Err(NotFoundError::NoMatch {
        device: device.to_string(),
        version: version.unwrap_or_default().to_string(),
        build: build.unwrap_or_default().to_string(),
    }
    .into())
}

/// Resolve by hardware ids instead of device name
pub fn resolve_for_board(
    catalog: &ParsedCatalog<'_>,
    identifiers: &dyn DeviceIdentifierMap,
    cpid: u32,
    bdid: u32,
    version: Option<&str>,
    build: Option<&str>,
) -> Result<FirmwareDescriptor, CatalogError> {
    let device = identifiers
        .product_type(cpid, bdid)
        .ok_or(NotFoundError::UnknownBoard { cpid, bdid })?;

    tracing::debug!("CPID 0x{:x} BDID 0x{:x} maps to '{}'", cpid, bdid, device);
    resolve(catalog, &device, version, build)
}

/// Latest firmware for a board
pub fn latest_for_board(
    catalog: &ParsedCatalog<'_>,
    identifiers: &dyn DeviceIdentifierMap,
    cpid: u32,
    bdid: u32,
) -> Result<FirmwareDescriptor, CatalogError> {
    resolve_for_board(catalog, identifiers, cpid, bdid, None, None)
}
