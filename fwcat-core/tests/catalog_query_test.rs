//! End-to-end queries over fixture catalogs

mod common;

use common::{init_test_logging, ota_catalog, release_catalog};
use fwcat_core::resolver::{latest_for_board, resolve, resolve_for_board};
use fwcat_core::{
    CatalogError, CatalogKind, CatalogSession, NotFoundError, RawCatalog, SessionSource,
};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn release_session() -> CatalogSession {
    let raw = release_catalog(&[
        (
            "iPhone10,3",
            &[("15.0", "19A346"), ("14.0", "18A373"), ("15.7", "19H117")],
        ),
        ("iPhone10,6", &[("14.1", "18B92"), ("14.0", "18A373")]),
        ("iPhone10,10", &[]),
        ("iPad7,11", &[("13.1", "17A844")]),
        ("iPad7,2", &[("13.1", "17A844")]),
        ("AppleTV5,3", &[("15.0", "19J346")]),
    ]);
    CatalogSession::from_raw(CatalogKind::Release, RawCatalog::from(raw))
}

#[test]
fn test_devices_in_natural_order() {
    init_test_logging();
    let session = release_session();
    let catalog = session.parse().unwrap();

    assert_eq!(
        catalog.list_devices().to_vec(),
        vec![
            "AppleTV5,3",
            "iPad7,2",
            "iPad7,11",
            "iPhone10,3",
            "iPhone10,6",
            "iPhone10,10"
        ]
    );
}

#[test]
fn test_builds_newest_first_regardless_of_input_order() {
    let session = release_session();
    let catalog = session.parse().unwrap();

    let builds: Vec<String> = catalog
        .list_versions_for_device("iPhone10,3")
        .unwrap()
        .iter()
        .map(|f| f.build.clone())
        .collect();
    assert_eq!(builds, vec!["19H117", "19A346", "18A373"]);
}

#[test]
fn test_repeated_queries_are_stable() {
    let session = release_session();
    let catalog = session.parse().unwrap();

    let devices = catalog.list_devices();
    let versions = catalog.list_versions_for_device("iPhone10,6").unwrap();
    for _ in 0..3 {
        assert_eq!(catalog.list_devices(), devices);
        assert_eq!(catalog.list_versions_for_device("iPhone10,6").unwrap(), versions);
    }
}

#[test]
fn test_fresh_parse_has_fresh_memo() {
    let session = release_session();
    let first = session.parse().unwrap();
    let second = session.parse().unwrap();

    assert_eq!(
        first.list_versions_for_device("iPhone10,3").unwrap(),
        second.list_versions_for_device("iPhone10,3").unwrap()
    );
}

#[test]
fn test_resolver_policy() {
    let session = release_session();
    let catalog = session.parse().unwrap();

    let latest = resolve(&catalog, "iPhone10,6", None, None).unwrap();
    assert_eq!(
        latest,
        catalog.list_versions_for_device("iPhone10,6").unwrap()[0]
    );

    let by_build = resolve(&catalog, "iPhone10,6", Some("14.0"), Some("18B92")).unwrap();
    assert_eq!(by_build.version, "14.1");
    assert_eq!(by_build.url, "https://updates.example/18B92.ipsw");

    let by_version = resolve(&catalog, "iPhone10,6", Some("14.0"), None).unwrap();
    assert_eq!(by_version.build, "18A373");

    let err = resolve(&catalog, "iPhone10,6", Some("999.0"), None).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound(NotFoundError::NoMatch { .. })
    ));

    let err = resolve(&catalog, "iPhone10,10", None, None).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound(NotFoundError::NoFirmwares { .. })
    ));

    let err = resolve(&catalog, "Watch6,1", None, None).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound(NotFoundError::UnknownDevice { .. })
    ));
}

#[test]
fn test_board_lookup() {
    let session = release_session();
    let catalog = session.parse().unwrap();
    let identifiers = HashMap::from([((0x8015u32, 0x06u32), "iPhone10,3".to_string())]);

    let latest = latest_for_board(&catalog, &identifiers, 0x8015, 0x06).unwrap();
    assert_eq!(latest.build, "19H117");

    let pinned =
        resolve_for_board(&catalog, &identifiers, 0x8015, 0x06, None, Some("19a346")).unwrap();
    assert_eq!(pinned.version, "15.0");
}

#[test]
fn test_ota_catalog_without_devices_key() {
    let raw = ota_catalog(&[("iPhone10,3", &[("15.7", "19H117"), ("15.6", "19G71")])]);
    let session = CatalogSession::from_raw(CatalogKind::Ota, RawCatalog::from(raw.clone()));
    assert_eq!(session.source(), SessionSource::Provided);

    let catalog = session.parse().unwrap();
    assert_eq!(catalog.list_devices().to_vec(), vec!["iPhone10,3"]);
    assert_eq!(
        resolve(&catalog, "iPhone10,3", Some("15.6"), None)
            .unwrap()
            .build,
        "19G71"
    );

    // The same document is rejected when read as a release catalog
    let release = CatalogSession::from_raw(CatalogKind::Release, RawCatalog::from(raw));
    assert!(release.parse().is_err());
}
