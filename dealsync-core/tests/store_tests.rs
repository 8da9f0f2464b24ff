//! Mapping-store persistence, atomic-write safety, and config loading tests.

use assert_fs::prelude::*;
use dealsync_core::{
    config::{self, config_path_at},
    mapping::{store_path_at, FileMappingStore, MappingStore},
    ConfigError, DealId, MappingError, RemoteDealId,
};
use predicates::prelude::predicate;
use std::fs;

fn deal() -> DealId {
    DealId::from("deal-1001")
}

// ---------------------------------------------------------------------------
// 1. Mapping store
// ---------------------------------------------------------------------------

#[test]
fn create_writes_store_file_under_home() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut store = FileMappingStore::at(home.path());
    store
        .create(&deal(), &RemoteDealId::from("77"))
        .expect("create");

    home.child(".dealsync/mappings.json")
        .assert(predicate::path::exists());
    home.child(".dealsync/mappings.json")
        .assert(predicate::str::contains("deal-1001"));
}

#[test]
fn mappings_survive_a_fresh_store_instance() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    FileMappingStore::at(home.path())
        .create(&deal(), &RemoteDealId::from("77"))
        .expect("create");

    let reopened = FileMappingStore::at(home.path());
    let found = reopened.lookup(&deal()).expect("lookup").expect("mapping");
    assert_eq!(found.remote_deal_id, RemoteDealId::from("77"));
    assert!(reopened
        .lookup(&DealId::from("other"))
        .expect("lookup")
        .is_none());
}

#[test]
fn unreadable_store_surfaces_as_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    // A directory where the file should be cannot be read as a file.
    fs::create_dir_all(store_path_at(home.path())).expect("mkdir");

    let err = FileMappingStore::at(home.path())
        .lookup(&deal())
        .unwrap_err();
    assert!(matches!(err, MappingError::Io { .. }), "got: {err}");
}

#[test]
fn crashed_write_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut store = FileMappingStore::at(home.path());
    store
        .create(&deal(), &RemoteDealId::from("77"))
        .expect("create");
    let original = fs::read(store.path()).expect("read");

    // Simulate crash: .tmp written but process died before rename
    let tmp = store.path().with_extension("json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write tmp");

    assert_eq!(fs::read(store.path()).expect("read"), original);
    assert!(store.lookup(&deal()).expect("lookup").is_some());
}

// ---------------------------------------------------------------------------
// 2. Config
// ---------------------------------------------------------------------------

#[test]
fn missing_config_returns_not_found() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn corrupt_config_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = config_path_at(home.path());
    fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
    fs::write(&path, b"api_url: [unclosed").expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn config_with_credentials_loads() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".dealsync/config.yaml")
        .write_str(
            "api_url: https://api.test/v1\n\
             timeout_secs: 5\n\
             credentials:\n  - brand: office-7\n    email: ops@x.com\n    password: pw\n",
        )
        .expect("write");

    let config = config::load_at(home.path()).expect("load");
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.credentials.len(), 1);
    assert_eq!(config.credentials[0].brand.as_str(), "office-7");
}
