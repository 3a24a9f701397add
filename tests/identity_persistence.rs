// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity table and configuration persistence across restarts.

use std::fs;

use fibaro_bridge::StoreError;
use fibaro_bridge::config::{BridgeConfig, StaticAssets};
use fibaro_bridge::registry::{IdentityRegistry, JsonFileStore, MappingStore};
use fibaro_bridge::types::{DeviceKey, ExternalId};
use tempfile::TempDir;

fn key(s: &str) -> DeviceKey {
    DeviceKey::new(s)
}

#[test]
fn ids_are_stable_across_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");

    {
        let mut registry = IdentityRegistry::open(JsonFileStore::new(&path), 100).unwrap();
        assert_eq!(registry.allocate(&key("a")).unwrap().external_id, ExternalId::new(101));
        assert_eq!(registry.allocate(&key("b")).unwrap().external_id, ExternalId::new(102));
    }

    let mut registry = IdentityRegistry::open(JsonFileStore::new(&path), 100).unwrap();
    assert_eq!(registry.resolve(&key("a")), Some(ExternalId::new(101)));
    assert_eq!(registry.resolve(&key("b")), Some(ExternalId::new(102)));
    assert_eq!(registry.allocate(&key("c")).unwrap().external_id, ExternalId::new(103));
    assert_eq!(registry.lookup_by_external_id(ExternalId::new(102)), Some(&key("b")));
}

#[test]
fn allocation_continues_above_stored_maximum() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(
        &path,
        r#"[{"vDevId": "old", "fibaroId": 250, "order": 250}]"#,
    )
    .unwrap();

    let mut registry = IdentityRegistry::open(JsonFileStore::new(&path), 100).unwrap();
    assert_eq!(registry.allocate(&key("new")).unwrap().external_id, ExternalId::new(251));

    let stored = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(stored.len(), 2);
    assert!(!dir.path().join("mapping.json.tmp").exists());
}

#[test]
fn duplicate_ids_on_disk_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(
        &path,
        r#"[{"vDevId": "a", "fibaroId": 101, "order": 101},
            {"vDevId": "b", "fibaroId": 101, "order": 101}]"#,
    )
    .unwrap();

    let err = IdentityRegistry::open(JsonFileStore::new(&path), 100).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn blank_file_is_an_empty_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mapping.json");
    fs::write(&path, "\n").unwrap();

    let registry = IdentityRegistry::open(JsonFileStore::new(&path), 100).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn config_is_generated_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let first = BridgeConfig::load_or_init(&path).unwrap();
    assert!(first.serial().starts_with("HCZ-"));
    let second = BridgeConfig::load_or_init(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn config_missing_serial_is_completed_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"MAC": "aa:bb:cc:dd:ee:ff", "idFloor": 500}"#).unwrap();

    let config = BridgeConfig::load_or_init(&path).unwrap();
    assert_eq!(config.mac(), "aa:bb:cc:dd:ee:ff");
    assert_eq!(config.id_floor(), 500);

    let written: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(written["HCName"], config.serial());
}

#[test]
fn assets_fall_back_when_missing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("hierarchy.json"), r#"{"type": "com.fibaro.device"}"#).unwrap();

    let assets = StaticAssets::load_dir(dir.path()).unwrap();
    assert_eq!(assets.hierarchy["type"], "com.fibaro.device");
    assert_eq!(assets.rgb_programs, serde_json::json!([]));
}
