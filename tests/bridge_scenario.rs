// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end request scenarios through the `Bridge`.

use chrono::{DateTime, FixedOffset, TimeZone};
use fibaro_bridge::api::{ApiRequest, Bridge, StaticProfiles};
use fibaro_bridge::command::{CommandQueue, DeviceCommand, RecordingSink};
use fibaro_bridge::config::BridgeConfig;
use fibaro_bridge::device::{DeviceSnapshot, DeviceType, InternalDevice, Location, MeshNode};
use fibaro_bridge::registry::{IdentityRegistry, MemoryStore};
use fibaro_bridge::types::DeviceKey;
use fibaro_bridge::visibility::AccessProfile;
use serde_json::{Value, json};

const LAMP: &str = "ZWayVDev_zway_2-0-37";
const T0: i64 = 1_714_550_000;

fn at(timestamp: i64) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .timestamp_opt(timestamp, 0)
        .unwrap()
}

fn bridge(sink: RecordingSink) -> Bridge {
    let registry = IdentityRegistry::open(MemoryStore::new(), 100).unwrap();
    let profiles = StaticProfiles::new()
        .with_profile(AccessProfile::admin(1, "admin"), "admin")
        .with_profile(AccessProfile::restricted(5, "kid"), "kid");
    Bridge::new(BridgeConfig::new(), registry, profiles, sink)
}

fn lamp_snapshot() -> DeviceSnapshot {
    DeviceSnapshot::new()
        .with_location(Location::new(1, "Living room"))
        .with_device(
            InternalDevice::new(LAMP, DeviceType::SwitchBinary)
                .with_location(1)
                .with_update_time(T0 - 60)
                .with_metric("level", "on")
                .with_metric("title", "Lamp"),
        )
        .with_mesh_node("zway", 2, MeshNode::listening())
        .with_structure_change(T0 - 3600)
}

fn get(bridge: &Bridge, uri: &str, source: &DeviceSnapshot, now: i64) -> Value {
    let request = ApiRequest::from_uri(uri).with_basic_auth("admin", "admin");
    let response = bridge.handle_at(&request, source, at(now)).unwrap().unwrap();
    assert_eq!(response.header("Content-Type"), Some("application/json;charset=UTF-8"));
    response.json_body().unwrap().clone()
}

fn refresh(bridge: &Bridge, source: &DeviceSnapshot, last: Option<i64>, now: i64) -> Value {
    let uri = match last {
        Some(last) => format!("/api/mobile/interface/refreshStates?last={last}"),
        None => "/api/mobile/interface/refreshStates".to_string(),
    };
    get(bridge, &uri, source, now)
}

#[test]
fn binary_switch_lifecycle() {
    let bridge = bridge(RecordingSink::new());
    let mut source = lamp_snapshot();

    let data = get(&bridge, "/api/mobile/interface/data", &source, T0);
    let lamp = data["devices"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["id"] == 101)
        .unwrap()
        .clone();
    assert_eq!(lamp["type"], "com.fibaro.binarySwitch");
    assert_eq!(lamp["properties"]["value"], "1");
    assert_eq!(lamp["roomId"], 1);

    let handshake = refresh(&bridge, &source, None, T0 + 1);
    assert_eq!(handshake["changes"], json!([]));
    let cursor = handshake["last"].as_i64().unwrap();

    let quiet = refresh(&bridge, &source, Some(cursor), T0 + 2);
    assert_eq!(quiet["events"], json!([]));
    assert_eq!(quiet["changes"], json!([]));

    let device = source.device_mut(&DeviceKey::new(LAMP)).unwrap();
    device.metrics.set("level", "off");
    device.update_time = T0 + 3;

    let changed = refresh(&bridge, &source, Some(cursor), T0 + 4);
    let events = changed["events"].as_array().unwrap();
    let changes = changed["changes"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(changes.len(), 1);
    assert_eq!(events[0]["type"], "DevicePropertyUpdatedEvent");
    assert_eq!(events[0]["data"]["id"], 101);
    assert_eq!(events[0]["data"]["property"], "value");
    assert_eq!(changes[0]["id"], 101);
    assert_eq!(changes[0]["value"], "0");
    assert_eq!(changed["last"], T0 + 4);
}

#[test]
fn structure_change_reports_every_visible_device() {
    let bridge = bridge(RecordingSink::new());
    let source = lamp_snapshot().with_device(
        InternalDevice::new("ZWayVDev_zway_3-0-49-1", DeviceType::SensorMultilevel)
            .with_probe_type("temperature")
            .with_location(1)
            .with_update_time(T0 - 7200)
            .with_metric("level", 21.5),
    );
    get(&bridge, "/api/mobile/interface/data", &source, T0);

    let quiet = refresh(&bridge, &source, Some(T0), T0 + 10);
    assert_eq!(quiet["changes"], json!([]));

    let restructured = source.with_structure_change(T0 + 20);
    let all = refresh(&bridge, &restructured, Some(T0 + 10), T0 + 30);
    let ids: Vec<i64> = all["changes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [101, 102]);
}

#[test]
fn restricted_user_without_rooms_sees_nothing() {
    let bridge = bridge(RecordingSink::new());
    let source = lamp_snapshot();
    let request = ApiRequest::from_uri("/api/mobile/interface/data").with_basic_auth("kid", "kid");
    let response = bridge.handle_at(&request, &source, at(T0)).unwrap().unwrap();

    let devices = response.json_body().unwrap()["devices"].as_array().unwrap().clone();
    let types: Vec<&str> = devices.iter().map(|d| d["type"].as_str().unwrap()).collect();
    assert_eq!(types, ["HC_user", "weather", "iOS_device"]);
}

#[test]
fn ids_survive_device_reordering() {
    let bridge = bridge(RecordingSink::new());
    let first = DeviceSnapshot::new()
        .with_device(InternalDevice::new("Dummy_a", DeviceType::SwitchBinary))
        .with_device(InternalDevice::new("Dummy_b", DeviceType::SwitchBinary));
    get(&bridge, "/api/mobile/interface/data", &first, T0);

    let reordered = DeviceSnapshot::new()
        .with_device(InternalDevice::new("Dummy_c", DeviceType::SwitchBinary))
        .with_device(InternalDevice::new("Dummy_b", DeviceType::SwitchBinary))
        .with_device(InternalDevice::new("Dummy_a", DeviceType::SwitchBinary));
    get(&bridge, "/api/mobile/interface/data", &reordered, T0 + 1);

    let registry = bridge.registry();
    let id = |key: &str| registry.resolve(&DeviceKey::new(key)).unwrap().value();
    assert_eq!((id("Dummy_a"), id("Dummy_b"), id("Dummy_c")), (101, 102, 103));
}

#[tokio::test]
async fn action_calls_reach_the_command_queue() {
    let (queue, mut rx) = CommandQueue::new();
    let registry = IdentityRegistry::open(MemoryStore::new(), 100).unwrap();
    let profiles = StaticProfiles::new().with_profile(AccessProfile::admin(1, "admin"), "admin");
    let bridge = Bridge::new(BridgeConfig::new(), registry, profiles, queue);
    let source = lamp_snapshot();

    get(&bridge, "/api/mobile/interface/data", &source, T0);
    get(&bridge, "/api/callAction?deviceID=101&name=turnOff", &source, T0 + 1);

    let queued = rx.recv().await.unwrap();
    assert_eq!(queued.key, DeviceKey::new(LAMP));
    assert_eq!(queued.command, DeviceCommand::Off);
    assert!(rx.try_recv().is_err());
}
