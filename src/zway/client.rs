// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Client;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::command::{CommandReceiver, DeviceCommand};
use crate::device::{DeviceSnapshot, DeviceSource, InternalDevice, Location, MeshNode};
use crate::error::{ParseError, ProtocolError, Result};
use crate::types::DeviceKey;

const DEVICES_PATH: &str = "/ZAutomation/api/v1/devices";
const LOCATIONS_PATH: &str = "/ZAutomation/api/v1/locations";

/// Last seen device-id set and when it last changed.
#[derive(Debug, Default)]
struct Structure {
    keys: BTreeSet<DeviceKey>,
    changed_at: i64,
}

/// HTTP client of a Z-Way controller.
///
/// Clones share the device-set tracking used for the structure-change time.
#[derive(Debug, Clone)]
pub struct ZWayClient {
    base_url: String,
    http: Client,
    credentials: Option<(String, String)>,
    bus: String,
    structure: Arc<Mutex<Option<Structure>>>,
}

impl ZWayClient {
    pub(super) fn new(
        base_url: String,
        http: Client,
        credentials: Option<(String, String)>,
        bus: String,
    ) -> Self {
        Self {
            base_url,
            http,
            credentials,
            bus,
            structure: Arc::default(),
        }
    }

    /// Returns the base URL of the controller.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reads devices, locations and mesh facts at the current time.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if a request fails and `Error::Parse` if
    /// the device or location list is malformed.
    pub async fn fetch_snapshot(&self) -> Result<DeviceSnapshot> {
        self.fetch_snapshot_at(chrono::Utc::now().timestamp()).await
    }

    /// Reads a snapshot, stamping a structure change at `now` if the
    /// device-id set differs from the previous fetch.
    ///
    /// A missing or unreadable mesh table is not fatal: devices are then
    /// reported without sleeping or failed facts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if a request fails and `Error::Parse` if
    /// the device or location list is malformed.
    pub async fn fetch_snapshot_at(&self, now: i64) -> Result<DeviceSnapshot> {
        let devices = self.fetch_devices().await?;
        let locations = self.fetch_locations().await?;

        let mut snapshot = DeviceSnapshot::new();
        snapshot.set_locations(locations);
        for device in devices {
            snapshot.upsert(device);
        }

        match self.fetch_mesh().await {
            Ok(nodes) => {
                for (node, facts) in nodes {
                    snapshot.set_mesh_node(self.bus.clone(), node, facts);
                }
            }
            Err(err) => tracing::warn!(error = %err, "Z-Wave mesh data unavailable"),
        }

        let changed_at = self.track_structure(snapshot.keys().cloned(), now);
        snapshot.set_structure_change(changed_at);
        tracing::debug!(devices = snapshot.devices().len(), "Fetched Z-Way snapshot");
        Ok(snapshot)
    }

    /// Executes a command.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` when waking a device that is
    /// not a Z-Wave virtual device, and other `ProtocolError`s when the
    /// controller cannot be reached or rejects the request.
    pub async fn send_command(
        &self,
        key: &DeviceKey,
        command: DeviceCommand,
    ) -> std::result::Result<(), ProtocolError> {
        self.get(&command_path(key, command)?).await.map(drop)
    }

    async fn fetch_devices(&self) -> Result<Vec<InternalDevice>> {
        let body = self.get_json(DEVICES_PATH).await?;
        let Some(Value::Array(list)) = body.pointer("/data/devices").cloned() else {
            return Err(ParseError::MissingField("data.devices".to_string()).into());
        };

        let mut devices = Vec::with_capacity(list.len());
        for raw in list {
            match serde_json::from_value::<InternalDevice>(raw) {
                Ok(device) => devices.push(device),
                Err(err) => tracing::warn!(error = %err, "Skipping unreadable device"),
            }
        }
        Ok(devices)
    }

    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        let body = self.get_json(LOCATIONS_PATH).await?;
        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| ParseError::MissingField("data".to_string()))?;
        Ok(serde_json::from_value(data).map_err(ParseError::from)?)
    }

    async fn fetch_mesh(&self) -> Result<Vec<(u32, MeshNode)>> {
        let body = self
            .get_json(&format!("{}/Data/0", mesh_api_root(&self.bus)))
            .await?;
        let Some(nodes) = body.get("devices").and_then(Value::as_object) else {
            return Err(ParseError::MissingField("devices".to_string()).into());
        };

        let flag = |node: &Value, name: &str| {
            node.pointer(&format!("/data/{name}/value"))
                .and_then(Value::as_bool)
                .unwrap_or(false)
        };
        Ok(nodes
            .iter()
            .filter_map(|(id, node)| {
                let id = id.parse::<u32>().ok()?;
                let facts = MeshNode {
                    listening: flag(node, "isListening"),
                    failed: flag(node, "isFailed"),
                };
                Some((id, facts))
            })
            .collect())
    }

    fn track_structure(&self, keys: impl Iterator<Item = DeviceKey>, now: i64) -> i64 {
        let keys: BTreeSet<DeviceKey> = keys.collect();
        let mut guard = self.structure.lock();
        match guard.as_mut() {
            Some(seen) if seen.keys == keys => seen.changed_at,
            Some(seen) => {
                tracing::info!(
                    before = seen.keys.len(),
                    after = keys.len(),
                    "Device set changed"
                );
                seen.keys = keys;
                seen.changed_at = now;
                now
            }
            None => {
                *guard = Some(Structure {
                    keys,
                    changed_at: now,
                });
                now
            }
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let body = self.get(path).await?;
        Ok(serde_json::from_str(&body).map_err(ParseError::from)?)
    }

    async fn get(&self, path: &str) -> std::result::Result<String, ProtocolError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(url = %url, "Sending Z-Way request");

        let mut request = self.http.get(&url);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }
        let response = request.send().await.map_err(ProtocolError::Http)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::AuthenticationFailed);
        }
        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response.text().await.map_err(ProtocolError::Http)
    }
}

fn command_path(
    key: &DeviceKey,
    command: DeviceCommand,
) -> std::result::Result<String, ProtocolError> {
    let Some(name) = command.zway_name() else {
        let address = key
            .zway_address()
            .ok_or_else(|| ProtocolError::InvalidAddress(key.to_string()))?;
        return Ok(format!(
            "{}/Run/devices[{}].SendNoOperation()",
            mesh_api_root(address.bus()),
            address.node()
        ));
    };

    let mut path = format!(
        "{DEVICES_PATH}/{}/command/{name}",
        urlencoding::encode(key.as_str())
    );
    let params = command.zway_params();
    if !params.is_empty() {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect();
        path.push('?');
        path.push_str(&query.join("&"));
    }
    Ok(path)
}

/// API root of a Z-Wave binding: the default binding is served under
/// `/ZWaveAPI`, others under `/ZWave.<name>`.
fn mesh_api_root(bus: &str) -> String {
    if bus == super::ZWayConfig::DEFAULT_BUS {
        "/ZWaveAPI".to_string()
    } else {
        format!("/ZWave.{bus}")
    }
}

/// Drains a command queue into the controller on a background task.
///
/// Failed commands are logged and dropped. The task ends when every
/// [`CommandQueue`](crate::command::CommandQueue) handle is gone.
#[must_use]
pub fn spawn_dispatcher(client: ZWayClient, mut rx: CommandReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(queued) = rx.recv().await {
            match client.send_command(&queued.key, queued.command).await {
                Ok(()) => {
                    tracing::debug!(device = %queued.key, command = %queued.command, "Command sent");
                }
                Err(err) => tracing::warn!(
                    device = %queued.key,
                    command = %queued.command,
                    error = %err,
                    "Command failed"
                ),
            }
        }
        tracing::debug!("Command queue closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RgbColor;
    use crate::zway::ZWayConfig;

    fn client() -> ZWayClient {
        ZWayConfig::new("http://127.0.0.1:1").into_client().unwrap()
    }

    #[test]
    fn command_paths() {
        let key = DeviceKey::new("ZWayVDev_zway_5-0-38");
        assert_eq!(
            command_path(&key, DeviceCommand::On).unwrap(),
            "/ZAutomation/api/v1/devices/ZWayVDev_zway_5-0-38/command/on"
        );
        assert_eq!(
            command_path(&key, DeviceCommand::Exact(55.5)).unwrap(),
            "/ZAutomation/api/v1/devices/ZWayVDev_zway_5-0-38/command/exact?level=55.5"
        );
        assert_eq!(
            command_path(&key, DeviceCommand::Color(RgbColor::new(255, 0, 16))).unwrap(),
            "/ZAutomation/api/v1/devices/ZWayVDev_zway_5-0-38/command/exact?red=255&green=0&blue=16"
        );
        assert_eq!(
            command_path(&key, DeviceCommand::WakeUp).unwrap(),
            "/ZWaveAPI/Run/devices[5].SendNoOperation()"
        );
    }

    #[test]
    fn wake_up_requires_zwave_key() {
        let err = command_path(&DeviceKey::new("Dummy_3"), DeviceCommand::WakeUp).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidAddress(_)));
    }

    #[test]
    fn secondary_bus_root() {
        assert_eq!(mesh_api_root("zway"), "/ZWaveAPI");
        assert_eq!(mesh_api_root("zway2"), "/ZWave.zway2");
    }

    #[test]
    fn structure_stamp_moves_only_on_change() {
        let client = client();
        let keys = |names: &[&str]| {
            names
                .iter()
                .map(|n| DeviceKey::new(*n))
                .collect::<Vec<_>>()
                .into_iter()
        };
        assert_eq!(client.track_structure(keys(&["a", "b"]), 10), 10);
        assert_eq!(client.track_structure(keys(&["b", "a"]), 20), 10);
        assert_eq!(client.track_structure(keys(&["a"]), 30), 30);
        assert_eq!(client.clone().track_structure(keys(&["a"]), 40), 30);
    }
}
