// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device model.
//!
//! Devices are owned by the Z-Way automation layer; the bridge only reads
//! them. [`InternalDevice`] deserializes directly from the JSON the Z-Way
//! REST API returns for a virtual device:
//!
//! ```
//! use fibaro_bridge::device::{DeviceType, InternalDevice};
//!
//! let json = r#"{
//!     "id": "ZWayVDev_zway_5-0-37",
//!     "deviceType": "switchBinary",
//!     "probeType": "",
//!     "location": 2,
//!     "updateTime": 1700000000,
//!     "permanently_hidden": false,
//!     "metrics": {"level": "on", "title": "Lamp"}
//! }"#;
//!
//! let device: InternalDevice = serde_json::from_str(json).unwrap();
//! assert_eq!(device.device_type, DeviceType::SwitchBinary);
//! assert_eq!(device.probe_type, None);
//! assert_eq!(device.location, 2);
//! ```

mod snapshot;

pub use snapshot::{DeviceSnapshot, DeviceSource};

use serde::{Deserialize, Deserializer};

use crate::types::{DeviceKey, MetricValue, Metrics, RoomId, UNASSIGNED_ROOM};

/// Device-type tag assigned by the device subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum DeviceType {
    /// On/off actuator.
    #[serde(rename = "switchBinary")]
    SwitchBinary,
    /// Dimmer or other level actuator.
    #[serde(rename = "switchMultilevel")]
    SwitchMultilevel,
    /// RGBW color controller.
    #[serde(rename = "switchRGBW")]
    SwitchRgbw,
    /// RGB color controller.
    #[serde(rename = "switchRGB")]
    SwitchRgb,
    /// Open/closed, motion, flood, smoke... sensors.
    #[serde(rename = "sensorBinary")]
    SensorBinary,
    /// Numeric sensors and meters.
    #[serde(rename = "sensorMultilevel")]
    SensorMultilevel,
    /// Composite sensors reporting several lines (weather).
    #[serde(rename = "sensorMultiline")]
    SensorMultiline,
    /// Heating setpoint.
    #[serde(rename = "thermostat")]
    Thermostat,
    /// Battery level reporter.
    #[serde(rename = "battery")]
    Battery,
    /// Any type the bridge has not been taught.
    #[serde(other)]
    Other,
}

/// A device as represented by the underlying device subsystem.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InternalDevice {
    /// Opaque key.
    #[serde(rename = "id")]
    pub key: DeviceKey,
    /// Device-type tag.
    #[serde(rename = "deviceType")]
    pub device_type: DeviceType,
    /// Optional probe (sub-type) tag.
    #[serde(rename = "probeType", default, deserialize_with = "empty_as_none")]
    pub probe_type: Option<String>,
    /// Room id; `0` when unassigned.
    #[serde(default)]
    pub location: RoomId,
    /// Last update, unix seconds.
    #[serde(rename = "updateTime", default)]
    pub update_time: i64,
    /// Devices hidden from every consumer.
    #[serde(default)]
    pub permanently_hidden: bool,
    /// Metric bag.
    #[serde(default)]
    pub metrics: Metrics,
}

impl InternalDevice {
    /// Creates a device with empty metrics, no room and no probe type.
    #[must_use]
    pub fn new(key: impl Into<DeviceKey>, device_type: DeviceType) -> Self {
        Self {
            key: key.into(),
            device_type,
            probe_type: None,
            location: UNASSIGNED_ROOM,
            update_time: 0,
            permanently_hidden: false,
            metrics: Metrics::new(),
        }
    }

    /// Sets the probe type.
    #[must_use]
    pub fn with_probe_type(mut self, probe_type: impl Into<String>) -> Self {
        self.probe_type = Some(probe_type.into());
        self
    }

    /// Sets the room.
    #[must_use]
    pub fn with_location(mut self, location: RoomId) -> Self {
        self.location = location;
        self
    }

    /// Sets the last-update timestamp.
    #[must_use]
    pub fn with_update_time(mut self, update_time: i64) -> Self {
        self.update_time = update_time;
        self
    }

    /// Adds a metric.
    #[must_use]
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.set(key, value);
        self
    }

    /// Marks the device as permanently hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.permanently_hidden = true;
        self
    }

    /// Returns the probe type as a string slice.
    #[must_use]
    pub fn probe(&self) -> Option<&str> {
        self.probe_type.as_deref()
    }
}

/// A room as known to the device subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    /// Room id.
    pub id: RoomId,
    /// Display name.
    #[serde(default)]
    pub title: String,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(id: RoomId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Network facts about a Z-Wave mesh node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshNode {
    /// Mains-powered nodes listen permanently; battery nodes sleep.
    pub listening: bool,
    /// The controller has marked the node as failed.
    pub failed: bool,
}

impl MeshNode {
    /// A permanently listening, healthy node.
    #[must_use]
    pub const fn listening() -> Self {
        Self {
            listening: true,
            failed: false,
        }
    }

    /// A sleeping (battery) node.
    #[must_use]
    pub const fn sleeping() -> Self {
        Self {
            listening: false,
            failed: false,
        }
    }

    /// Marks the node as failed.
    #[must_use]
    pub const fn failed(mut self) -> Self {
        self.failed = true;
        self
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_sensor() {
        let json = r#"{
            "id": "ZWayVDev_zway_9-0-48-1",
            "deviceType": "sensorBinary",
            "probeType": "door-window",
            "location": 3,
            "updateTime": 1700000100,
            "metrics": {"level": "off", "title": "Front door", "icon": "door"}
        }"#;
        let device: InternalDevice = serde_json::from_str(json).unwrap();
        assert_eq!(device.device_type, DeviceType::SensorBinary);
        assert_eq!(device.probe(), Some("door-window"));
        assert_eq!(device.update_time, 1_700_000_100);
        assert!(!device.permanently_hidden);
        assert_eq!(device.metrics.icon(), Some("door"));
    }

    #[test]
    fn unknown_device_type_is_other() {
        let json = r#"{"id": "Camera_3", "deviceType": "camera"}"#;
        let device: InternalDevice = serde_json::from_str(json).unwrap();
        assert_eq!(device.device_type, DeviceType::Other);
        assert_eq!(device.location, 0);
        assert!(device.metrics.level().is_none());
    }

    #[test]
    fn rgbw_type_tag() {
        let device: InternalDevice =
            serde_json::from_str(r#"{"id": "x", "deviceType": "switchRGBW"}"#).unwrap();
        assert_eq!(device.device_type, DeviceType::SwitchRgbw);
    }

    #[test]
    fn builder_helpers() {
        let device = InternalDevice::new("Dummy_1", DeviceType::SwitchBinary)
            .with_location(4)
            .with_update_time(10)
            .with_metric("level", "on")
            .hidden();
        assert_eq!(device.location, 4);
        assert_eq!(device.update_time, 10);
        assert!(device.permanently_hidden);
        assert!(device.metrics.level().is_some_and(MetricValue::is_on));
    }

    #[test]
    fn mesh_node_constructors() {
        assert!(MeshNode::listening().listening);
        assert!(!MeshNode::sleeping().listening);
        assert!(MeshNode::sleeping().failed().failed);
    }
}
