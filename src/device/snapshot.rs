// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read access to the device subsystem.

use std::collections::HashMap;

use crate::classify::AuxiliaryLookups;
use crate::types::{DeviceKey, ZWayAddress};

use super::{InternalDevice, Location, MeshNode};

/// Read-only view of the device subsystem.
///
/// Every request is evaluated against one momentary view; implementations
/// must not change underneath a running request.
pub trait DeviceSource: AuxiliaryLookups {
    /// All devices, hidden ones included.
    fn devices(&self) -> &[InternalDevice];

    /// The device with the given key.
    fn device(&self, key: &DeviceKey) -> Option<&InternalDevice>;

    /// All rooms, including the unassigned pseudo-room `0` if the subsystem
    /// reports it.
    fn locations(&self) -> &[Location];

    /// Unix time of the last change to the device set itself (devices added,
    /// removed or retyped).
    fn last_structure_change(&self) -> i64;
}

/// In-memory [`DeviceSource`].
///
/// Built directly in tests, or filled from the Z-Way REST API by
/// `ZWayClient::fetch_snapshot`.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::device::{DeviceSnapshot, DeviceSource, DeviceType, InternalDevice};
///
/// let snapshot = DeviceSnapshot::new()
///     .with_device(InternalDevice::new("ZWayVDev_zway_2-0-37", DeviceType::SwitchBinary))
///     .with_structure_change(1_700_000_000);
///
/// assert_eq!(snapshot.devices().len(), 1);
/// assert_eq!(snapshot.last_structure_change(), 1_700_000_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    devices: Vec<InternalDevice>,
    index: HashMap<DeviceKey, usize>,
    locations: Vec<Location>,
    mesh: HashMap<(String, u32), MeshNode>,
    last_structure_change: i64,
}

impl DeviceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a device.
    #[must_use]
    pub fn with_device(mut self, device: InternalDevice) -> Self {
        self.upsert(device);
        self
    }

    /// Adds a room.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    /// Records network facts for a mesh node.
    #[must_use]
    pub fn with_mesh_node(mut self, bus: impl Into<String>, node: u32, facts: MeshNode) -> Self {
        self.mesh.insert((bus.into(), node), facts);
        self
    }

    /// Sets the last structure change time.
    #[must_use]
    pub fn with_structure_change(mut self, time: i64) -> Self {
        self.last_structure_change = time;
        self
    }

    /// Adds or replaces a device in place.
    pub fn upsert(&mut self, device: InternalDevice) {
        if let Some(&slot) = self.index.get(&device.key) {
            self.devices[slot] = device;
        } else {
            self.index.insert(device.key.clone(), self.devices.len());
            self.devices.push(device);
        }
    }

    /// Mutable access to a device, for simulating state changes.
    pub fn device_mut(&mut self, key: &DeviceKey) -> Option<&mut InternalDevice> {
        let slot = *self.index.get(key)?;
        self.devices.get_mut(slot)
    }

    /// Replaces the room list.
    pub fn set_locations(&mut self, locations: Vec<Location>) {
        self.locations = locations;
    }

    /// Records network facts for a mesh node in place.
    pub fn set_mesh_node(&mut self, bus: impl Into<String>, node: u32, facts: MeshNode) {
        self.mesh.insert((bus.into(), node), facts);
    }

    /// Sets the last structure change time in place.
    pub fn set_structure_change(&mut self, time: i64) {
        self.last_structure_change = time;
    }

    /// Returns the keys of all devices, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &DeviceKey> {
        self.devices.iter().map(|d| &d.key)
    }
}

impl AuxiliaryLookups for DeviceSnapshot {
    fn sibling(&self, key: &DeviceKey) -> Option<&InternalDevice> {
        self.device(key)
    }

    fn mesh_node(&self, address: &ZWayAddress) -> Option<MeshNode> {
        self.mesh
            .get(&(address.bus().to_string(), address.node()))
            .copied()
    }
}

impl DeviceSource for DeviceSnapshot {
    fn devices(&self) -> &[InternalDevice] {
        &self.devices
    }

    fn device(&self, key: &DeviceKey) -> Option<&InternalDevice> {
        self.index.get(key).and_then(|&slot| self.devices.get(slot))
    }

    fn locations(&self) -> &[Location] {
        &self.locations
    }

    fn last_structure_change(&self) -> i64 {
        self.last_structure_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;

    fn switch(key: &str) -> InternalDevice {
        InternalDevice::new(key, DeviceType::SwitchBinary)
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut snapshot = DeviceSnapshot::new()
            .with_device(switch("a"))
            .with_device(switch("b"));

        snapshot.upsert(switch("a").with_update_time(5));

        assert_eq!(snapshot.devices().len(), 2);
        assert_eq!(snapshot.devices()[0].update_time, 5);
        let keys: Vec<_> = snapshot.keys().map(DeviceKey::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn device_lookup_by_key() {
        let mut snapshot = DeviceSnapshot::new().with_device(switch("a"));
        assert!(snapshot.device(&DeviceKey::new("a")).is_some());
        assert!(snapshot.device(&DeviceKey::new("z")).is_none());

        snapshot
            .device_mut(&DeviceKey::new("a"))
            .unwrap()
            .update_time = 9;
        assert_eq!(snapshot.device(&DeviceKey::new("a")).unwrap().update_time, 9);
    }

    #[test]
    fn mesh_lookup_uses_bus_and_node() {
        let snapshot = DeviceSnapshot::new().with_mesh_node("zway", 5, MeshNode::sleeping());
        let same_node = ZWayAddress::parse("ZWayVDev_zway_5-0-48-1").unwrap();
        let other_bus = ZWayAddress::parse("ZWayVDev_other_5-0-48-1").unwrap();

        assert_eq!(snapshot.mesh_node(&same_node), Some(MeshNode::sleeping()));
        assert_eq!(snapshot.mesh_node(&other_bus), None);
    }
}
