// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal device keys and the Z-Way virtual device naming scheme.

use std::fmt;

use crate::error::ValueError;

/// Prefix of every virtual device created by the Z-Wave binding.
const ZWAY_PREFIX: &str = "ZWayVDev_";

/// Opaque key of a device in the internal device subsystem.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::types::DeviceKey;
///
/// let key = DeviceKey::new("ZWayVDev_zway_5-0-37");
/// assert_eq!(key.as_str(), "ZWayVDev_zway_5-0-37");
/// assert!(key.zway_address().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DeviceKey(String);

impl DeviceKey {
    /// Creates a key from any string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key as a Z-Way mesh address, if it is one.
    #[must_use]
    pub fn zway_address(&self) -> Option<ZWayAddress> {
        ZWayAddress::parse(&self.0).ok()
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for DeviceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Decomposed Z-Way virtual device key.
///
/// Z-Wave virtual devices are named
/// `ZWayVDev_<bus>_<node>-<instance>[-<command class>[-<scale>]]`. Related
/// virtual devices (meters, battery) share the *root* (`ZWayVDev_<bus>_<node>`)
/// or *master* (`<root>-<instance>`) part, which is how sibling lookups find
/// them.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::types::ZWayAddress;
///
/// let addr = ZWayAddress::parse("ZWayVDev_zway_5-0-37").unwrap();
/// assert_eq!(addr.root_id(), "ZWayVDev_zway_5");
/// assert_eq!(addr.master_id(), "ZWayVDev_zway_5-0");
/// assert_eq!(addr.bus(), "zway");
/// assert_eq!(addr.node(), 5);
/// assert_eq!(addr.power_meter_key().as_str(), "ZWayVDev_zway_5-0-50-2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZWayAddress {
    root_id: String,
    master_id: String,
    bus: String,
    node: u32,
}

impl ZWayAddress {
    /// Parses a virtual device key.
    ///
    /// Anything after the `<node>-<instance>` part is accepted, matching how
    /// the Z-Way binding appends command class and scale suffixes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotZWayKey` if the key does not start with the
    /// Z-Way prefix, bus name, node id and instance number.
    pub fn parse(key: &str) -> Result<Self, ValueError> {
        let not_zway = || ValueError::NotZWayKey(key.to_string());

        let rest = key.strip_prefix(ZWAY_PREFIX).ok_or_else(not_zway)?;
        let (bus, rest) = rest.split_once('_').ok_or_else(not_zway)?;
        if bus.is_empty() {
            return Err(not_zway());
        }

        let node_len = leading_digits(rest);
        if node_len == 0 {
            return Err(not_zway());
        }
        let node: u32 = rest[..node_len].parse().map_err(|_| not_zway())?;

        let after_node = rest[node_len..].strip_prefix('-').ok_or_else(not_zway)?;
        let instance_len = leading_digits(after_node);
        if instance_len == 0 {
            return Err(not_zway());
        }

        let root_len = ZWAY_PREFIX.len() + bus.len() + 1 + node_len;
        let master_len = root_len + 1 + instance_len;

        Ok(Self {
            root_id: key[..root_len].to_string(),
            master_id: key[..master_len].to_string(),
            bus: bus.to_string(),
            node,
        })
    }

    /// Returns the root id (`ZWayVDev_<bus>_<node>`).
    #[must_use]
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Returns the master id (`<root>-<instance>`).
    #[must_use]
    pub fn master_id(&self) -> &str {
        &self.master_id
    }

    /// Returns the Z-Wave bus (controller instance) name.
    #[must_use]
    pub fn bus(&self) -> &str {
        &self.bus
    }

    /// Returns the Z-Wave node id.
    #[must_use]
    pub const fn node(&self) -> u32 {
        self.node
    }

    /// Key of the kWh meter sibling (command class 50, scale 0).
    #[must_use]
    pub fn energy_meter_key(&self) -> DeviceKey {
        DeviceKey::new(format!("{}-50-0", self.master_id))
    }

    /// Key of the watt meter sibling (command class 50, scale 2).
    #[must_use]
    pub fn power_meter_key(&self) -> DeviceKey {
        DeviceKey::new(format!("{}-50-2", self.master_id))
    }

    /// Key of the battery sibling (instance 0, command class 128).
    #[must_use]
    pub fn battery_key(&self) -> DeviceKey {
        DeviceKey::new(format!("{}-0-128", self.root_id))
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}
