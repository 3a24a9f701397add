// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fibaro interface (capability) tags.

use serde::Serialize;

/// A capability facet a Fibaro client looks for in `interfaces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Interface {
    /// Controllable light.
    Light,
    /// Z-Wave mesh device.
    Zwave,
    /// kWh reading available.
    Energy,
    /// Watt reading available.
    Power,
    /// Dimmable.
    LevelChange,
    /// Breach reporting.
    FibaroBreach,
    /// Part of the alarm system.
    FibaroAlarm,
    /// Can be armed.
    FibaroAlarmArm,
    /// Sleeping node, reachable after wake-up.
    ZwaveWakeup,
    /// Battery level available.
    Battery,
    /// Color control.
    ColorChange,
    /// Setpoint control.
    ThermostatSetpoint,
}

/// Ordered set of interfaces.
///
/// Insertion order is kept because clients render capability lists as
/// received; inserting an interface twice keeps the first position.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::classify::{Interface, InterfaceSet};
///
/// let mut set = InterfaceSet::from([Interface::Light]);
/// set.insert(Interface::Zwave);
/// set.insert(Interface::Light);
///
/// assert_eq!(set.as_slice(), [Interface::Light, Interface::Zwave]);
/// assert_eq!(serde_json::to_string(&set).unwrap(), r#"["light","zwave"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InterfaceSet(Vec<Interface>);

impl InterfaceSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interface unless already present.
    pub fn insert(&mut self, interface: Interface) {
        if !self.0.contains(&interface) {
            self.0.push(interface);
        }
    }

    /// Appends an interface when `condition` holds.
    pub fn insert_if(&mut self, condition: bool, interface: Interface) {
        if condition {
            self.insert(interface);
        }
    }

    /// Returns `true` if the interface is present.
    #[must_use]
    pub fn contains(&self, interface: Interface) -> bool {
        self.0.contains(&interface)
    }

    /// Returns the interfaces in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Interface] {
        &self.0
    }

    /// Number of interfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[Interface; N]> for InterfaceSet {
    fn from(interfaces: [Interface; N]) -> Self {
        let mut set = Self::new();
        for interface in interfaces {
            set.insert(interface);
        }
        set
    }
}
