// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of internal devices into Fibaro device descriptors.
//!
//! [`classify`] is a pure function of the device, its identity mapping and
//! the auxiliary facts the caller exposes through [`AuxiliaryLookups`]:
//! sibling devices (meters, battery) found by the Z-Way naming convention,
//! and mesh facts (listening, failed) of the node the device lives on.
//!
//! # Examples
//!
//! ```
//! use fibaro_bridge::classify::{classify, Interface};
//! use fibaro_bridge::device::{DeviceSnapshot, DeviceType, InternalDevice};
//! use fibaro_bridge::registry::IdentityMapping;
//! use fibaro_bridge::types::ExternalId;
//!
//! let switch = InternalDevice::new("ZWayVDev_zway_2-0-37", DeviceType::SwitchBinary)
//!     .with_metric("level", "on");
//! let meter = InternalDevice::new("ZWayVDev_zway_2-0-50-2", DeviceType::SensorMultilevel)
//!     .with_metric("level", 7.5);
//! let lookups = DeviceSnapshot::new().with_device(switch.clone()).with_device(meter);
//! let mapping = IdentityMapping {
//!     key: switch.key.clone(),
//!     external_id: ExternalId::new(101),
//!     sort_order: 101,
//! };
//!
//! let descriptor = classify(&switch, &mapping, &lookups);
//! assert_eq!(descriptor.type_tag.as_deref(), Some("com.fibaro.binarySwitch"));
//! assert!(descriptor.interfaces.contains(Interface::Power));
//! assert_eq!(descriptor.properties.get("value"), Some("1"));
//! assert_eq!(descriptor.properties.get("power"), Some("7.5"));
//! ```

mod descriptor;
mod family;
mod interface;

pub use descriptor::{DeviceDescriptor, PropertyBag};
pub use family::{BreachKind, DeviceFamily, MeasureKind};
pub use interface::{Interface, InterfaceSet};

use serde_json::Value;

use crate::device::{InternalDevice, MeshNode};
use crate::registry::IdentityMapping;
use crate::types::{DeviceKey, ExternalId, MetricValue, ZWayAddress, format_number};

/// Metric holding the OpenWeather payload of a multiline weather sensor.
const WEATHER_METRIC: &str = "zwaveOpenWeather";

/// Read access to the facts a descriptor depends on besides the device
/// itself.
pub trait AuxiliaryLookups {
    /// Returns another device by key.
    fn sibling(&self, key: &DeviceKey) -> Option<&InternalDevice>;

    /// Returns the network facts of the mesh node behind an address.
    fn mesh_node(&self, address: &ZWayAddress) -> Option<MeshNode>;
}

/// Z-Way neighbourhood of a device.
#[derive(Default)]
struct Neighbourhood<'a> {
    zwave: bool,
    failed: bool,
    sleeping: bool,
    energy: Option<&'a InternalDevice>,
    power: Option<&'a InternalDevice>,
    battery: Option<&'a InternalDevice>,
}

impl<'a> Neighbourhood<'a> {
    fn probe(device: &InternalDevice, lookups: &'a dyn AuxiliaryLookups) -> Self {
        let Some(address) = device.key.zway_address() else {
            return Self::default();
        };
        let node = lookups.mesh_node(&address);
        Self {
            zwave: true,
            failed: node.is_some_and(|n| n.failed),
            sleeping: node.is_some_and(|n| !n.listening),
            energy: lookups.sibling(&address.energy_meter_key()),
            power: lookups.sibling(&address.power_meter_key()),
            battery: lookups.sibling(&address.battery_key()),
        }
    }
}

/// Builds the full descriptor of a device.
#[must_use]
pub fn classify(
    device: &InternalDevice,
    mapping: &IdentityMapping,
    lookups: &dyn AuxiliaryLookups,
) -> DeviceDescriptor {
    let family = DeviceFamily::of(device);
    let around = Neighbourhood::probe(device, lookups);

    DeviceDescriptor {
        id: mapping.external_id,
        name: device.metrics.title().map(ToString::to_string),
        room_id: device.location,
        sort_order: mapping.sort_order,
        enabled: true,
        view_xml: false,
        icon_id: family.icon_id(),
        base_type: family.base_type().map(ToString::to_string),
        type_tag: family.type_tag().map(ToString::to_string),
        interfaces: interfaces(family, &around),
        properties: properties(device, family, mapping.external_id, &around),
    }
}

fn interfaces(family: DeviceFamily, around: &Neighbourhood<'_>) -> InterfaceSet {
    let mut set = match family {
        DeviceFamily::BinarySwitch | DeviceFamily::MultilevelSwitch => {
            InterfaceSet::from([Interface::Light])
        }
        DeviceFamily::ColorController => InterfaceSet::from([
            Interface::Light,
            Interface::ColorChange,
            Interface::LevelChange,
        ]),
        DeviceFamily::BinarySensor(_) => InterfaceSet::from([
            Interface::FibaroBreach,
            Interface::FibaroAlarm,
            Interface::FibaroAlarmArm,
        ]),
        DeviceFamily::Thermostat => InterfaceSet::from([Interface::ThermostatSetpoint]),
        DeviceFamily::MultilevelSensor(_) | DeviceFamily::Multiline | DeviceFamily::Unclassified => {
            InterfaceSet::new()
        }
    };

    set.insert_if(around.zwave, Interface::Zwave);
    if family.is_actuator() {
        set.insert_if(around.energy.is_some(), Interface::Energy);
        set.insert_if(around.power.is_some(), Interface::Power);
    }
    if family.may_sleep() {
        set.insert_if(around.sleeping, Interface::ZwaveWakeup);
        set.insert_if(around.battery.is_some(), Interface::Battery);
    }
    // Dimmers advertise level control after the mesh facets.
    set.insert_if(family == DeviceFamily::MultilevelSwitch, Interface::LevelChange);
    set
}

fn properties(
    device: &InternalDevice,
    family: DeviceFamily,
    id: ExternalId,
    around: &Neighbourhood<'_>,
) -> PropertyBag {
    let mut props = PropertyBag::new();
    props.set_str("dead", if around.failed { "1" } else { "0" });
    props.set(
        "deviceControlType",
        family.device_control_type().map(ToString::to_string),
    );

    match family {
        DeviceFamily::BinarySwitch => {
            props.set_str("value", binary_value(device));
        }
        DeviceFamily::MultilevelSwitch => {
            props.set("value", Some(level_value(device)));
        }
        DeviceFamily::ColorController => {
            props.set_str("value", binary_value(device));
            props.set(
                "brightness",
                device
                    .metrics
                    .level()
                    .and_then(MetricValue::as_number)
                    .map(format_number),
            );
            props.set("color", device.metrics.color().map(|c| c.to_wire()));
        }
        DeviceFamily::BinarySensor(_) => {
            alarm_properties(&mut props, id);
            props.set_str("value", binary_value(device));
            props.set("lastBreached", Some(device.update_time.to_string()));
        }
        DeviceFamily::MultilevelSensor(kind) => {
            props.set("value", Some(level_value(device)));
            if kind != Some(MeasureKind::Temperature) {
                props.set("unit", device.metrics.scale_title().map(ToString::to_string));
            }
        }
        DeviceFamily::Thermostat => {
            let setpoint = level_value(device);
            props.set("targetLevel", Some(setpoint.clone()));
            props.set("value", Some(setpoint));
            props.set("unit", device.metrics.scale_title().map(ToString::to_string));
        }
        DeviceFamily::Multiline => {
            props.set("value", Some(level_value(device)));
            weather_properties(&mut props, device);
        }
        DeviceFamily::Unclassified => {
            props.set("value", device.metrics.level().map(MetricValue::to_wire));
        }
    }

    if family.is_actuator() {
        props.set("energy", around.energy.and_then(sibling_level));
        props.set("power", around.power.and_then(sibling_level));
    }
    if family.may_sleep() {
        props.set("batteryLevel", around.battery.and_then(sibling_level));
    }

    props
}

/// Fibaro alarm panel properties. Arming is not supported; the values are
/// the disarmed defaults.
fn alarm_properties(props: &mut PropertyBag, id: ExternalId) {
    props.set_str("alarmDelay", "0");
    props.set_str("alarmExclude", "0");
    props.set_str("alarmTimeTimestamp", "0");
    props.set(
        "armConditions",
        Some(format!(
            r#"{{"auto":false,"devices":[{{"id":{id},"propertyName":"value","propertyValue":"0"}}],"time":0}}"#
        )),
    );
    props.set_str("armConfig", "0");
    props.set_str("armDelay", "0");
    props.set_str("armError", "{}");
    props.set_str("armTimeTimestamp", "0");
    props.set_str("armed", "0");
    props.set_str("fibaroAlarm", "0");
}

fn weather_properties(props: &mut PropertyBag, device: &InternalDevice) {
    let Some(weather) = device.metrics.get(WEATHER_METRIC) else {
        return;
    };
    let reading = |path: &[&str]| {
        path.iter()
            .try_fold(weather, |value, name| value.field(name))
            .map(MetricValue::to_wire)
    };
    props.set("humidity", reading(&["main", "humidity"]));
    props.set("pressure", reading(&["main", "pressure"]));
    props.set("wind", reading(&["wind", "speed"]));
    props.set("conditionCode", reading(&["weather", "0", "id"]));
}

fn sibling_level(sibling: &InternalDevice) -> Option<String> {
    sibling.metrics.level().map(MetricValue::to_wire)
}

fn binary_value(device: &InternalDevice) -> &'static str {
    if device.metrics.level().is_some_and(MetricValue::is_on) {
        "1"
    } else {
        "0"
    }
}

/// Numeric level on the wire; a missing level reads as `0`.
fn level_value(device: &InternalDevice) -> String {
    match device.metrics.level() {
        None => "0".to_string(),
        Some(level) => level
            .as_number()
            .map_or_else(|| level.to_wire(), format_number),
    }
}

/// Value-oriented classification used by the change feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueReport {
    /// Fibaro type of the device, if known.
    pub type_tag: Option<&'static str>,
    /// `newValue` of the property update event.
    pub new_value: Value,
    /// Stringified value of the change entry.
    pub value: Option<String>,
    /// Breach time of security sensors.
    pub last_breached: Option<i64>,
}

/// Reduces a device to its current value, without touching siblings or the
/// mesh.
#[must_use]
pub fn classify_value(device: &InternalDevice) -> ValueReport {
    let family = DeviceFamily::of(device);
    let level = device.metrics.level();

    let (new_value, value) = match family {
        DeviceFamily::BinarySwitch
        | DeviceFamily::BinarySensor(_)
        | DeviceFamily::ColorController => {
            let on = level.is_some_and(MetricValue::is_on);
            (Value::Bool(on), Some(binary_value(device).to_string()))
        }
        DeviceFamily::MultilevelSwitch
        | DeviceFamily::MultilevelSensor(_)
        | DeviceFamily::Thermostat
        | DeviceFamily::Multiline => {
            let new_value = match level {
                None => Value::from(0),
                Some(l) => l.as_number().map_or_else(|| l.to_json(), json_number),
            };
            (new_value, Some(level_value(device)))
        }
        DeviceFamily::Unclassified => (
            level.map_or(Value::Null, MetricValue::to_json),
            level.map(MetricValue::to_wire),
        ),
    };

    ValueReport {
        type_tag: family.type_tag(),
        new_value,
        value,
        last_breached: family.is_breach_capable().then_some(device.update_time),
    }
}

/// Integral readings go out as JSON integers, like the Z-Way API sends them.
// Integral and well inside the i64 range, so the cast is exact.
#[allow(clippy::cast_possible_truncation)]
fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}
