// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device family dispatch.
//!
//! The first level dispatches on the device-type tag, the second on the
//! probe type for the two ambiguous sensor families. A third level handles
//! devices that report the `general_purpose` probe type but carry a more
//! specific icon hint.

use crate::device::{DeviceType, InternalDevice};

/// Probe type reported by sensors whose real purpose is only in the icon.
const GENERAL_PURPOSE: &str = "general_purpose";

/// What a binary sensor detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreachKind {
    /// Door or window contact.
    Door,
    /// Motion detector.
    Motion,
    /// Water leak detector.
    Flood,
    /// Smoke detector.
    Smoke,
}

impl BreachKind {
    fn from_probe(probe: &str) -> Option<Self> {
        match probe {
            "door-window" | "door" | "alarm_door" => Some(Self::Door),
            "motion" | "alarm_burglar" => Some(Self::Motion),
            "flood" | "alarm_flood" => Some(Self::Flood),
            "smoke" | "alarm_smoke" => Some(Self::Smoke),
            _ => None,
        }
    }

    fn from_icon(icon: &str) -> Option<Self> {
        match icon {
            "door" => Some(Self::Door),
            "motion" => Some(Self::Motion),
            "flood" => Some(Self::Flood),
            "smoke" => Some(Self::Smoke),
            _ => None,
        }
    }
}

/// What a multilevel sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureKind {
    /// Air temperature.
    Temperature,
    /// Illuminance.
    Light,
    /// Relative humidity.
    Humidity,
    /// Instantaneous power (W).
    Power,
    /// Accumulated energy (kWh).
    Energy,
}

impl MeasureKind {
    fn from_probe(probe: &str) -> Option<Self> {
        match probe {
            "temperature" => Some(Self::Temperature),
            "luminosity" => Some(Self::Light),
            "humidity" => Some(Self::Humidity),
            "meterElectric_watt" => Some(Self::Power),
            "meterElectric_kilowatt_hour" => Some(Self::Energy),
            _ => None,
        }
    }

    fn from_icon(icon: &str) -> Option<Self> {
        match icon {
            "temperature" => Some(Self::Temperature),
            "luminosity" => Some(Self::Light),
            "humidity" => Some(Self::Humidity),
            _ => None,
        }
    }
}

/// The external device family a device is presented as.
///
/// `BinarySensor(None)` and `MultilevelSensor(None)` are sensors whose probe
/// type the bridge does not know: they keep their base type but have no
/// icon or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    /// On/off actuator.
    BinarySwitch,
    /// Dimmer.
    MultilevelSwitch,
    /// RGB(W) controller.
    ColorController,
    /// Heating setpoint.
    Thermostat,
    /// Security sensor.
    BinarySensor(Option<BreachKind>),
    /// Measuring sensor.
    MultilevelSensor(Option<MeasureKind>),
    /// Composite weather sensor.
    Multiline,
    /// Anything the bridge has not been taught.
    Unclassified,
}

impl DeviceFamily {
    /// Classifies a device.
    #[must_use]
    pub fn of(device: &InternalDevice) -> Self {
        let probe = device.probe().unwrap_or_default();
        let icon_hint = || {
            if probe == GENERAL_PURPOSE {
                device.metrics.icon()
            } else {
                None
            }
        };

        match device.device_type {
            DeviceType::SwitchBinary => Self::BinarySwitch,
            DeviceType::SwitchMultilevel => Self::MultilevelSwitch,
            DeviceType::SwitchRgbw | DeviceType::SwitchRgb => Self::ColorController,
            DeviceType::Thermostat => Self::Thermostat,
            DeviceType::SensorBinary => Self::BinarySensor(
                BreachKind::from_probe(probe).or_else(|| icon_hint().and_then(BreachKind::from_icon)),
            ),
            DeviceType::SensorMultilevel => Self::MultilevelSensor(
                MeasureKind::from_probe(probe)
                    .or_else(|| icon_hint().and_then(MeasureKind::from_icon)),
            ),
            DeviceType::SensorMultiline => Self::Multiline,
            DeviceType::Battery | DeviceType::Other => Self::Unclassified,
        }
    }

    /// Fibaro icon id.
    #[must_use]
    pub const fn icon_id(self) -> Option<u32> {
        match self {
            Self::BinarySwitch => Some(2),
            Self::MultilevelSwitch => Some(15),
            Self::ColorController => Some(74),
            Self::Thermostat => Some(6),
            Self::BinarySensor(Some(kind)) => Some(match kind {
                BreachKind::Door => 42,
                BreachKind::Motion => 21,
                BreachKind::Flood => 43,
                BreachKind::Smoke => 44,
            }),
            Self::MultilevelSensor(Some(kind)) => Some(match kind {
                MeasureKind::Temperature => 30,
                MeasureKind::Light => 32,
                MeasureKind::Humidity => 31,
                MeasureKind::Power => 33,
                MeasureKind::Energy => 34,
            }),
            Self::Multiline => Some(35),
            Self::BinarySensor(None) | Self::MultilevelSensor(None) | Self::Unclassified => None,
        }
    }

    /// Fibaro base type.
    #[must_use]
    pub const fn base_type(self) -> Option<&'static str> {
        match self {
            Self::BinarySwitch => Some("com.fibaro.actor"),
            Self::MultilevelSwitch => Some("com.fibaro.binarySwitch"),
            Self::ColorController => Some("com.fibaro.multilevelSwitch"),
            Self::Thermostat => Some("com.fibaro.hvac"),
            Self::BinarySensor(_) => Some("com.fibaro.securitySensor"),
            Self::MultilevelSensor(_) | Self::Multiline => Some("com.fibaro.multilevelSensor"),
            Self::Unclassified => None,
        }
    }

    /// Fibaro type.
    #[must_use]
    pub const fn type_tag(self) -> Option<&'static str> {
        match self {
            Self::BinarySwitch => Some("com.fibaro.binarySwitch"),
            Self::MultilevelSwitch => Some("com.fibaro.multilevelSwitch"),
            Self::ColorController => Some("com.fibaro.colorController"),
            Self::Thermostat => Some("com.fibaro.thermostatDanfoss"),
            Self::BinarySensor(Some(kind)) => Some(match kind {
                BreachKind::Door => "com.fibaro.doorSensor",
                BreachKind::Motion => "com.fibaro.motionSensor",
                BreachKind::Flood => "com.fibaro.floodSensor",
                BreachKind::Smoke => "com.fibaro.smokeSensor",
            }),
            Self::MultilevelSensor(Some(kind)) => Some(match kind {
                MeasureKind::Temperature => "com.fibaro.temperatureSensor",
                MeasureKind::Light => "com.fibaro.lightSensor",
                MeasureKind::Humidity => "com.fibaro.humiditySensor",
                MeasureKind::Power => "com.fibaro.powerMeter",
                MeasureKind::Energy => "com.fibaro.energyMeter",
            }),
            Self::Multiline => Some("com.fibaro.weatherSensor"),
            Self::BinarySensor(None) | Self::MultilevelSensor(None) | Self::Unclassified => None,
        }
    }

    /// `deviceControlType` property of actuators and security sensors.
    #[must_use]
    pub const fn device_control_type(self) -> Option<&'static str> {
        match self {
            Self::BinarySwitch => Some("2"),
            Self::MultilevelSwitch => Some("23"),
            Self::ColorController => Some("51"),
            Self::BinarySensor(_) => Some("0"),
            _ => None,
        }
    }

    /// Switches and color controllers.
    #[must_use]
    pub const fn is_actuator(self) -> bool {
        matches!(
            self,
            Self::BinarySwitch | Self::MultilevelSwitch | Self::ColorController
        )
    }

    /// Families that may run on batteries and sleep.
    #[must_use]
    pub const fn may_sleep(self) -> bool {
        matches!(
            self,
            Self::BinarySensor(_) | Self::MultilevelSensor(_) | Self::Multiline | Self::Thermostat
        )
    }

    /// Families whose value is on/off.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(self, Self::BinarySwitch | Self::BinarySensor(_))
    }

    /// Families that report `lastBreached`.
    #[must_use]
    pub const fn is_breach_capable(self) -> bool {
        matches!(self, Self::BinarySensor(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(device_type: DeviceType, probe: &str) -> InternalDevice {
        InternalDevice::new("Dummy_1", device_type).with_probe_type(probe)
    }

    #[test]
    fn first_level_dispatch() {
        let cases = [
            (DeviceType::SwitchBinary, DeviceFamily::BinarySwitch),
            (DeviceType::SwitchMultilevel, DeviceFamily::MultilevelSwitch),
            (DeviceType::SwitchRgbw, DeviceFamily::ColorController),
            (DeviceType::SwitchRgb, DeviceFamily::ColorController),
            (DeviceType::Thermostat, DeviceFamily::Thermostat),
            (DeviceType::SensorMultiline, DeviceFamily::Multiline),
            (DeviceType::Battery, DeviceFamily::Unclassified),
            (DeviceType::Other, DeviceFamily::Unclassified),
        ];
        for (device_type, family) in cases {
            let device = InternalDevice::new("Dummy_1", device_type);
            assert_eq!(DeviceFamily::of(&device), family, "{device_type:?}");
        }
    }

    #[test]
    fn binary_sensor_probe_types() {
        let cases = [
            ("door-window", BreachKind::Door),
            ("alarm_door", BreachKind::Door),
            ("motion", BreachKind::Motion),
            ("alarm_burglar", BreachKind::Motion),
            ("flood", BreachKind::Flood),
            ("alarm_smoke", BreachKind::Smoke),
        ];
        for (probe, kind) in cases {
            assert_eq!(
                DeviceFamily::of(&sensor(DeviceType::SensorBinary, probe)),
                DeviceFamily::BinarySensor(Some(kind)),
                "{probe}"
            );
        }
    }

    #[test]
    fn multilevel_sensor_probe_types() {
        let cases = [
            ("temperature", MeasureKind::Temperature),
            ("luminosity", MeasureKind::Light),
            ("humidity", MeasureKind::Humidity),
            ("meterElectric_watt", MeasureKind::Power),
            ("meterElectric_kilowatt_hour", MeasureKind::Energy),
        ];
        for (probe, kind) in cases {
            assert_eq!(
                DeviceFamily::of(&sensor(DeviceType::SensorMultilevel, probe)),
                DeviceFamily::MultilevelSensor(Some(kind)),
                "{probe}"
            );
        }
    }

    #[test]
    fn general_purpose_falls_back_to_icon() {
        let device = sensor(DeviceType::SensorBinary, GENERAL_PURPOSE).with_metric("icon", "motion");
        assert_eq!(
            DeviceFamily::of(&device),
            DeviceFamily::BinarySensor(Some(BreachKind::Motion))
        );

        let device =
            sensor(DeviceType::SensorMultilevel, GENERAL_PURPOSE).with_metric("icon", "humidity");
        assert_eq!(
            DeviceFamily::of(&device),
            DeviceFamily::MultilevelSensor(Some(MeasureKind::Humidity))
        );
    }

    #[test]
    fn icon_hint_ignored_for_other_probe_types() {
        let device = sensor(DeviceType::SensorBinary, "tamper").with_metric("icon", "door");
        assert_eq!(DeviceFamily::of(&device), DeviceFamily::BinarySensor(None));
    }

    #[test]
    fn unknown_sensor_keeps_base_type_only() {
        let family = DeviceFamily::of(&sensor(DeviceType::SensorMultilevel, "co2"));
        assert_eq!(family, DeviceFamily::MultilevelSensor(None));
        assert_eq!(family.base_type(), Some("com.fibaro.multilevelSensor"));
        assert_eq!(family.icon_id(), None);
        assert_eq!(family.type_tag(), None);
    }

    #[test]
    fn unclassified_has_no_display_fields() {
        let family = DeviceFamily::Unclassified;
        assert_eq!(family.icon_id(), None);
        assert_eq!(family.base_type(), None);
        assert_eq!(family.type_tag(), None);
        assert!(!family.is_actuator());
    }
}
