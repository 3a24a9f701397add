// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response bodies.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;
use serde_json::{Value, json};

use crate::classify::DeviceDescriptor;
use crate::config::{BridgeConfig, StaticAssets};
use crate::device::Location;
use crate::feed::{ChangeFeedResult, FeedChange, FeedEvent};
use crate::types::{RoomId, UNASSIGNED_ROOM};
use crate::visibility::AccessProfile;

/// User id reported by the login endpoint.
const LOGIN_USER_ID: u32 = 2;
/// Id of the registered mobile entry.
pub const MOBILE_DEVICE_ID: u32 = 24;
/// Id of the weather pseudo-device.
pub const WEATHER_DEVICE_ID: u32 = 3;
/// Room icon.
const ROOM_ICON: u32 = 4;

/// `{"temperature": 0, ...}` placeholder of rooms and home.
#[derive(Debug, Clone, Copy, Default, Serialize)]
struct DefaultSensors {
    temperature: u32,
    humidity: u32,
    light: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thermostat: Option<u32>,
}

/// Entry of `rooms[]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: RoomId,
    name: String,
    section_id: u32,
    icon_id: u32,
    default_sensors: DefaultSensors,
    sort_order: u32,
}

/// Rooms in subsystem order, without the unassigned pseudo-room.
#[must_use]
pub fn rooms(locations: &[Location]) -> Vec<Room> {
    locations
        .iter()
        .filter(|loc| loc.id != UNASSIGNED_ROOM)
        .zip(1..)
        .map(|(loc, sort_order)| Room {
            id: loc.id,
            name: loc.title.clone(),
            section_id: 0,
            icon_id: ROOM_ICON,
            default_sensors: DefaultSensors {
                thermostat: Some(0),
                ..DefaultSensors::default()
            },
            sort_order,
        })
        .collect()
}

/// Synthetic entries preceding the real devices.
#[must_use]
pub fn synthetic_devices(profile: &AccessProfile, config: &BridgeConfig) -> [DeviceDescriptor; 3] {
    [
        DeviceDescriptor::synthetic(profile.id, profile.login.clone(), 0, 2, "HC_user"),
        DeviceDescriptor::synthetic(WEATHER_DEVICE_ID, "weather", 0, 3, "weather"),
        DeviceDescriptor::synthetic(MOBILE_DEVICE_ID, config.mobile_name(), 91, 6, "iOS_device"),
    ]
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Info<'a> {
    serial_number: &'a str,
    mac: &'a str,
    soft_version: &'a str,
    beta: bool,
    hotel_mode: bool,
    #[serde(rename = "userID")]
    user_id: u32,
    use_optional_pin: bool,
    temperature_unit: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Home {
    timestamp: i64,
    default_sensors: DefaultSensors,
    currency: &'static str,
}

/// Body of `/api/mobile/interface/data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceData<'a> {
    info: Info<'a>,
    home: Home,
    weather: Value,
    sections: [Value; 0],
    rooms: Vec<Room>,
    devices: Vec<DeviceDescriptor>,
    scenes: [Value; 0],
    icons: &'a Value,
    linked_devices: [Value; 0],
    alarm: [Value; 0],
    satel_partitions: [Value; 0],
    fibaro_alarm: &'a Value,
    hierarchy: &'a Value,
    favorite_colors: [Value; 0],
    rgb_programs: &'a Value,
}

impl<'a> InterfaceData<'a> {
    /// Assembles the envelope.
    #[must_use]
    pub fn new(
        config: &'a BridgeConfig,
        assets: &'a StaticAssets,
        profile: &AccessProfile,
        rooms: Vec<Room>,
        devices: Vec<DeviceDescriptor>,
        timestamp: i64,
    ) -> Self {
        Self {
            info: Info {
                serial_number: config.serial(),
                mac: config.mac(),
                soft_version: config.soft_version(),
                beta: false,
                hotel_mode: false,
                user_id: profile.id,
                use_optional_pin: false,
                temperature_unit: "C",
            },
            home: Home {
                timestamp,
                default_sensors: DefaultSensors::default(),
                currency: "EUR",
            },
            weather: json!({
                "conditionCode": 32,
                "humidity": 0,
                "wind": 0,
                "windUnit": "km/h",
                "temperature": 0,
                "temperatureUnit": "C"
            }),
            sections: [],
            rooms,
            devices,
            scenes: [],
            icons: &assets.icons,
            linked_devices: [],
            alarm: [],
            satel_partitions: [],
            fibaro_alarm: &assets.fibaro_alarm,
            hierarchy: &assets.hierarchy,
            favorite_colors: [],
            rgb_programs: &assets.rgb_programs,
        }
    }
}

/// Body of `/api/mobile/interface/refreshStates`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStates<'a> {
    status: &'static str,
    last: i64,
    date: String,
    timestamp: i64,
    logs: [Value; 0],
    events: &'a [FeedEvent],
    changes: &'a [FeedChange],
    alarm_changes: [Value; 0],
}

impl<'a> RefreshStates<'a> {
    /// Wraps a poll result.
    #[must_use]
    pub fn new(feed: &'a ChangeFeedResult, now: &DateTime<FixedOffset>) -> Self {
        Self {
            status: "IDLE",
            last: feed.cursor,
            date: now.format("%H:%M | %d.%m.%y").to_string(),
            timestamp: now.timestamp(),
            logs: [],
            events: &feed.events,
            changes: &feed.changes,
            alarm_changes: [],
        }
    }
}

/// Body of a successful login check.
#[must_use]
pub fn login_status(profile: &AccessProfile) -> Value {
    json!({
        "status": true,
        "userID": LOGIN_USER_ID,
        "username": profile.login,
        "type": "superuser"
    })
}

/// Fixed weather report.
#[must_use]
pub fn weather() -> Value {
    json!({
        "ConditionCode": "32",
        "Humidity": "0.00",
        "PreviousConditionCode": "32",
        "PreviousHumidity": "0.00",
        "PreviousTemperature": "0.00",
        "PreviousWeatherConditionConverted": "\\\"cloudy\\\"",
        "PreviousWind": "0.00",
        "Temperature": "0",
        "WeatherCondition": "rain",
        "WeatherConditionConverted": "cloudy",
        "Wind": "0.00",
        "saveLogs": "1",
        "TemperatureUnit": "C"
    })
}

/// Location settings with the current date and time.
#[must_use]
pub fn location(now: &DateTime<FixedOffset>) -> Value {
    json!({
        "houseNumber": 3,
        "timezone": "Europe/Berlin",
        "timezoneOffset": now.offset().local_minus_utc(),
        "ntp": false,
        "ntpServer": "pool.ntp.org",
        "date": {"day": now.day(), "month": now.month(), "year": now.year()},
        "time": {"hour": now.hour(), "minute": now.minute()},
        "latitude": 52.25,
        "longitude": 16.53,
        "city": "Poznan",
        "temperatureUnit": "C",
        "windUnit": "km/h",
        "timeFormat": 24,
        "dateFormat": "dd.mm.yy",
        "decimalMark": "."
    })
}

/// Answer to a mobile registration.
#[must_use]
pub fn register_device() -> Value {
    json!({"mobileDeviceId": MOBILE_DEVICE_ID, "sipDisplayName": ""})
}

/// Generic acknowledgement of an action call.
#[must_use]
pub fn call_action_ack() -> Value {
    json!({"id": 0, "jsonrpc": "2.0", "result": {"result": 0}})
}
