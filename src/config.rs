// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration and static payloads.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;
use crate::registry::DEFAULT_FLOOR;

/// Identity of the emulated Home Center.
///
/// The serial number is generated once (`HCZ-<n>`) and must then stay
/// stable, since clients pair with it. [`load_or_init`](Self::load_or_init)
/// persists generated values on first start.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::config::BridgeConfig;
///
/// let config = BridgeConfig::new()
///     .with_serial("HCZ-424242")
///     .with_mac("02:00:00:00:00:01");
///
/// assert_eq!(config.serial(), "HCZ-424242");
/// assert_eq!(config.soft_version(), "4.100");
/// assert_eq!(config.id_floor(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(rename = "HCName", default = "generate_serial")]
    serial: String,
    #[serde(rename = "MAC", default = "default_mac")]
    mac: String,
    #[serde(rename = "softVersion", default = "default_soft_version")]
    soft_version: String,
    #[serde(rename = "idFloor", default = "default_floor")]
    id_floor: u32,
    #[serde(rename = "mobileName", default = "default_mobile_name")]
    mobile_name: String,
}

impl BridgeConfig {
    /// Default MAC reported to clients.
    pub const DEFAULT_MAC: &'static str = "12:34:56:78:90:ab";
    /// Home Center firmware version clients are told they talk to.
    pub const DEFAULT_SOFT_VERSION: &'static str = "4.100";
    /// Display name of the registered mobile entry.
    pub const DEFAULT_MOBILE_NAME: &'static str = "Some phone model";

    /// Creates a configuration with a freshly generated serial number.
    #[must_use]
    pub fn new() -> Self {
        Self {
            serial: generate_serial(),
            mac: default_mac(),
            soft_version: default_soft_version(),
            id_floor: default_floor(),
            mobile_name: default_mobile_name(),
        }
    }

    /// Loads the configuration from a JSON file, creating it if needed.
    ///
    /// Values missing from the file are filled in with defaults (a new
    /// serial number if none was stored) and written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if writing it back fails.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::new();
            config.save(path)?;
            tracing::info!(
                path = %path.display(),
                serial = %config.serial,
                "Created bridge configuration"
            );
            return Ok(config);
        }

        let raw: Value = serde_json::from_slice(&fs::read(path)?)?;
        let complete = ["HCName", "MAC"]
            .iter()
            .all(|key| raw.get(key).is_some_and(|v| !v.is_null()));
        let config: Self = serde_json::from_value(raw)?;
        if !complete {
            config.save(path)?;
            tracing::info!(path = %path.display(), "Completed bridge configuration");
        }
        Ok(config)
    }

    /// Writes the configuration as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    /// Sets the serial number.
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    /// Sets the MAC address.
    #[must_use]
    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = mac.into();
        self
    }

    /// Sets the reported firmware version.
    #[must_use]
    pub fn with_soft_version(mut self, version: impl Into<String>) -> Self {
        self.soft_version = version.into();
        self
    }

    /// Sets the external id floor.
    #[must_use]
    pub fn with_id_floor(mut self, floor: u32) -> Self {
        self.id_floor = floor;
        self
    }

    /// Sets the name of the registered mobile entry.
    #[must_use]
    pub fn with_mobile_name(mut self, name: impl Into<String>) -> Self {
        self.mobile_name = name.into();
        self
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the MAC address.
    #[must_use]
    pub fn mac(&self) -> &str {
        &self.mac
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn soft_version(&self) -> &str {
        &self.soft_version
    }

    /// Returns the external id floor.
    #[must_use]
    pub fn id_floor(&self) -> u32 {
        self.id_floor
    }

    /// Returns the name of the registered mobile entry.
    #[must_use]
    pub fn mobile_name(&self) -> &str {
        &self.mobile_name
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_serial() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000 + 1;
    format!("HCZ-{n}")
}

fn default_mac() -> String {
    BridgeConfig::DEFAULT_MAC.to_string()
}

fn default_soft_version() -> String {
    BridgeConfig::DEFAULT_SOFT_VERSION.to_string()
}

fn default_floor() -> u32 {
    DEFAULT_FLOOR
}

fn default_mobile_name() -> String {
    BridgeConfig::DEFAULT_MOBILE_NAME.to_string()
}

/// Static JSON payloads embedded in the full snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAssets {
    /// Icon catalogue (`icons.json`).
    pub icons: Value,
    /// Alarm panel settings (`fibaroAlarm.json`).
    pub fibaro_alarm: Value,
    /// Device type hierarchy (`hierarchy.json`).
    pub hierarchy: Value,
    /// Color programs (`rgbPrograms.json`).
    pub rgb_programs: Value,
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self {
            icons: serde_json::json!({"device": [], "room": [], "scene": []}),
            fibaro_alarm: serde_json::json!({}),
            hierarchy: serde_json::json!({}),
            rgb_programs: Value::Array(Vec::new()),
        }
    }
}

impl StaticAssets {
    /// Loads the payloads from a directory.
    ///
    /// Missing files fall back to empty payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or is not JSON.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Ok(Self {
            icons: load_asset(dir, "icons.json", defaults.icons)?,
            fibaro_alarm: load_asset(dir, "fibaroAlarm.json", defaults.fibaro_alarm)?,
            hierarchy: load_asset(dir, "hierarchy.json", defaults.hierarchy)?,
            rgb_programs: load_asset(dir, "rgbPrograms.json", defaults.rgb_programs)?,
        })
    }
}

fn load_asset(dir: &Path, name: &str, fallback: Value) -> Result<Value, StoreError> {
    let path = dir.join(name);
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Static asset missing, using empty payload");
        return Ok(fallback);
    }
    Ok(serde_json::from_slice(&fs::read(&path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_serial_shape() {
        for _ in 0..50 {
            let serial = generate_serial();
            let n: u32 = serial.strip_prefix("HCZ-").unwrap().parse().unwrap();
            assert!((1..=1_000_000).contains(&n));
        }
    }

    #[test]
    fn defaults() {
        let config = BridgeConfig::new();
        assert_eq!(config.mac(), BridgeConfig::DEFAULT_MAC);
        assert_eq!(config.mobile_name(), "Some phone model");
        assert_eq!(config.id_floor(), DEFAULT_FLOOR);
    }

    #[test]
    fn deserialize_partial_document() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"HCName": "HCZ-7", "idFloor": 500}"#).unwrap();
        assert_eq!(config.serial(), "HCZ-7");
        assert_eq!(config.mac(), BridgeConfig::DEFAULT_MAC);
        assert_eq!(config.id_floor(), 500);
    }

    #[test]
    fn wire_names() {
        let json = serde_json::to_value(BridgeConfig::new().with_serial("HCZ-1")).unwrap();
        assert_eq!(json["HCName"], "HCZ-1");
        assert_eq!(json["MAC"], BridgeConfig::DEFAULT_MAC);
        assert_eq!(json["softVersion"], "4.100");
    }

    #[test]
    fn default_assets_are_empty() {
        let assets = StaticAssets::default();
        assert_eq!(assets.rgb_programs, serde_json::json!([]));
        assert_eq!(assets.icons["device"], serde_json::json!([]));
    }
}
