// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External device descriptor.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{ExternalId, RoomId};

use super::InterfaceSet;

/// String-valued device properties.
///
/// Undefined values are never stored, so they never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<&'static str, String>);

impl PropertyBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property. `None` leaves the property undefined.
    pub fn set(&mut self, key: &'static str, value: Option<String>) {
        if let Some(value) = value {
            self.0.insert(key, value);
        }
    }

    /// Sets a fixed property.
    pub fn set_str(&mut self, key: &'static str, value: &str) {
        self.0.insert(key, value.to_string());
    }

    /// Returns a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if the property is defined.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of defined properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no property is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A device as a Fibaro client sees it.
///
/// Serializes to the `devices[]` entry of the snapshot envelope. Undefined
/// fields (unknown icon, base type or type) are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    /// External id.
    pub id: ExternalId,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Room id.
    pub room_id: RoomId,
    /// Display order.
    pub sort_order: u32,
    /// Always `true`.
    pub enabled: bool,
    /// Always `false`.
    pub view_xml: bool,
    /// Icon id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<u32>,
    /// Base type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    /// Type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,
    /// Capability tags.
    pub interfaces: InterfaceSet,
    /// Property bag.
    pub properties: PropertyBag,
}

impl DeviceDescriptor {
    /// Creates a bare descriptor for a synthetic (non-device) entry.
    #[must_use]
    pub fn synthetic(
        id: u32,
        name: impl Into<String>,
        icon_id: u32,
        sort_order: u32,
        type_tag: &str,
    ) -> Self {
        Self {
            id: ExternalId::new(id),
            name: Some(name.into()),
            room_id: 0,
            sort_order,
            enabled: true,
            view_xml: false,
            icon_id: Some(icon_id),
            base_type: Some(String::new()),
            type_tag: Some(type_tag.to_string()),
            interfaces: InterfaceSet::new(),
            properties: PropertyBag::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_properties_are_dropped() {
        let mut bag = PropertyBag::new();
        bag.set("value", Some("1".to_string()));
        bag.set("unit", None);
        assert!(bag.contains("value"));
        assert!(!bag.contains("unit"));
        assert_eq!(serde_json::to_string(&bag).unwrap(), r#"{"value":"1"}"#);
    }

    #[test]
    fn synthetic_entry_shape() {
        let json = serde_json::to_value(DeviceDescriptor::synthetic(3, "weather", 0, 3, "weather"))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "name": "weather",
                "roomId": 0,
                "sortOrder": 3,
                "enabled": true,
                "viewXml": false,
                "iconId": 0,
                "baseType": "",
                "type": "weather",
                "interfaces": [],
                "properties": {}
            })
        );
    }
}
