// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental change feed.
//!
//! A polling client echoes back the cursor of its previous poll and gets the
//! value updates of every visible device touched since. The very first poll
//! (no cursor, or `0`) is a handshake: it only hands out a cursor.
//!
//! When the device set itself changed since the cursor, per-device
//! timestamps can no longer be trusted, so every visible device is reported.
//!
//! Old values are unknown; the bridge keeps no history.

use serde::Serialize;
use serde_json::Value;

use crate::classify::classify_value;
use crate::device::{DeviceSource, InternalDevice};
use crate::registry::IdentityRegistry;
use crate::types::ExternalId;
use crate::visibility::{AccessProfile, visible_devices};

/// Event type of a property update.
pub const PROPERTY_UPDATED: &str = "DevicePropertyUpdatedEvent";

/// The only property the feed reports.
pub const VALUE_PROPERTY: &str = "value";

/// Payload of a property update event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    /// External id.
    pub id: ExternalId,
    /// Changed property.
    pub property: &'static str,
    /// New value, typed the way clients expect it for the device family.
    pub new_value: Value,
}

/// Entry of the event list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEvent {
    /// Always [`PROPERTY_UPDATED`].
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Event payload.
    pub data: PropertyUpdate,
}

/// Entry of the change list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedChange {
    /// External id.
    pub id: ExternalId,
    /// Fibaro type, if known.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<&'static str>,
    /// Always empty.
    pub log: String,
    /// Always empty.
    pub log_temp: String,
    /// Breach time of security sensors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_breached: Option<i64>,
    /// Stringified value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Outcome of a poll.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeFeedResult {
    /// Property update events.
    pub events: Vec<FeedEvent>,
    /// Value changes.
    pub changes: Vec<FeedChange>,
    /// Cursor for the next poll.
    pub cursor: i64,
    /// The device set changed since the previous cursor.
    pub structure_changed: bool,
}

impl ChangeFeedResult {
    /// Returns `true` if there is nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.changes.is_empty()
    }
}

/// Computes what a poller should receive.
///
/// `since` is the cursor of the previous poll; `now` (unix seconds) becomes
/// the new cursor. Devices without an external id are skipped: the client
/// cannot address them before the next full snapshot.
#[must_use]
pub fn poll(
    source: &dyn DeviceSource,
    registry: &IdentityRegistry,
    profile: Option<&AccessProfile>,
    since: Option<i64>,
    now: i64,
) -> ChangeFeedResult {
    let Some(since) = since.filter(|&s| s != 0) else {
        tracing::debug!(cursor = now, "Change feed handshake");
        return ChangeFeedResult {
            cursor: now,
            ..ChangeFeedResult::default()
        };
    };

    let structure_changed = source.last_structure_change() >= since;
    let updated = |device: &InternalDevice| structure_changed || device.update_time >= since;

    let mut result = ChangeFeedResult {
        cursor: now,
        structure_changed,
        ..ChangeFeedResult::default()
    };

    for device in visible_devices(profile, source.devices(), updated) {
        let Some(id) = registry.resolve(&device.key) else {
            tracing::trace!(device = %device.key, "Skipping unmapped device");
            continue;
        };
        let report = classify_value(device);

        result.events.push(FeedEvent {
            kind: PROPERTY_UPDATED,
            data: PropertyUpdate {
                id,
                property: VALUE_PROPERTY,
                new_value: report.new_value,
            },
        });
        result.changes.push(FeedChange {
            id,
            type_tag: report.type_tag,
            log: String::new(),
            log_temp: String::new(),
            last_breached: report.last_breached,
            value: report.value,
        });
    }

    tracing::debug!(
        since,
        cursor = now,
        structure_changed,
        changes = result.changes.len(),
        "Change feed polled"
    );
    result
}
