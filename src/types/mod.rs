// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bridge.
//!
//! # Types
//!
//! - [`ExternalId`] - Integer id a Fibaro client uses for a device
//! - [`DeviceKey`] - Opaque key of an internal device
//! - [`ZWayAddress`] - Decomposed Z-Way virtual device key
//! - [`RoomId`] - Location id (0 = unassigned)
//! - [`MetricValue`] / [`Metrics`] - Loosely typed device readings
//! - [`RgbColor`] - Color controller channels

mod device_key;
mod external_id;
mod metric;
mod rgb_color;

pub use device_key::{DeviceKey, ZWayAddress};
pub use external_id::ExternalId;
pub use metric::{MetricValue, Metrics, format_number};
pub use rgb_color::RgbColor;

/// Location (room) identifier. `0` means the device is not assigned to a room.
pub type RoomId = u32;

/// The room id of unassigned devices.
pub const UNASSIGNED_ROOM: RoomId = 0;
