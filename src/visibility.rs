// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Narrowing the device set to what a caller may see.

use serde::{Deserialize, Serialize};

use crate::device::InternalDevice;
use crate::types::{RoomId, UNASSIGNED_ROOM};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees every device.
    Admin,
    /// Sees devices of the permitted rooms only.
    Restricted,
}

/// An already-authenticated caller.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::visibility::{AccessProfile, Role};
///
/// let guest = AccessProfile::restricted(5, "guest").with_rooms([1, 2]);
/// assert_eq!(guest.role, Role::Restricted);
/// assert_eq!(guest.rooms.as_deref(), Some(&[1, 2][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    /// Numeric user id.
    pub id: u32,
    /// Login name.
    pub login: String,
    /// Role.
    pub role: Role,
    /// Permitted rooms of a restricted caller.
    #[serde(default)]
    pub rooms: Option<Vec<RoomId>>,
}

impl AccessProfile {
    /// Creates an administrator profile.
    #[must_use]
    pub fn admin(id: u32, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            role: Role::Admin,
            rooms: None,
        }
    }

    /// Creates a restricted profile without rooms.
    #[must_use]
    pub fn restricted(id: u32, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            role: Role::Restricted,
            rooms: None,
        }
    }

    /// Sets the permitted rooms.
    #[must_use]
    pub fn with_rooms(mut self, rooms: impl IntoIterator<Item = RoomId>) -> Self {
        self.rooms = Some(rooms.into_iter().collect());
        self
    }

    /// Returns `true` if the role filter lets this device through.
    ///
    /// Unassigned devices are never visible to restricted callers, even if
    /// room `0` is in their list.
    #[must_use]
    pub fn may_see(&self, device: &InternalDevice) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Restricted => self.rooms.as_ref().is_some_and(|rooms| {
                device.location != UNASSIGNED_ROOM && rooms.contains(&device.location)
            }),
        }
    }
}

/// Returns the devices a caller may see and that match `predicate`.
///
/// Permanently hidden devices are always excluded. An absent profile sees
/// nothing. The predicate only runs on devices that passed the role filter.
#[must_use]
pub fn visible_devices<'a, P>(
    profile: Option<&AccessProfile>,
    devices: &'a [InternalDevice],
    predicate: P,
) -> Vec<&'a InternalDevice>
where
    P: Fn(&InternalDevice) -> bool,
{
    let Some(profile) = profile else {
        return Vec::new();
    };
    devices
        .iter()
        .filter(|d| !d.permanently_hidden)
        .filter(|d| profile.may_see(d))
        .filter(|d| predicate(*d))
        .collect()
}

/// [`visible_devices`] without an extra predicate.
#[must_use]
pub fn all_visible<'a>(
    profile: Option<&AccessProfile>,
    devices: &'a [InternalDevice],
) -> Vec<&'a InternalDevice> {
    visible_devices(profile, devices, |_| true)
}
