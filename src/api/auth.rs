// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP Basic authentication against a profile directory.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::visibility::AccessProfile;

/// Resolves credentials to a caller profile.
pub trait ProfileDirectory: Send + Sync {
    /// Returns the profile of `login` if `password` matches.
    fn authenticate(&self, login: &str, password: &str) -> Option<AccessProfile>;
}

/// Fixed set of profiles with plain-text passwords.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::api::{ProfileDirectory, StaticProfiles};
/// use fibaro_bridge::visibility::AccessProfile;
///
/// let profiles = StaticProfiles::new().with_profile(AccessProfile::admin(1, "admin"), "secret");
///
/// assert!(profiles.authenticate("admin", "secret").is_some());
/// assert!(profiles.authenticate("admin", "wrong").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    entries: Vec<(AccessProfile, String)>,
}

impl StaticProfiles {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a profile.
    #[must_use]
    pub fn with_profile(mut self, profile: AccessProfile, password: impl Into<String>) -> Self {
        self.entries.push((profile, password.into()));
        self
    }
}

impl ProfileDirectory for StaticProfiles {
    fn authenticate(&self, login: &str, password: &str) -> Option<AccessProfile> {
        self.entries
            .iter()
            .find(|(profile, _)| profile.login == login)
            .filter(|(_, expected)| expected == password)
            .map(|(profile, _)| profile.clone())
    }
}

/// Decodes an `Authorization: Basic ...` header into login and password.
///
/// The password is everything after the first colon.
#[must_use]
pub fn parse_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (login, password) = decoded.split_once(':')?;
    Some((login.to_string(), password.to_string()))
}

/// Encodes login and password as a Basic `Authorization` header value.
#[must_use]
pub fn basic_header(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{login}:{password}")))
}
