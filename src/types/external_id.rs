// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! External device identifier type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Integer identifier a Fibaro-compatible client uses to address a device.
///
/// A distinct type keeps external ids apart from room ids, sort orders and
/// the other small integers flowing through the API.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::types::ExternalId;
///
/// let id = ExternalId::new(101);
/// assert_eq!(id.value(), 101);
/// assert_eq!(id.to_string(), "101");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ExternalId(u32);

impl ExternalId {
    /// Creates an external id from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns the id that follows this one, or `None` once the id space
    /// is exhausted.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExternalId {
    type Err = ValueError;

    // Clients send ids as query strings; surrounding whitespace is tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ValueError::InvalidArgument {
                name: "deviceID".to_string(),
                value: Some(s.to_string()),
            })
    }
}

impl From<u32> for ExternalId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ExternalId> for u32 {
    fn from(id: ExternalId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_from_query_value() {
        assert_eq!("101".parse::<ExternalId>().unwrap(), ExternalId::new(101));
        assert_eq!(" 7 ".parse::<ExternalId>().unwrap(), ExternalId::new(7));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = "abc".parse::<ExternalId>().unwrap_err();
        assert!(matches!(err, ValueError::InvalidArgument { .. }));
        assert!("-1".parse::<ExternalId>().is_err());
    }

    #[test]
    fn next_increments() {
        assert_eq!(ExternalId::new(100).next(), Some(ExternalId::new(101)));
        assert_eq!(ExternalId::new(u32::MAX).next(), None);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&ExternalId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn ordering_follows_value() {
        assert!(ExternalId::new(101) > ExternalId::new(100));
    }
}
