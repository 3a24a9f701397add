// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Failures are scoped to the request that triggered them. The only error a
//! request handler can surface is a persistence failure while allocating an
//! identity; everything else (unknown ids, unclassified devices) is absorbed
//! by the layer that encounters it.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while loading or persisting the identity mapping table
    /// or the bridge configuration.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error occurred while talking to the device subsystem.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing device subsystem data.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

/// Errors related to durable storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored table violates the uniqueness invariant or has no ids left.
    #[error("corrupt mapping table: {0}")]
    Corrupt(String),

    /// The backend refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors related to communication with the device subsystem or the network.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "zway")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Authentication against the controller failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Socket setup or I/O failed.
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to parsing device subsystem payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// Errors related to value validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A device key does not follow the Z-Way virtual device naming scheme.
    #[error("not a Z-Way virtual device key: {0}")]
    NotZWayKey(String),

    /// A command name is not part of the supported action set.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A command argument is missing or not a number.
    #[error("invalid argument {name}: {value:?}")]
    InvalidArgument {
        /// The argument name (`arg1`, `arg2`, ...).
        name: String,
        /// The raw value received, if any.
        value: Option<String>,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidArgument {
            name: "arg1".to_string(),
            value: Some("abc".to_string()),
        };
        assert_eq!(err.to_string(), "invalid argument arg1: Some(\"abc\")");
    }

    #[test]
    fn error_from_store_error() {
        let err: Error = StoreError::Unavailable("read-only".to_string()).into();
        assert!(matches!(err, Error::Store(StoreError::Unavailable(_))));
        assert_eq!(err.to_string(), "store error: store unavailable: read-only");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("data.devices".to_string());
        assert_eq!(err.to_string(), "missing field in response: data.devices");
    }

    #[test]
    fn unknown_action_display() {
        let err = ValueError::UnknownAction("selfDestruct".to_string());
        assert_eq!(err.to_string(), "unknown action: selfDestruct");
    }
}
