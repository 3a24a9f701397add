// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Z-Way REST client.
//!
//! Reads the virtual device list, the locations and the Z-Wave mesh facts
//! from a Z-Way controller into a [`DeviceSnapshot`](crate::device::DeviceSnapshot),
//! and executes [`DeviceCommand`](crate::command::DeviceCommand)s.
//!
//! # Examples
//!
//! ```no_run
//! use fibaro_bridge::command::CommandQueue;
//! use fibaro_bridge::zway::{ZWayConfig, spawn_dispatcher};
//!
//! # async fn example() -> fibaro_bridge::Result<()> {
//! let client = ZWayConfig::new("192.168.1.20")
//!     .with_credentials("admin", "secret")
//!     .into_client()?;
//!
//! let snapshot = client.fetch_snapshot().await?;
//!
//! let (queue, rx) = CommandQueue::new();
//! let dispatcher = spawn_dispatcher(client, rx);
//! # let _ = (snapshot, queue, dispatcher);
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::{ZWayClient, spawn_dispatcher};

use std::time::Duration;

use reqwest::Client;

use crate::error::ProtocolError;

/// Connection parameters of a Z-Way controller.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::zway::ZWayConfig;
///
/// let config = ZWayConfig::new("192.168.1.20");
/// assert_eq!(config.base_url(), "http://192.168.1.20:8083");
///
/// let config = ZWayConfig::new("zway.local").with_port(80).with_bus("zway2");
/// assert_eq!(config.base_url(), "http://zway.local");
/// assert_eq!(config.bus(), "zway2");
/// ```
#[derive(Debug, Clone)]
pub struct ZWayConfig {
    host: String,
    port: u16,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
    bus: String,
}

impl ZWayConfig {
    /// Default Z-Way port.
    pub const DEFAULT_PORT: u16 = 8083;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Name of the default Z-Wave binding.
    pub const DEFAULT_BUS: &'static str = "zway";

    /// Creates a configuration for the controller at `host`.
    ///
    /// `host` may carry a scheme and port (`http://127.0.0.1:8083`), in which
    /// case it is used as the base URL verbatim.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
            bus: Self::DEFAULT_BUS.to_string(),
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enables HTTPS.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        self
    }

    /// Sets Basic credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the name of the Z-Wave binding whose mesh is read.
    #[must_use]
    pub fn with_bus(mut self, bus: impl Into<String>) -> Self {
        self.bus = bus.into();
        self
    }

    /// Returns the Z-Wave binding name.
    #[must_use]
    pub fn bus(&self) -> &str {
        &self.bus
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Builds the base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }
        let scheme = if self.use_https { "https" } else { "http" };
        let port_suffix =
            if (self.use_https && self.port == 443) || (!self.use_https && self.port == 80) {
                String::new()
            } else {
                format!(":{}", self.port)
            };
        format!("{scheme}://{}{port_suffix}", self.host)
    }

    /// Creates the client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<ZWayClient, ProtocolError> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;
        Ok(ZWayClient::new(self.base_url(), http, self.credentials, self.bus))
    }
}
