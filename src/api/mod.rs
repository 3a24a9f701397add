// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fibaro Home Center API request handling.
//!
//! [`Bridge`] answers the fixed set of endpoints a Fibaro mobile client
//! uses. It does not own a socket: the host parses HTTP into an
//! [`ApiRequest`], takes a momentary view of the device subsystem and renders
//! the returned [`ApiResponse`]. `None` means the route is not served and
//! should become a 404.
//!
//! # Examples
//!
//! ```
//! use fibaro_bridge::api::{ApiRequest, Bridge, StaticProfiles};
//! use fibaro_bridge::command::RecordingSink;
//! use fibaro_bridge::config::BridgeConfig;
//! use fibaro_bridge::device::DeviceSnapshot;
//! use fibaro_bridge::registry::MemoryStore;
//! use fibaro_bridge::visibility::AccessProfile;
//!
//! let profiles = StaticProfiles::new().with_profile(AccessProfile::admin(1, "admin"), "admin");
//! let bridge = Bridge::open(BridgeConfig::new(), MemoryStore::new(), profiles, RecordingSink::new())?;
//!
//! let request = ApiRequest::from_uri("/api/modules").with_basic_auth("admin", "admin");
//! let response = bridge.respond(&request, &DeviceSnapshot::new()).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_string(), "[]");
//!
//! let anonymous = ApiRequest::from_uri("/api/modules");
//! assert_eq!(bridge.respond(&anonymous, &DeviceSnapshot::new()).unwrap().status, 401);
//! # Ok::<(), fibaro_bridge::error::StoreError>(())
//! ```

mod auth;
mod payload;
mod request;
mod response;

pub use auth::{ProfileDirectory, StaticProfiles, basic_header, parse_basic};
pub use payload::{MOBILE_DEVICE_ID, WEATHER_DEVICE_ID};
pub use request::{ApiRequest, Route};
pub use response::{ApiResponse, JSON_CONTENT_TYPE, ResponseBody};

use chrono::{DateTime, FixedOffset, Local};
use parking_lot::{Mutex, MutexGuard};

use crate::classify::classify;
use crate::command::{CommandSink, DeviceCommand};
use crate::config::{BridgeConfig, StaticAssets};
use crate::device::DeviceSource;
use crate::error::{Result, StoreError};
use crate::feed;
use crate::registry::{IdentityRegistry, MappingStore};
use crate::types::ExternalId;
use crate::visibility::{AccessProfile, all_visible};

/// The request handler.
pub struct Bridge {
    config: BridgeConfig,
    assets: StaticAssets,
    registry: Mutex<IdentityRegistry>,
    profiles: Box<dyn ProfileDirectory>,
    commands: Box<dyn CommandSink>,
}

impl Bridge {
    /// Opens the identity table with the configured id floor and creates a
    /// bridge over it.
    ///
    /// # Errors
    ///
    /// Returns the store error if the identity table cannot be loaded.
    pub fn open(
        config: BridgeConfig,
        store: impl MappingStore + 'static,
        profiles: impl ProfileDirectory + 'static,
        commands: impl CommandSink + 'static,
    ) -> std::result::Result<Self, StoreError> {
        let registry = IdentityRegistry::open(store, config.id_floor())?;
        Ok(Self::new(config, registry, profiles, commands))
    }

    /// Creates a bridge with empty static assets over an opened registry.
    ///
    /// The registry's own floor governs allocation; a different configured
    /// floor is logged and ignored.
    #[must_use]
    pub fn new(
        config: BridgeConfig,
        registry: IdentityRegistry,
        profiles: impl ProfileDirectory + 'static,
        commands: impl CommandSink + 'static,
    ) -> Self {
        if registry.floor().value() != config.id_floor() {
            tracing::warn!(
                configured = config.id_floor(),
                registry = %registry.floor(),
                "Registry floor differs from configured id floor"
            );
        }
        Self {
            config,
            assets: StaticAssets::default(),
            registry: Mutex::new(registry),
            profiles: Box::new(profiles),
            commands: Box::new(commands),
        }
    }

    /// Sets the static payloads of the full snapshot.
    #[must_use]
    pub fn with_assets(mut self, assets: StaticAssets) -> Self {
        self.assets = assets;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Locks the identity registry.
    pub fn registry(&self) -> MutexGuard<'_, IdentityRegistry> {
        self.registry.lock()
    }

    /// Handles a request, mapping failures to a 500 response.
    #[must_use]
    pub fn respond(&self, request: &ApiRequest, source: &dyn DeviceSource) -> Option<ApiResponse> {
        match self.handle(request, source) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path = request.path(), error = %err, "Request failed");
                Some(ApiResponse::internal_error(err.to_string()))
            }
        }
    }

    /// Handles a request at the current local time.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if a new external id could not be persisted.
    pub fn handle(
        &self,
        request: &ApiRequest,
        source: &dyn DeviceSource,
    ) -> Result<Option<ApiResponse>> {
        self.handle_at(request, source, Local::now().fixed_offset())
    }

    /// Handles a request as if it arrived at `now`.
    ///
    /// Authentication runs before routing: a request without valid
    /// credentials gets a 401 whatever its path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if a new external id could not be persisted.
    pub fn handle_at(
        &self,
        request: &ApiRequest,
        source: &dyn DeviceSource,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<ApiResponse>> {
        let Some(profile) = self.authenticate(request) else {
            tracing::debug!(path = request.path(), "Rejected unauthenticated request");
            return Ok(Some(ApiResponse::unauthorized()));
        };
        let Some(route) = request.route() else {
            tracing::debug!(path = request.path(), "No such route");
            return Ok(None);
        };
        tracing::debug!(?route, user = %profile.login, "Handling request");

        let response = match route {
            Route::LoginStatus => (request.query("action") == Some("login"))
                .then(|| ApiResponse::json(200, payload::login_status(&profile))),
            Route::RefreshStates => Some(self.refresh_states(request, source, &profile, now)),
            Route::Modules => Some(ApiResponse::json(200, serde_json::json!([]))),
            Route::Weather => Some(ApiResponse::json(200, payload::weather())),
            Route::Location => Some(ApiResponse::json(200, payload::location(&now))),
            Route::RegisterDevice => Some(ApiResponse::json(200, payload::register_device())),
            Route::CallAction => {
                self.call_action(request, source);
                Some(ApiResponse::json(202, payload::call_action_ack()))
            }
            Route::InterfaceData => Some(self.interface_data(source, &profile, now)?),
        };
        Ok(response)
    }

    fn authenticate(&self, request: &ApiRequest) -> Option<AccessProfile> {
        let (login, password) = request.credentials()?;
        self.profiles.authenticate(&login, &password)
    }

    fn refresh_states(
        &self,
        request: &ApiRequest,
        source: &dyn DeviceSource,
        profile: &AccessProfile,
        now: DateTime<FixedOffset>,
    ) -> ApiResponse {
        let since = request
            .query("last")
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        let result = {
            let registry = self.registry.lock();
            feed::poll(source, &registry, Some(profile), since, now.timestamp())
        };
        let body = payload::RefreshStates::new(&result, &now);
        ApiResponse::json(
            200,
            serde_json::to_value(body).unwrap_or(serde_json::Value::Null),
        )
    }

    fn interface_data(
        &self,
        source: &dyn DeviceSource,
        profile: &AccessProfile,
        now: DateTime<FixedOffset>,
    ) -> Result<ApiResponse> {
        let mut devices = Vec::from(payload::synthetic_devices(profile, &self.config));
        {
            let mut registry = self.registry.lock();
            for device in all_visible(Some(profile), source.devices()) {
                let mapping = registry.resolve_or_allocate(&device.key)?;
                devices.push(classify(device, &mapping, source));
            }
        }

        let body = payload::InterfaceData::new(
            &self.config,
            &self.assets,
            profile,
            payload::rooms(source.locations()),
            devices,
            now.timestamp(),
        );
        Ok(ApiResponse::json(
            200,
            serde_json::to_value(body).map_err(crate::error::ParseError::from)?,
        ))
    }

    /// Forwards an action call. Every failure is logged and swallowed: the
    /// client always gets the same acknowledgement.
    fn call_action(&self, request: &ApiRequest, source: &dyn DeviceSource) {
        let Some(id) = request
            .query("deviceID")
            .and_then(|raw| raw.parse::<ExternalId>().ok())
        else {
            tracing::debug!("Action call without a valid deviceID");
            return;
        };
        let Some(key) = self.registry.lock().lookup_by_external_id(id).cloned() else {
            tracing::debug!(%id, "Action call for unknown device");
            return;
        };

        let name = request.query("name").unwrap_or_default();
        let args = ["arg1", "arg2", "arg3", "arg4"].map(|arg| request.query(arg));
        let command = match DeviceCommand::from_action(name, &args) {
            Ok(command) => command,
            Err(err) => {
                tracing::debug!(%id, error = %err, "Ignoring action");
                return;
            }
        };

        if command.is_mesh_command() {
            if key.zway_address().is_none() {
                tracing::debug!(device = %key, "Wake-up of a non Z-Wave device ignored");
                return;
            }
        } else if source.device(&key).is_none() {
            tracing::debug!(device = %key, "Action call for a vanished device");
            return;
        }

        if let Err(err) = self.commands.dispatch(&key, command) {
            tracing::warn!(device = %key, %command, error = %err, "Failed to dispatch command");
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("registry", &*self.registry.lock())
            .finish_non_exhaustive()
    }
}
