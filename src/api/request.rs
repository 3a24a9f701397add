// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport-independent requests and the fixed route set.

use std::collections::BTreeMap;

use super::auth;

/// Endpoints the bridge answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/api/loginStatus`
    LoginStatus,
    /// `/api/mobile/interface/refreshStates`
    RefreshStates,
    /// `/api/modules`
    Modules,
    /// `/api/weather`
    Weather,
    /// `/api/settings/location`
    Location,
    /// `/api/mobile/registerDevice`
    RegisterDevice,
    /// `/api/callAction`
    CallAction,
    /// `/api/mobile/interface/data`
    InterfaceData,
}

impl Route {
    /// All routes.
    pub const ALL: [Self; 8] = [
        Self::LoginStatus,
        Self::RefreshStates,
        Self::Modules,
        Self::Weather,
        Self::Location,
        Self::RegisterDevice,
        Self::CallAction,
        Self::InterfaceData,
    ];

    /// Matches a request path (without query string).
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// The request path of this route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::LoginStatus => "/api/loginStatus",
            Self::RefreshStates => "/api/mobile/interface/refreshStates",
            Self::Modules => "/api/modules",
            Self::Weather => "/api/weather",
            Self::Location => "/api/settings/location",
            Self::RegisterDevice => "/api/mobile/registerDevice",
            Self::CallAction => "/api/callAction",
            Self::InterfaceData => "/api/mobile/interface/data",
        }
    }
}

/// A request as handed over by the transport.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::api::{ApiRequest, Route};
///
/// let request = ApiRequest::from_uri("/api/callAction?deviceID=101&name=setValue&arg1=50")
///     .with_basic_auth("admin", "admin");
///
/// assert_eq!(request.route(), Some(Route::CallAction));
/// assert_eq!(request.query("arg1"), Some("50"));
/// assert_eq!(request.credentials(), Some(("admin".to_string(), "admin".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    query: BTreeMap<String, String>,
    authorization: Option<String>,
}

impl ApiRequest {
    /// Creates a request for a path without query parameters.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parses a request target (`/path?key=value&...`).
    ///
    /// Query components are percent-decoded; `+` decodes to a space.
    /// Components that fail to decode are kept verbatim.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let mut request = Self::new(path);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            request.query.insert(decode(key), decode(value));
        }
        request
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets the raw `Authorization` header.
    #[must_use]
    pub fn with_authorization(mut self, header: impl Into<String>) -> Self {
        self.authorization = Some(header.into());
        self
    }

    /// Sets Basic credentials.
    #[must_use]
    pub fn with_basic_auth(self, login: &str, password: &str) -> Self {
        self.with_authorization(auth::basic_header(login, password))
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Matched route, if any.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        Route::from_path(&self.path)
    }

    /// Returns a query parameter.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Decoded Basic credentials, if present and well-formed.
    #[must_use]
    pub fn credentials(&self) -> Option<(String, String)> {
        self.authorization.as_deref().and_then(auth::parse_basic)
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), |s| s.into_owned())
}
