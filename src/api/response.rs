// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `{status, headers, body}` triple the transport renders.

use serde_json::Value;

/// Content type of every JSON response.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON document.
    Json(Value),
    /// Plain text.
    Text(String),
}

/// A response for the transport to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(&'static str, String)>,
    /// Body.
    pub body: ResponseBody,
}

impl ApiResponse {
    /// A JSON response.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", JSON_CONTENT_TYPE.to_string())],
            body: ResponseBody::Json(body),
        }
    }

    /// A plain text response without headers.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ResponseBody::Text(body.into()),
        }
    }

    /// The uniform answer to unauthenticated requests.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::text(401, "Not logged in")
    }

    /// A failed request.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::text(500, message)
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Renders the body as a string.
    #[must_use]
    pub fn body_string(&self) -> String {
        match &self.body {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        }
    }
}
