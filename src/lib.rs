// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `fibaro_bridge` - Fibaro Home Center emulation over Z-Way devices.
//!
//! This library lets Fibaro mobile clients drive the virtual devices of a
//! Z-Way controller. It assigns each internal device a stable integer id,
//! translates devices into Fibaro descriptors, filters them per user and
//! serves the incremental change feed the clients poll.
//!
//! # Features
//!
//! - **Identity registry**: stable, monotonically allocated external ids,
//!   persisted across restarts
//! - **Classification**: Fibaro type, interfaces and properties per device
//!   family, including meter, battery and mesh-health enrichment
//! - **Visibility**: admin and room-restricted access profiles
//! - **Change feed**: cursor-based `refreshStates` polling
//! - **Commands**: Fibaro action calls mapped to typed device commands
//! - **Finder**: UDP responder for client auto-discovery
//! - **Z-Way client** (feature `zway`, on by default): REST snapshot fetch and
//!   command dispatch
//!
//! # Quick Start
//!
//! ```no_run
//! use fibaro_bridge::api::{ApiRequest, Bridge, StaticProfiles};
//! use fibaro_bridge::command::CommandQueue;
//! use fibaro_bridge::config::BridgeConfig;
//! use fibaro_bridge::registry::JsonFileStore;
//! use fibaro_bridge::visibility::AccessProfile;
//! use fibaro_bridge::zway::{ZWayConfig, spawn_dispatcher};
//!
//! #[tokio::main]
//! async fn main() -> fibaro_bridge::Result<()> {
//!     let config = BridgeConfig::load_or_init("bridge.json")?;
//!     let profiles = StaticProfiles::new().with_profile(AccessProfile::admin(1, "admin"), "admin");
//!
//!     let client = ZWayConfig::new("127.0.0.1").into_client()?;
//!     let (queue, rx) = CommandQueue::new();
//!     let _dispatcher = spawn_dispatcher(client.clone(), rx);
//!
//!     let bridge = Bridge::open(config, JsonFileStore::new("ids.json"), profiles, queue)?;
//!
//!     let snapshot = client.fetch_snapshot().await?;
//!     let request = ApiRequest::from_uri("/api/mobile/interface/data")
//!         .with_basic_auth("admin", "admin");
//!     if let Some(response) = bridge.respond(&request, &snapshot) {
//!         println!("{} {}", response.status, response.body_string());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod classify;
pub mod command;
pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod feed;
pub mod registry;
pub mod types;
pub mod visibility;
#[cfg(feature = "zway")]
pub mod zway;

pub use api::Bridge;
pub use error::{Error, ParseError, ProtocolError, Result, StoreError, ValueError};
