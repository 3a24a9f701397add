// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge example.
//!
//! Connects to a Z-Way controller, answers the Home Center finder on UDP
//! port 44444 and prints what a Fibaro mobile client would receive: the full
//! device list, then the change feed after a short wait.
//!
//! Identities are kept in `fibaro_ids.json` and the bridge configuration in
//! `fibaro_bridge.json`, both in the current directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example bridge -- <zway_host> [username] [password]
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Local controller without authentication
//! cargo run --example bridge -- 127.0.0.1
//!
//! # Remote controller with credentials
//! cargo run --example bridge -- 192.168.1.20 admin secret
//! ```

use std::env;
use std::time::Duration;

use fibaro_bridge::api::{ApiRequest, Bridge, StaticProfiles};
use fibaro_bridge::command::CommandQueue;
use fibaro_bridge::config::BridgeConfig;
use fibaro_bridge::device::DeviceSource;
use fibaro_bridge::discovery::FinderResponder;
use fibaro_bridge::registry::JsonFileStore;
use fibaro_bridge::visibility::AccessProfile;
use fibaro_bridge::zway::{ZWayConfig, spawn_dispatcher};

const LOGIN: &str = "admin";
const PASSWORD: &str = "admin";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let mut zway = ZWayConfig::new(args[1].as_str());
    if let (Some(username), Some(password)) = (args.get(2), args.get(3)) {
        zway = zway.with_credentials(username.as_str(), password.as_str());
    }
    let client = zway.into_client()?;
    println!("Z-Way controller: {}", client.base_url());

    let config = BridgeConfig::load_or_init("fibaro_bridge.json")?;
    println!("Home Center serial: {} ({})", config.serial(), config.mac());

    let finder = FinderResponder::bind(FinderResponder::DEFAULT_ADDR, &config)
        .await?
        .spawn();

    let (queue, rx) = CommandQueue::new();
    let dispatcher = spawn_dispatcher(client.clone(), rx);

    let profiles = StaticProfiles::new().with_profile(AccessProfile::admin(2, LOGIN), PASSWORD);
    let bridge = Bridge::open(config, JsonFileStore::new("fibaro_ids.json"), profiles, queue)?;

    let snapshot = client.fetch_snapshot().await?;
    println!("Fetched {} devices", snapshot.devices().len());

    let data = get(&bridge, "/api/mobile/interface/data", &snapshot)?;
    if let Some(devices) = data["devices"].as_array() {
        for device in devices {
            println!(
                "  {:>5}  {:<40} {}",
                device["id"].as_i64().unwrap_or_default(),
                device["type"].as_str().unwrap_or("-"),
                device["name"].as_str().unwrap_or("-")
            );
        }
    }

    let handshake = get(&bridge, "/api/mobile/interface/refreshStates", &snapshot)?;
    let cursor = handshake["last"].as_i64().unwrap_or_default();

    println!("Waiting 10 seconds for changes...");
    tokio::time::sleep(Duration::from_secs(10)).await;

    let snapshot = client.fetch_snapshot().await?;
    let uri = format!("/api/mobile/interface/refreshStates?last={cursor}");
    let feed = get(&bridge, &uri, &snapshot)?;
    match feed["changes"].as_array() {
        Some(changes) if !changes.is_empty() => {
            for change in changes {
                println!("  changed: {change}");
            }
        }
        _ => println!("  no changes"),
    }

    finder.shutdown().await;
    drop(bridge);
    dispatcher.await?;
    Ok(())
}

fn get(
    bridge: &Bridge,
    uri: &str,
    source: &dyn DeviceSource,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let request = ApiRequest::from_uri(uri).with_basic_auth(LOGIN, PASSWORD);
    let response = bridge
        .respond(&request, source)
        .ok_or_else(|| format!("route not served: {uri}"))?;
    if response.status != 200 {
        return Err(format!("{uri}: HTTP {} {}", response.status, response.body_string()).into());
    }
    Ok(response.json_body().cloned().unwrap_or_default())
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {program} <zway_host> [username] [password]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {program} 127.0.0.1");
    eprintln!("  {program} 192.168.1.20 admin secret");
}
