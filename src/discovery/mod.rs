// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Center finder responder.
//!
//! Fibaro mobile clients locate a Home Center on the local network by
//! broadcasting the datagram `FIBARO` to UDP port 44444. A Home Center
//! answers with `ACK <serial> <mac>` to the sender.
//!
//! # Examples
//!
//! ```no_run
//! use fibaro_bridge::config::BridgeConfig;
//! use fibaro_bridge::discovery::FinderResponder;
//!
//! # async fn example() -> fibaro_bridge::Result<()> {
//! let config = BridgeConfig::new();
//! let responder = FinderResponder::bind(FinderResponder::DEFAULT_ADDR, &config).await?;
//! let handle = responder.spawn();
//!
//! // ...
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::BridgeConfig;
use crate::error::ProtocolError;

/// Finder port of a Home Center.
pub const FINDER_PORT: u16 = 44444;

/// The discovery request datagram.
pub const FINDER_REQUEST: &[u8] = b"FIBARO";

/// Builds the reply to a finder request.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::config::BridgeConfig;
/// use fibaro_bridge::discovery::finder_reply;
///
/// let config = BridgeConfig::new().with_serial("HCZ-123456").with_mac("aa:bb");
/// assert_eq!(finder_reply(&config), "ACK HCZ-123456 aa:bb");
/// ```
#[must_use]
pub fn finder_reply(config: &BridgeConfig) -> String {
    format!("ACK {} {}", config.serial(), config.mac())
}

/// UDP socket answering finder broadcasts.
#[derive(Debug)]
pub struct FinderResponder {
    socket: UdpSocket,
    reply: String,
}

impl FinderResponder {
    /// Wildcard address on the finder port.
    pub const DEFAULT_ADDR: SocketAddr =
        SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), FINDER_PORT);

    /// Binds the responder socket.
    ///
    /// The reply is fixed at bind time from the configured serial and MAC.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Socket`] if the socket cannot be bound or
    /// switched to broadcast mode.
    pub async fn bind(addr: SocketAddr, config: &BridgeConfig) -> Result<Self, ProtocolError> {
        let socket = UdpSocket::bind(addr).await?;
        socket.set_broadcast(true)?;
        tracing::info!(addr = %socket.local_addr()?, "Finder responder bound");
        Ok(Self {
            socket,
            reply: finder_reply(config),
        })
    }

    /// Returns the bound address.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Socket`] if the address cannot be queried.
    pub fn local_addr(&self) -> Result<SocketAddr, ProtocolError> {
        Ok(self.socket.local_addr()?)
    }

    /// Answers requests until the socket fails.
    ///
    /// # Errors
    ///
    /// Returns the socket error that ended the loop.
    pub async fn run(&self) -> Result<(), ProtocolError> {
        let mut buf = [0u8; 64];
        loop {
            let (len, peer) = self.socket.recv_from(&mut buf).await?;
            if &buf[..len] != FINDER_REQUEST {
                tracing::trace!(%peer, len, "Ignoring datagram");
                continue;
            }
            tracing::debug!(%peer, "Finder request");
            if let Err(err) = self.socket.send_to(self.reply.as_bytes(), peer).await {
                tracing::warn!(%peer, error = %err, "Failed to answer finder request");
            }
        }
    }

    /// Runs the responder on a background task.
    #[must_use]
    pub fn spawn(self) -> FinderHandle {
        let (shutdown, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            tokio::select! {
                result = self.run() => {
                    if let Err(err) = result {
                        tracing::warn!(error = %err, "Finder responder stopped");
                    }
                }
                _ = stopped => tracing::debug!("Finder responder shut down"),
            }
        });
        FinderHandle { shutdown, task }
    }
}

/// Handle of a spawned [`FinderResponder`].
#[derive(Debug)]
pub struct FinderHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FinderHandle {
    /// Stops the responder and waits for its task to end.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "Finder task failed");
        }
    }
}
