// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command sinks.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::types::DeviceKey;

use super::DeviceCommand;

/// Destination of device commands.
///
/// `dispatch` is called from the synchronous request path and must not
/// block on device I/O.
pub trait CommandSink: Send + Sync {
    /// Forwards a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be handed over.
    fn dispatch(&self, key: &DeviceKey, command: DeviceCommand) -> Result<(), ProtocolError>;
}

/// A command waiting in a [`CommandQueue`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    /// Target device.
    pub key: DeviceKey,
    /// Command.
    pub command: DeviceCommand,
}

/// Receiving end of a [`CommandQueue`].
pub type CommandReceiver = mpsc::UnboundedReceiver<QueuedCommand>;

/// Queue-backed sink.
///
/// Commands are pushed on an unbounded tokio channel and executed by
/// whatever drains the receiver, typically `zway::spawn_dispatcher`.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::command::{CommandQueue, CommandSink, DeviceCommand};
/// use fibaro_bridge::types::DeviceKey;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (queue, mut rx) = CommandQueue::new();
/// queue.dispatch(&DeviceKey::new("ZWayVDev_zway_2-0-37"), DeviceCommand::On).unwrap();
///
/// let queued = rx.recv().await.unwrap();
/// assert_eq!(queued.command, DeviceCommand::On);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CommandQueue {
    sender: mpsc::UnboundedSender<QueuedCommand>,
}

impl CommandQueue {
    /// Creates a queue and its receiver.
    #[must_use]
    pub fn new() -> (Self, CommandReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Returns `true` once the receiver has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl CommandSink for CommandQueue {
    fn dispatch(&self, key: &DeviceKey, command: DeviceCommand) -> Result<(), ProtocolError> {
        tracing::debug!(device = %key, %command, "Queueing command");
        self.sender
            .send(QueuedCommand {
                key: key.clone(),
                command,
            })
            .map_err(|e| ProtocolError::ChannelClosed(format!("command for {}", e.0.key)))
    }
}

/// Sink that only records what it receives.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    record: Arc<Mutex<Vec<QueuedCommand>>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything dispatched so far.
    #[must_use]
    pub fn commands(&self) -> Vec<QueuedCommand> {
        self.record.lock().clone()
    }
}

impl CommandSink for RecordingSink {
    fn dispatch(&self, key: &DeviceKey, command: DeviceCommand) -> Result<(), ProtocolError> {
        self.record.lock().push(QueuedCommand {
            key: key.clone(),
            command,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_delivers_in_order() {
        let (queue, mut rx) = CommandQueue::new();
        let key = DeviceKey::new("a");
        queue.dispatch(&key, DeviceCommand::On).unwrap();
        queue.dispatch(&key, DeviceCommand::Exact(10.0)).unwrap();

        assert_eq!(rx.recv().await.unwrap().command, DeviceCommand::On);
        assert_eq!(rx.recv().await.unwrap().command, DeviceCommand::Exact(10.0));
    }

    #[test]
    fn closed_queue_reports_error() {
        let (queue, rx) = CommandQueue::new();
        drop(rx);
        assert!(queue.is_closed());
        assert!(matches!(
            queue.dispatch(&DeviceKey::new("a"), DeviceCommand::Off),
            Err(ProtocolError::ChannelClosed(_))
        ));
    }

    #[test]
    fn recording_sink_clones_share_record() {
        let sink = RecordingSink::new();
        let observer = sink.clone();
        sink.dispatch(&DeviceKey::new("a"), DeviceCommand::WakeUp).unwrap();
        assert_eq!(
            observer.commands(),
            vec![QueuedCommand {
                key: DeviceKey::new("a"),
                command: DeviceCommand::WakeUp,
            }]
        );
    }
}
