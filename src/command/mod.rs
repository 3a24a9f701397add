// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device commands.
//!
//! Fibaro clients invoke actions by name (`turnOn`, `setValue`, ...) with up
//! to four positional string arguments. [`DeviceCommand::from_action`] turns
//! such a call into a typed command which a [`CommandSink`] forwards to the
//! device subsystem.
//!
//! # Supported Actions
//!
//! | Action | Command | Arguments |
//! |--------|---------|-----------|
//! | `turnOn` | [`DeviceCommand::On`] | - |
//! | `turnOff` | [`DeviceCommand::Off`] | - |
//! | `setValue`, `setTargetLevel` | [`DeviceCommand::Exact`] | level |
//! | `setColor` | [`DeviceCommand::Color`] | red, green, blue (white ignored) |
//! | `wakeUpDeadDevice` | [`DeviceCommand::WakeUp`] | - |
//!
//! # Examples
//!
//! ```
//! use fibaro_bridge::command::DeviceCommand;
//! use fibaro_bridge::types::RgbColor;
//!
//! let cmd = DeviceCommand::from_action("setValue", &[Some("42")]).unwrap();
//! assert_eq!(cmd, DeviceCommand::Exact(42.0));
//! assert_eq!(cmd.zway_name(), Some("exact"));
//!
//! let cmd = DeviceCommand::from_action("setColor", &[Some("255"), Some("0"), Some("8"), Some("0")])
//!     .unwrap();
//! assert_eq!(cmd, DeviceCommand::Color(RgbColor::new(255, 0, 8)));
//! ```

mod sink;

pub use sink::{CommandQueue, CommandReceiver, CommandSink, QueuedCommand, RecordingSink};

use std::fmt;

use crate::error::ValueError;
use crate::types::{RgbColor, format_number};

/// A typed command for a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceCommand {
    /// Switch on.
    On,
    /// Switch off.
    Off,
    /// Set a level (dimmer position, setpoint).
    Exact(f64),
    /// Set a color.
    Color(RgbColor),
    /// Ping a sleeping or failed mesh node.
    WakeUp,
}

impl DeviceCommand {
    /// Parses a Fibaro action call.
    ///
    /// `args` holds `arg1`, `arg2`, ... in order; missing arguments are
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnknownAction` for unsupported action names and
    /// `ValueError::InvalidArgument` for missing or unparsable arguments.
    pub fn from_action(name: &str, args: &[Option<&str>]) -> Result<Self, ValueError> {
        let arg = |index: usize| args.get(index).copied().flatten();

        match name {
            "turnOn" => Ok(Self::On),
            "turnOff" => Ok(Self::Off),
            "setValue" | "setTargetLevel" => parse_level(arg(0)).map(Self::Exact),
            "setColor" => RgbColor::from_args(arg(0), arg(1), arg(2)).map(Self::Color),
            "wakeUpDeadDevice" => Ok(Self::WakeUp),
            other => Err(ValueError::UnknownAction(other.to_string())),
        }
    }

    /// Z-Way automation command name, `None` for mesh-level commands.
    #[must_use]
    pub const fn zway_name(&self) -> Option<&'static str> {
        match self {
            Self::On => Some("on"),
            Self::Off => Some("off"),
            Self::Exact(_) | Self::Color(_) => Some("exact"),
            Self::WakeUp => None,
        }
    }

    /// Z-Way automation command parameters.
    #[must_use]
    pub fn zway_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Exact(level) => vec![("level", format_number(*level))],
            Self::Color(color) => vec![
                ("red", color.red().to_string()),
                ("green", color.green().to_string()),
                ("blue", color.blue().to_string()),
            ],
            Self::On | Self::Off | Self::WakeUp => Vec::new(),
        }
    }

    /// Returns `true` for commands addressed to the mesh node rather than
    /// the virtual device.
    #[must_use]
    pub const fn is_mesh_command(&self) -> bool {
        matches!(self, Self::WakeUp)
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Exact(level) => write!(f, "exact({})", format_number(*level)),
            Self::Color(color) => write!(f, "color({color})"),
            Self::WakeUp => f.write_str("wakeup"),
        }
    }
}

fn parse_level(raw: Option<&str>) -> Result<f64, ValueError> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValueError::InvalidArgument {
            name: "arg1".to_string(),
            value: raw.map(ToString::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_actions() {
        assert_eq!(DeviceCommand::from_action("turnOn", &[]), Ok(DeviceCommand::On));
        assert_eq!(
            DeviceCommand::from_action("turnOff", &[None]),
            Ok(DeviceCommand::Off)
        );
    }

    #[test]
    fn level_actions() {
        assert_eq!(
            DeviceCommand::from_action("setTargetLevel", &[Some("21.5")]),
            Ok(DeviceCommand::Exact(21.5))
        );
        assert_eq!(
            DeviceCommand::from_action("setValue", &[Some(" 99 ")]),
            Ok(DeviceCommand::Exact(99.0))
        );
    }

    #[test]
    fn level_requires_number() {
        assert_eq!(
            DeviceCommand::from_action("setValue", &[Some("bright")]),
            Err(ValueError::InvalidArgument {
                name: "arg1".to_string(),
                value: Some("bright".to_string()),
            })
        );
        assert!(DeviceCommand::from_action("setValue", &[]).is_err());
        assert!(DeviceCommand::from_action("setValue", &[Some("NaN")]).is_err());
    }

    #[test]
    fn color_requires_three_channels() {
        assert!(DeviceCommand::from_action("setColor", &[Some("1"), Some("2")]).is_err());
    }

    #[test]
    fn unknown_action() {
        assert_eq!(
            DeviceCommand::from_action("startProgram", &[Some("1")]),
            Err(ValueError::UnknownAction("startProgram".to_string()))
        );
    }

    #[test]
    fn zway_mapping() {
        assert_eq!(DeviceCommand::On.zway_name(), Some("on"));
        assert!(DeviceCommand::On.zway_params().is_empty());
        assert_eq!(
            DeviceCommand::Exact(50.0).zway_params(),
            vec![("level", "50".to_string())]
        );
        assert_eq!(
            DeviceCommand::Color(RgbColor::new(1, 2, 3)).zway_params(),
            vec![
                ("red", "1".to_string()),
                ("green", "2".to_string()),
                ("blue", "3".to_string())
            ]
        );
        assert_eq!(DeviceCommand::WakeUp.zway_name(), None);
        assert!(DeviceCommand::WakeUp.is_mesh_command());
    }

    #[test]
    fn display() {
        assert_eq!(DeviceCommand::Exact(30.0).to_string(), "exact(30)");
        assert_eq!(
            DeviceCommand::Color(RgbColor::new(255, 0, 0)).to_string(),
            "color(#FF0000)"
        );
    }
}
