// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type shared by color controller metrics and color commands.

use std::fmt;

use crate::error::ValueError;

/// RGB color with 8-bit channels (0-255).
///
/// Z-Way reports colors as `{"r": .., "g": .., "b": ..}` records. Fibaro
/// clients expect an RGBW quadruple; the source has no white channel so the
/// wire form always carries `0` in fourth position.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::types::RgbColor;
///
/// let color = RgbColor::new(255, 128, 0);
/// assert_eq!(color.to_wire(), "255,128,0,0");
///
/// let parsed: RgbColor = serde_json::from_str(r#"{"r":10,"g":20,"b":30}"#).unwrap();
/// assert_eq!(parsed.green(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    #[serde(rename = "r")]
    red: u8,
    #[serde(rename = "g")]
    green: u8,
    #[serde(rename = "b")]
    blue: u8,
}

impl RgbColor {
    /// White channel value reported to clients.
    pub const WHITE_CHANNEL: u8 = 0;

    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses the `arg1..arg3` triple of a `setColor` action.
    ///
    /// A fourth (white) argument may be present on the wire; it is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidArgument` naming the first missing or
    /// out-of-range channel.
    pub fn from_args(
        red: Option<&str>,
        green: Option<&str>,
        blue: Option<&str>,
    ) -> Result<Self, ValueError> {
        Ok(Self::new(
            parse_channel("arg1", red)?,
            parse_channel("arg2", green)?,
            parse_channel("arg3", blue)?,
        ))
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the Fibaro `r,g,b,w` representation.
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!(
            "{},{},{},{}",
            self.red,
            self.green,
            self.blue,
            Self::WHITE_CHANNEL
        )
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

fn parse_channel(name: &str, raw: Option<&str>) -> Result<u8, ValueError> {
    raw.and_then(|v| v.trim().parse::<u8>().ok())
        .ok_or_else(|| ValueError::InvalidArgument {
            name: name.to_string(),
            value: raw.map(ToString::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_pins_white_to_zero() {
        assert_eq!(RgbColor::new(1, 2, 3).to_wire(), "1,2,3,0");
        assert_eq!(RgbColor::default().to_wire(), "0,0,0,0");
    }

    #[test]
    fn display_as_hex() {
        assert_eq!(RgbColor::new(255, 128, 0).to_string(), "#FF8000");
    }

    #[test]
    fn deserialize_zway_record() {
        let color: RgbColor = serde_json::from_str(r#"{"r":255,"g":0,"b":64}"#).unwrap();
        assert_eq!(color, RgbColor::new(255, 0, 64));
    }

    #[test]
    fn deserialize_rejects_out_of_range_channel() {
        assert!(serde_json::from_str::<RgbColor>(r#"{"r":256,"g":0,"b":0}"#).is_err());
    }

    #[test]
    fn from_args_parses_channels() {
        let color = RgbColor::from_args(Some("10"), Some("20"), Some("30")).unwrap();
        assert_eq!(color, RgbColor::new(10, 20, 30));
    }

    #[test]
    fn from_args_reports_bad_channel() {
        let err = RgbColor::from_args(Some("10"), Some("300"), Some("30")).unwrap_err();
        assert_eq!(
            err,
            ValueError::InvalidArgument {
                name: "arg2".to_string(),
                value: Some("300".to_string()),
            }
        );

        let err = RgbColor::from_args(Some("10"), Some("20"), None).unwrap_err();
        assert!(matches!(err, ValueError::InvalidArgument { value: None, .. }));
    }
}
