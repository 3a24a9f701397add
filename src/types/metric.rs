// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Metric values reported by the device subsystem.

use std::collections::BTreeMap;

use serde_json::Value;

use super::RgbColor;

/// A single metric value.
///
/// Z-Way metrics are loosely typed: switch levels are the strings `"on"` and
/// `"off"`, dimmers and sensors report numbers, color controllers report
/// `{r, g, b}` records and composite sensors (weather) report nested records.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// A numeric reading.
    Number(f64),
    /// A JSON boolean.
    Flag(bool),
    /// A string, including the boolean-like `"on"` / `"off"` levels.
    Text(String),
    /// An RGB record.
    Color(RgbColor),
    /// Any other structured record.
    Record(BTreeMap<String, MetricValue>),
}

impl MetricValue {
    /// Converts a JSON value, mapping `null` to `None`.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Flag(b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s)),
            Value::Array(items) => Some(Self::Record(
                items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, v)| Self::from_json(v).map(|m| (i.to_string(), m)))
                    .collect(),
            )),
            Value::Object(map) => {
                match serde_json::from_value::<RgbColor>(Value::Object(map.clone())) {
                    Ok(color) => Some(Self::Color(color)),
                    Err(_) => Some(Self::Record(
                        map.into_iter()
                            .filter_map(|(k, v)| Self::from_json(v).map(|m| (k, m)))
                            .collect(),
                    )),
                }
            }
        }
    }

    /// Returns `true` only for the "on" state of a boolean-like metric.
    #[must_use]
    pub fn is_on(&self) -> bool {
        match self {
            Self::Text(s) => s == "on",
            Self::Flag(b) => *b,
            _ => false,
        }
    }

    /// Returns the numeric reading, accepting numeric strings.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the string content of a text metric.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a nested field of a record metric.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&MetricValue> {
        match self {
            Self::Record(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Renders the value in the external string representation.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Flag(b) => String::from(if *b { "1" } else { "0" }),
            Self::Text(s) => s.clone(),
            Self::Color(c) => c.to_wire(),
            Self::Record(_) => self.to_json().to_string(),
        }
    }

    /// Converts back into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Flag(b) => Value::Bool(*b),
            Self::Text(s) => Value::String(s.clone()),
            Self::Color(c) => serde_json::to_value(c).unwrap_or(Value::Null),
            Self::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Formats a number the way clients expect: integral values without a
/// fractional part.
#[must_use]
pub fn format_number(n: f64) -> String {
    // f64's Display already prints 22.0 as "22".
    n.to_string()
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for MetricValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<RgbColor> for MetricValue {
    fn from(value: RgbColor) -> Self {
        Self::Color(value)
    }
}

/// The open-ended metric bag of an internal device.
///
/// # Examples
///
/// ```
/// use fibaro_bridge::types::Metrics;
///
/// let metrics = Metrics::new().with("level", "on").with("title", "Lamp");
/// assert!(metrics.level().is_some_and(|l| l.is_on()));
/// assert_eq!(metrics.title(), Some("Lamp"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct Metrics(BTreeMap<String, MetricValue>);

impl Metrics {
    /// Creates an empty metric bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a metric.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Adds or replaces a metric in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetricValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the named metric.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    /// The primary reading (`level`).
    #[must_use]
    pub fn level(&self) -> Option<&MetricValue> {
        self.get("level")
    }

    /// The display name (`title`).
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(MetricValue::as_text)
    }

    /// The unit label of a sensor (`scaleTitle`).
    #[must_use]
    pub fn scale_title(&self) -> Option<&str> {
        self.get("scaleTitle").and_then(MetricValue::as_text)
    }

    /// The vendor icon hint (`icon`).
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.get("icon").and_then(MetricValue::as_text)
    }

    /// The RGB record of a color controller (`color`).
    #[must_use]
    pub fn color(&self) -> Option<RgbColor> {
        match self.get("color") {
            Some(MetricValue::Color(c)) => Some(*c),
            _ => None,
        }
    }
}

impl From<BTreeMap<String, Value>> for Metrics {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(k, v)| MetricValue::from_json(v).map(|m| (k, m)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_formatting_drops_integral_fraction() {
        assert_eq!(MetricValue::Number(22.0).to_wire(), "22");
        assert_eq!(MetricValue::Number(21.5).to_wire(), "21.5");
        assert_eq!(MetricValue::Number(-3.0).to_wire(), "-3");
    }

    #[test]
    fn boolean_like_levels() {
        assert!(MetricValue::from("on").is_on());
        assert!(!MetricValue::from("off").is_on());
        assert!(MetricValue::Flag(true).is_on());
        assert!(!MetricValue::Number(1.0).is_on());
        assert_eq!(MetricValue::Flag(false).to_wire(), "0");
    }

    #[test]
    fn json_conversion_detects_colors_and_records() {
        let color = MetricValue::from_json(serde_json::json!({"r": 1, "g": 2, "b": 3}));
        assert_eq!(color, Some(MetricValue::Color(RgbColor::new(1, 2, 3))));

        let weather = MetricValue::from_json(serde_json::json!({
            "main": {"temp": 12.5, "humidity": 80},
            "wind": {"speed": 3}
        }))
        .unwrap();
        let humidity = weather
            .field("main")
            .and_then(|m| m.field("humidity"))
            .and_then(MetricValue::as_number);
        assert_eq!(humidity, Some(80.0));
    }

    #[test]
    fn null_metrics_are_absent() {
        let metrics: Metrics =
            serde_json::from_str(r#"{"level": null, "title": "Sensor"}"#).unwrap();
        assert!(metrics.level().is_none());
        assert_eq!(metrics.title(), Some("Sensor"));
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(MetricValue::from("42").as_number(), Some(42.0));
        assert_eq!(MetricValue::from("on").as_number(), None);
    }

    #[test]
    fn metrics_accessors() {
        let metrics = Metrics::new()
            .with("scaleTitle", "Lux")
            .with("icon", "door")
            .with("color", RgbColor::new(9, 8, 7));
        assert_eq!(metrics.scale_title(), Some("Lux"));
        assert_eq!(metrics.icon(), Some("door"));
        assert_eq!(metrics.color(), Some(RgbColor::new(9, 8, 7)));
        assert!(metrics.level().is_none());
    }
}
