//! Observation types shared across the workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type (Unix epoch seconds)
pub type Timestamp = i64;

/// A loosely-typed scalar as delivered by the remote station API.
///
/// The upstream feed mixes numbers, quoted numbers and nulls for the same
/// fields depending on station firmware, so coercion happens downstream in
/// the sanitizer rather than at deserialization time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Null,
}

impl RawValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Float(v) => Some(*v),
            RawValue::Integer(v) => Some(*v as f64),
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            RawValue::Null => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Integer(v) => Some(*v),
            RawValue::Float(v) => Some(*v as i64),
            RawValue::Text(s) => s.trim().parse::<i64>().ok(),
            RawValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Null
    }
}

/// One raw reading as assembled from the remote API response, before
/// sanitization. Field names follow the upstream feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawObservation {
    /// ISO-8601 observation time string, exactly as received
    pub obs_time: String,

    pub wind_dir: RawValue,
    pub humidity: RawValue,
    pub solar_radiation: RawValue,
    pub uv: RawValue,

    // Fields from the metric_si block
    pub temperature: RawValue,
    pub pressure: RawValue,
    pub wind_speed: RawValue,
    pub wind_gust: RawValue,
    pub precip_rate: RawValue,
}

/// One sanitized weather reading at a single instant.
///
/// The timestamp is the natural key; everything else is optional. Wind
/// speeds are in knots after conversion from the source m/s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,

    pub wind_dir: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<i64>,
    pub solar_radiation: Option<f64>,
    pub uv: Option<f64>,
    pub precip_rate: Option<f64>,
}

impl Observation {
    /// Unix epoch seconds of the observation instant
    pub fn epoch(&self) -> Timestamp {
        self.timestamp.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_coercions() {
        assert_eq!(RawValue::Float(25.5).as_f64(), Some(25.5));
        assert_eq!(RawValue::Integer(42).as_f64(), Some(42.0));
        assert_eq!(RawValue::Text("3.25".into()).as_f64(), Some(3.25));
        assert_eq!(RawValue::Text("abc".into()).as_f64(), None);
        assert_eq!(RawValue::Null.as_f64(), None);

        assert_eq!(RawValue::Integer(180).as_i64(), Some(180));
        assert_eq!(RawValue::Float(180.7).as_i64(), Some(180));
        assert!(RawValue::Null.is_null());
    }

    #[test]
    fn raw_value_deserializes_untagged() {
        let v: RawValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(v, RawValue::Float(12.5));

        let v: RawValue = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(v, RawValue::Text("12.5".into()));

        let v: RawValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, RawValue::Null);
    }
}
