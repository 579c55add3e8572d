//! Raw field sanitization
//!
//! Converts a `RawObservation` into a canonical `Observation`. Per-field
//! coercion failures degrade to null; only an unparsable timestamp rejects
//! the whole record.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::types::{Observation, RawObservation, RawValue};
use crate::units::mps_to_knots;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Malformed observation timestamp: {0:?}")]
    MalformedTimestamp(String),
}

/// Coerce a raw value to a non-negative number.
///
/// Null and unparsable input become `None`; negative readings clamp to 0.
/// Applied to every magnitude field (wind, radiation, UV, precipitation).
pub fn safe_value(raw: &RawValue) -> Option<f64> {
    raw.as_f64().map(|v| v.max(0.0))
}

/// Coerce a raw value to a number without clamping.
///
/// Used for signed quantities (temperature) and pressure, where negative
/// values are meaningful.
pub fn numeric_value(raw: &RawValue) -> Option<f64> {
    raw.as_f64()
}

/// Parse the upstream observation time into a UTC instant.
///
/// Accepts RFC 3339 with a trailing `Z` or numeric offset, and the naive
/// `YYYY-MM-DD[T ]HH:MM:SS` forms some station firmwares emit, which are
/// taken as UTC.
pub fn parse_observation_time(raw: &str) -> Result<DateTime<Utc>, SanitizeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    Err(SanitizeError::MalformedTimestamp(raw.to_string()))
}

/// Sanitize one raw reading into a canonical observation.
///
/// A missing wind speed or gust is treated as 0 m/s before conversion, so
/// the stored value is 0.0 rather than null. Long-standing feed behavior;
/// consumers rely on the series being gap-free for wind.
pub fn sanitize_observation(raw: &RawObservation) -> Result<Observation, SanitizeError> {
    let timestamp = parse_observation_time(&raw.obs_time)?;

    let wind_speed_mps = safe_value(&raw.wind_speed).unwrap_or(0.0);
    let wind_gust_mps = safe_value(&raw.wind_gust).unwrap_or(0.0);

    Ok(Observation {
        timestamp,
        wind_dir: raw.wind_dir.as_i64(),
        wind_speed: Some(mps_to_knots(wind_speed_mps)),
        wind_gust: Some(mps_to_knots(wind_gust_mps)),
        pressure: numeric_value(&raw.pressure),
        temperature: numeric_value(&raw.temperature),
        humidity: raw.humidity.as_i64(),
        solar_radiation: safe_value(&raw.solar_radiation),
        uv: safe_value(&raw.uv),
        precip_rate: safe_value(&raw.precip_rate),
    })
}
