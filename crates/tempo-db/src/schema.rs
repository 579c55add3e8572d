//! Persisted observation schema
//!
//! Column names stay camelCase on the wire side of the table so a row can
//! be served back without renaming gymnastics.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted observation row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ObservationRow {
    /// Observation instant (Unix epoch seconds, unique)
    #[sqlx(rename = "dateTime")]
    pub date_time: i64,

    #[sqlx(rename = "windDir")]
    pub wind_dir: Option<i64>,

    #[sqlx(rename = "windSpeed")]
    pub wind_speed: Option<f64>,

    #[sqlx(rename = "windGust")]
    pub wind_gust: Option<f64>,

    pub pressure: Option<f64>,

    pub temp: Option<f64>,

    pub humidity: Option<i64>,

    #[sqlx(rename = "solarRadiation")]
    pub solar_radiation: Option<f64>,

    pub uv: Option<f64>,

    #[sqlx(rename = "precipRate")]
    pub precip_rate: Option<f64>,

    /// Instant the row was persisted (Unix epoch seconds, informational)
    #[sqlx(rename = "ingestedAt")]
    pub ingested_at: i64,
}

/// Table names
pub mod tables {
    pub const OBSERVATIONS: &str = "weather_observations";
}

/// Idempotent schema DDL. No migrations; the table either exists or is
/// created here at startup.
pub const CREATE_OBSERVATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weather_observations (
    dateTime        INTEGER NOT NULL,
    windDir         INTEGER,
    windSpeed       REAL,
    windGust        REAL,
    pressure        REAL,
    temp            REAL,
    humidity        INTEGER,
    solarRadiation  REAL,
    uv              REAL,
    precipRate      REAL,
    ingestedAt      INTEGER NOT NULL
)
"#;

pub const CREATE_OBSERVATIONS_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_weather_observations_dateTime
    ON weather_observations (dateTime)
"#;
