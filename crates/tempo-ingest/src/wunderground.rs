//! Weather Underground PWS observations client

use crate::{IngestError, IngestResult, StationClient};
use serde::Deserialize;
use std::time::Duration;
use tempo_core::{RawObservation, RawValue};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.weather.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the PWS "current observations" endpoint
#[derive(Clone)]
pub struct WundergroundClient {
    client: reqwest::Client,
    api_key: String,
    station_id: String,
    base_url: String,
}

/// Wire shape of the API response. Numeric fields arrive as numbers,
/// quoted numbers or nulls depending on station firmware, so they
/// deserialize as `RawValue` and coercion is left to the sanitizer.
#[derive(Debug, Deserialize)]
pub struct PwsResponse {
    #[serde(default)]
    pub observations: Vec<PwsObservation>,
}

#[derive(Debug, Deserialize)]
pub struct PwsObservation {
    #[serde(rename = "obsTimeLocal")]
    pub obs_time_local: Option<String>,

    #[serde(default)]
    pub winddir: RawValue,

    #[serde(default)]
    pub humidity: RawValue,

    #[serde(rename = "solarRadiation", default)]
    pub solar_radiation: RawValue,

    #[serde(default)]
    pub uv: RawValue,

    #[serde(rename = "metric_si", default)]
    pub metric: PwsMetric,
}

/// The `metric_si` block (`units=s`): SI units, wind in m/s
#[derive(Debug, Default, Deserialize)]
pub struct PwsMetric {
    #[serde(default)]
    pub temp: RawValue,

    #[serde(default)]
    pub pressure: RawValue,

    #[serde(rename = "windSpeed", default)]
    pub wind_speed: RawValue,

    #[serde(rename = "windGust", default)]
    pub wind_gust: RawValue,

    #[serde(rename = "precipRate", default)]
    pub precip_rate: RawValue,
}

impl PwsObservation {
    /// Flatten the wire shape into the sanitizer's input. An absent
    /// observation time becomes the empty string, which the sanitizer
    /// rejects as malformed.
    pub fn into_raw(self) -> RawObservation {
        RawObservation {
            obs_time: self.obs_time_local.unwrap_or_default(),
            wind_dir: self.winddir,
            humidity: self.humidity,
            solar_radiation: self.solar_radiation,
            uv: self.uv,
            temperature: self.metric.temp,
            pressure: self.metric.pressure,
            wind_speed: self.metric.wind_speed,
            wind_gust: self.metric.wind_gust,
            precip_rate: self.metric.precip_rate,
        }
    }
}

/// Pull the single current observation out of a decoded response
pub fn first_observation(response: PwsResponse) -> IngestResult<RawObservation> {
    response
        .observations
        .into_iter()
        .next()
        .map(PwsObservation::into_raw)
        .ok_or(IngestError::EmptyResponse)
}

impl WundergroundClient {
    pub fn new(api_key: impl Into<String>, station_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            station_id: station_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (for testing)
    pub fn with_base_url(
        api_key: impl Into<String>,
        station_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            station_id: station_id.into(),
            base_url: base_url.into(),
        }
    }

    fn observations_url(&self) -> String {
        format!(
            "{}/v2/pws/observations/current?stationId={}&format=json&units=s&numericPrecision=decimal&apiKey={}",
            self.base_url, self.station_id, self.api_key
        )
    }
}

#[async_trait::async_trait]
impl StationClient for WundergroundClient {
    fn name(&self) -> &str {
        "wunderground"
    }

    async fn fetch_current(&self) -> IngestResult<RawObservation> {
        let response = self
            .client
            .get(self.observations_url())
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::Status(status.as_u16()));
        }

        let body: PwsResponse = response
            .json()
            .await
            .map_err(|e| IngestError::Decode(e.to_string()))?;

        debug!(station = %self.station_id, "fetched current observation");
        first_observation(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"
    {
        "observations": [
            {
                "stationID": "IRIODE146",
                "obsTimeUtc": "2024-01-15T13:30:00Z",
                "obsTimeLocal": "2024-01-15 10:30:00",
                "winddir": 180,
                "humidity": 70,
                "solarRadiation": 512.4,
                "uv": 6.0,
                "metric_si": {
                    "temp": 24.1,
                    "pressure": 1013.2,
                    "windSpeed": 3.0,
                    "windGust": "4.5",
                    "precipRate": 0.0,
                    "elev": 10
                }
            }
        ]
    }
    "#;

    #[test]
    fn decodes_current_observation() {
        let response: PwsResponse = serde_json::from_str(SAMPLE_RESPONSE).unwrap();
        let raw = first_observation(response).unwrap();

        assert_eq!(raw.obs_time, "2024-01-15 10:30:00");
        assert_eq!(raw.wind_dir.as_i64(), Some(180));
        assert_eq!(raw.temperature.as_f64(), Some(24.1));
        assert_eq!(raw.wind_speed.as_f64(), Some(3.0));
        // Quoted numbers survive as text until the sanitizer coerces them
        assert_eq!(raw.wind_gust, RawValue::Text("4.5".into()));
    }

    #[test]
    fn empty_observations_is_an_empty_response() {
        let response: PwsResponse = serde_json::from_str(r#"{"observations": []}"#).unwrap();
        let err = first_observation(response).unwrap_err();
        assert!(matches!(err, IngestError::EmptyResponse));
    }

    #[test]
    fn missing_fields_default_to_null() {
        let body = r#"{"observations": [{"obsTimeLocal": "2024-01-15 10:30:00"}]}"#;
        let response: PwsResponse = serde_json::from_str(body).unwrap();
        let raw = first_observation(response).unwrap();

        assert!(raw.uv.is_null());
        assert!(raw.wind_speed.is_null());
    }

    #[test]
    fn missing_observation_time_becomes_empty_string() {
        let body = r#"{"observations": [{"winddir": 90}]}"#;
        let response: PwsResponse = serde_json::from_str(body).unwrap();
        let raw = first_observation(response).unwrap();

        assert_eq!(raw.obs_time, "");
    }

    #[test]
    fn url_carries_station_and_credential() {
        let client = WundergroundClient::with_base_url("secret", "IRIODE146", "http://localhost:1");
        let url = client.observations_url();

        assert!(url.starts_with("http://localhost:1/v2/pws/observations/current"));
        assert!(url.contains("stationId=IRIODE146"));
        assert!(url.contains("apiKey=secret"));
        assert!(url.contains("units=s"));
    }
}
