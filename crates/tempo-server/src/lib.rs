//! HTTP read API and query façade
//!
//! Handlers never fail outright: every response is a well-formed JSON
//! envelope with an explicit `status`, and storage faults surface as the
//! operation's empty default plus a message.

pub mod config;
pub mod downsample;
pub mod poller;

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use tempo_db::{DbClient, DbResult, ObservationRow};

pub use config::ServerConfig;
pub use poller::{Poller, PollerState};

pub struct AppState {
    pub db: DbClient,
}

pub fn build_app(db: DbClient) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState { db });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/api/station/history", get(station_history))
        .route("/api/station/now", get(station_now))
        .route("/health", get(health))
        .layer(cors)
        .with_state(Arc::clone(&state));

    (router, state)
}

/// One observation as served to clients
#[derive(Debug, Clone, Serialize)]
pub struct ObservationDto {
    #[serde(rename = "obsTimeLocal")]
    pub obs_time_local: String,

    /// Unix epoch seconds
    pub timestamp: i64,

    pub winddir: Option<i64>,

    #[serde(rename = "windSpeed")]
    pub wind_speed: Option<f64>,

    #[serde(rename = "windGust")]
    pub wind_gust: Option<f64>,

    pub pressure: Option<f64>,

    pub temp: Option<f64>,

    pub humidity: Option<i64>,

    #[serde(rename = "solarRadiation")]
    pub solar_radiation: Option<f64>,

    pub uv: Option<f64>,

    #[serde(rename = "precipRate")]
    pub precip_rate: Option<f64>,
}

impl From<ObservationRow> for ObservationDto {
    fn from(row: ObservationRow) -> Self {
        let obs_time_local = DateTime::<Utc>::from_timestamp(row.date_time, 0)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();

        Self {
            obs_time_local,
            timestamp: row.date_time,
            winddir: row.wind_dir,
            wind_speed: row.wind_speed,
            wind_gust: row.wind_gust,
            pressure: row.pressure,
            temp: row.temp,
            humidity: row.humidity,
            solar_radiation: row.solar_radiation,
            uv: row.uv,
            precip_rate: row.precip_rate,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Number of samples to return
    #[serde(default = "default_count")]
    pub n: u32,

    /// Collection cycles between two returned samples
    #[serde(default = "default_stride")]
    pub interval: u32,
}

fn default_count() -> u32 {
    15
}

fn default_stride() -> u32 {
    36
}

/// The last `n` samples taken `interval` collection cycles apart
async fn station_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Json<Value> {
    let fetch = i64::from(params.n) * i64::from(params.interval);

    match state.db.latest_observations(fetch).await {
        Ok(rows) if rows.is_empty() => Json(json!({
            "status": "error",
            "message": "No data available in database yet",
            "observations": [],
        })),
        Ok(rows) => {
            let sampled =
                downsample::stride_tail(rows, params.interval as usize, params.n as usize);
            let observations: Vec<ObservationDto> =
                sampled.into_iter().map(ObservationDto::from).collect();

            Json(json!({
                "status": "success",
                "count": observations.len(),
                "source": "database",
                "observations": observations,
            }))
        }
        Err(e) => Json(json!({
            "status": "error",
            "message": e.to_string(),
            "observations": [],
        })),
    }
}

/// The most recent stored observation
async fn station_now(State(state): State<Arc<AppState>>) -> Json<Value> {
    match state.db.most_recent_observation().await {
        Ok(Some(row)) => Json(json!({
            "status": "success",
            "observation": ObservationDto::from(row),
        })),
        Ok(None) => Json(json!({
            "status": "error",
            "message": "No data available yet",
            "observation": null,
        })),
        Err(e) => Json(json!({
            "status": "error",
            "message": e.to_string(),
            "observation": null,
        })),
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Delete observations older than the retention window. Maintenance
/// operation; callers decide when it runs.
pub async fn prune_expired(db: &DbClient, retention_days: i64) -> DbResult<u64> {
    let cutoff = (Utc::now() - chrono::Duration::days(retention_days)).timestamp();
    db.delete_observations_before(cutoff).await
}
