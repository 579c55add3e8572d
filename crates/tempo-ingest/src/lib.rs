//! Remote station API client
//!
//! Fetches the current observation for one station from the remote weather
//! API. The `StationClient` trait is the seam the poller runs against;
//! `WundergroundClient` is the production implementation.

pub mod wunderground;

pub use wunderground::*;

use tempo_core::RawObservation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status from station API: {0}")]
    Status(u16),

    #[error("No observation in API response")]
    EmptyResponse,

    #[error("Malformed API response: {0}")]
    Decode(String),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// A source of current station observations
#[async_trait::async_trait]
pub trait StationClient: Send + Sync {
    /// Client name/identifier
    fn name(&self) -> &str;

    /// Fetch the station's current raw observation
    async fn fetch_current(&self) -> IngestResult<RawObservation>;
}
