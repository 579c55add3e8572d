//! Background collection loop
//!
//! One poller per process: fetch, sanitize, save, sleep, repeat. Every
//! error kind is caught at the cycle boundary so a bad cycle never kills
//! the loop; shutdown is cooperative and honored between cycles only.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use tempo_core::sanitize_observation;
use tempo_db::{DbClient, SaveOutcome};
use tempo_ingest::{IngestError, StationClient};

/// Poller lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Stopped,
    Running,
    Stopping,
}

/// Background poller for the remote station API
pub struct Poller {
    client: Box<dyn StationClient>,
    db: DbClient,
    poll_interval: Duration,
    empty_backoff: Duration,
    state: PollerState,
    shutdown: watch::Receiver<bool>,
}

impl Poller {
    /// Backoff after the API answered without an observation
    pub const EMPTY_BACKOFF: Duration = Duration::from_secs(300);

    pub fn new(
        client: Box<dyn StationClient>,
        db: DbClient,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            db,
            poll_interval,
            empty_backoff: Self::EMPTY_BACKOFF,
            state: PollerState::Stopped,
            shutdown,
        }
    }

    /// Override the empty-response backoff (tests run on millisecond clocks)
    pub fn with_empty_backoff(mut self, backoff: Duration) -> Self {
        self.empty_backoff = backoff;
        self
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Run the collection loop until shutdown is signaled.
    ///
    /// The signal is honored at the top of the next cycle or during a
    /// sleep, never mid-fetch.
    pub async fn run(&mut self) {
        self.state = PollerState::Running;
        info!(
            source = %self.client.name(),
            interval_secs = self.poll_interval.as_secs(),
            "poller started"
        );

        loop {
            if *self.shutdown.borrow() {
                self.state = PollerState::Stopping;
                break;
            }

            let nap = self.cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(nap) => {}
                _ = self.shutdown.changed() => {
                    self.state = PollerState::Stopping;
                    break;
                }
            }
        }

        self.state = PollerState::Stopped;
        info!("poller stopped");
    }

    /// One fetch-sanitize-save cycle. Returns how long to sleep before the
    /// next one.
    async fn cycle(&mut self) -> Duration {
        match self.client.fetch_current().await {
            Ok(raw) => match sanitize_observation(&raw) {
                Ok(obs) => match self.db.save_observation(&obs).await {
                    Ok(SaveOutcome::Inserted) => {
                        info!(
                            timestamp = obs.epoch(),
                            wind_speed = obs.wind_speed.unwrap_or(0.0),
                            wind_gust = obs.wind_gust.unwrap_or(0.0),
                            "observation saved"
                        );
                    }
                    Ok(SaveOutcome::Duplicate) => {
                        info!(timestamp = obs.epoch(), "duplicate observation, skipping");
                    }
                    Err(e) => {
                        error!(error = %e, "failed to save observation");
                    }
                },
                Err(e) => {
                    warn!(error = %e, "dropping unusable observation");
                }
            },
            Err(IngestError::EmptyResponse) => {
                warn!("no observation in API response, retrying sooner");
                return self.empty_backoff;
            }
            Err(e) => {
                error!(error = %e, "station API request failed");
            }
        }

        self.poll_interval
    }
}

// Note: loop tests with a scripted client and a real store are in
// tests/poller_tests.rs.
