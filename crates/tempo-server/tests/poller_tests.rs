use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use tempo_core::{RawObservation, RawValue};
use tempo_db::DbClient;
use tempo_ingest::{IngestError, IngestResult, StationClient};
use tempo_server::poller::{Poller, PollerState};

/// Station client fed from a fixed script; exhausted scripts answer with
/// empty responses so the loop keeps idling.
struct ScriptedClient {
    responses: Mutex<VecDeque<IngestResult<RawObservation>>>,
    fetches: Arc<AtomicUsize>,
}

impl ScriptedClient {
    fn new(responses: Vec<IngestResult<RawObservation>>) -> (Self, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let client = Self {
            responses: Mutex::new(responses.into()),
            fetches: Arc::clone(&fetches),
        };
        (client, fetches)
    }
}

#[async_trait::async_trait]
impl StationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_current(&self) -> IngestResult<RawObservation> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(IngestError::EmptyResponse))
    }
}

async fn test_db(dir: &tempfile::TempDir) -> DbClient {
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("poller.db").display());
    let db = DbClient::new(&url).await.unwrap();
    db.ensure_schema().await;
    db
}

fn raw_at(obs_time: &str) -> RawObservation {
    RawObservation {
        obs_time: obs_time.to_string(),
        wind_speed: RawValue::Float(3.0),
        temperature: RawValue::Float(22.0),
        ..Default::default()
    }
}

#[tokio::test]
async fn cycles_save_skip_duplicates_and_survive_errors() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;

    let (client, fetches) = ScriptedClient::new(vec![
        Ok(raw_at("2024-01-15T10:30:00Z")),
        Ok(raw_at("2024-01-15T10:30:00Z")), // duplicate timestamp
        Ok(raw_at("garbage")),              // malformed, dropped
        Err(IngestError::EmptyResponse),
        Ok(raw_at("2024-01-15T10:40:00Z")),
    ]);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller = Poller::new(
        Box::new(client),
        db.clone(),
        Duration::from_millis(10),
        shutdown_rx,
    )
    .with_empty_backoff(Duration::from_millis(5));

    let handle = tokio::spawn(async move {
        poller.run().await;
        poller
    });

    // Enough wall time for the whole script plus a few idle cycles
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();
    let poller = handle.await.unwrap();

    assert_eq!(poller.state(), PollerState::Stopped);
    assert!(fetches.load(Ordering::SeqCst) >= 5);
    assert_eq!(db.count_observations().await.unwrap(), 2);
}

#[tokio::test]
async fn shutdown_during_sleep_stops_without_another_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir).await;

    let (client, fetches) = ScriptedClient::new(vec![Ok(raw_at("2024-01-15T10:30:00Z"))]);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller = Poller::new(
        Box::new(client),
        db.clone(),
        Duration::from_secs(600),
        shutdown_rx,
    );

    let handle = tokio::spawn(async move {
        poller.run().await;
        poller
    });

    // First cycle completes, then the poller sits in its interval sleep
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();
    let poller = handle.await.unwrap();

    assert_eq!(poller.state(), PollerState::Stopped);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(db.count_observations().await.unwrap(), 1);
}
