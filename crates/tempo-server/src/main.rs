//! tempod - station collection daemon and read API
//!
//! This binary coordinates:
//! - Background polling of the remote station API
//! - Observation persistence
//! - The read-only HTTP query API

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use tempo_db::DbClient;
use tempo_ingest::WundergroundClient;
use tempo_server::{build_app, poller::Poller, prune_expired, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tempo_telemetry::init("tempod");

    let config = ServerConfig::from_env()?;
    info!(
        station = %config.station_id,
        poll_interval = config.poll_interval,
        "starting tempod"
    );

    let db = DbClient::new(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    db.ping().await.context("Database ping failed")?;
    db.ensure_schema().await;

    match db.count_observations().await {
        Ok(count) => info!(count, "observation store ready"),
        Err(e) => warn!(error = %e, "could not count stored observations"),
    }

    match prune_expired(&db, config.retention_days).await {
        Ok(deleted) if deleted > 0 => info!(deleted, "pruned expired observations"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "retention pruning failed"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let poller_handle = if config.has_credential() {
        let client = WundergroundClient::new(&config.api_key, &config.station_id);
        let mut poller = Poller::new(
            Box::new(client),
            db.clone(),
            Duration::from_secs(config.poll_interval),
            shutdown_rx,
        );
        Some(tokio::spawn(async move { poller.run().await }))
    } else {
        warn!("WEATHER_API_KEY not set, poller disabled");
        None
    };

    let (app, _state) = build_app(db);

    let listener = TcpListener::bind(&config.http_bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.http_bind))?;
    info!(addr = %config.http_bind, "HTTP server listening");

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.context("server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = poller_handle {
        if let Err(e) = handle.await {
            error!(error = %e, "poller task panicked");
        }
    }

    info!("tempod stopped");
    Ok(())
}
