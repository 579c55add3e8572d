//! Store operations for the observations table

use crate::schema::ObservationRow;
use crate::{DbClient, DbResult};
use sqlx::Row;
use tempo_core::Observation;
use tracing::{debug, instrument, warn};

/// Outcome of a `save_observation` call. A duplicate timestamp is a normal,
/// loggable result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Duplicate,
}

impl DbClient {
    /// Create the observations table and unique timestamp index if absent.
    ///
    /// A denied DDL statement downgrades to a warning: restricted
    /// deployments provision the schema out of band, and startup must not
    /// fail on that account.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) {
        for ddl in [
            crate::schema::CREATE_OBSERVATIONS_TABLE,
            crate::schema::CREATE_OBSERVATIONS_INDEX,
        ] {
            if let Err(e) = sqlx::query(ddl).execute(self.pool()).await {
                warn!(error = %e, "schema creation failed, assuming it already exists");
                return;
            }
        }
        debug!("observation schema ensured");
    }

    /// Insert a single observation keyed by its timestamp.
    ///
    /// Atomic per timestamp: the unique index resolves concurrent saves of
    /// the same instant to exactly one row, and the loser sees `Duplicate`.
    #[instrument(skip(self, obs))]
    pub async fn save_observation(&self, obs: &Observation) -> DbResult<SaveOutcome> {
        let ingested_at = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO weather_observations (
                dateTime, windDir, windSpeed, windGust,
                pressure, temp, humidity,
                solarRadiation, uv, precipRate,
                ingestedAt
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(dateTime) DO NOTHING
            "#,
        )
        .bind(obs.epoch())
        .bind(obs.wind_dir)
        .bind(obs.wind_speed)
        .bind(obs.wind_gust)
        .bind(obs.pressure)
        .bind(obs.temperature)
        .bind(obs.humidity)
        .bind(obs.solar_radiation)
        .bind(obs.uv)
        .bind(obs.precip_rate)
        .bind(ingested_at)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            debug!("duplicate observation for timestamp {}", obs.epoch());
            Ok(SaveOutcome::Duplicate)
        } else {
            debug!("inserted observation for timestamp {}", obs.epoch());
            Ok(SaveOutcome::Inserted)
        }
    }

    /// Get the `n` most recent observations, ascending by timestamp.
    ///
    /// Walks the timestamp index backwards and reverses in memory, so the
    /// cost is bounded by `n`, not by table size.
    #[instrument(skip(self))]
    pub async fn latest_observations(&self, n: i64) -> DbResult<Vec<ObservationRow>> {
        let mut rows = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT * FROM weather_observations
            ORDER BY dateTime DESC
            LIMIT ?
            "#,
        )
        .bind(n)
        .fetch_all(self.pool())
        .await?;

        rows.reverse();

        debug!("retrieved {} of {} requested observations", rows.len(), n);
        Ok(rows)
    }

    /// Get the most recent observation, if any
    #[instrument(skip(self))]
    pub async fn most_recent_observation(&self) -> DbResult<Option<ObservationRow>> {
        let row = sqlx::query_as::<_, ObservationRow>(
            r#"
            SELECT * FROM weather_observations
            ORDER BY dateTime DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Delete observations strictly older than the cutoff (epoch seconds).
    /// Returns the number of rows removed; a repeat call with the same
    /// cutoff removes nothing.
    #[instrument(skip(self))]
    pub async fn delete_observations_before(&self, cutoff: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM weather_observations WHERE dateTime < ?")
            .bind(cutoff)
            .execute(self.pool())
            .await?;

        let deleted = result.rows_affected();
        debug!("deleted {} observations before {}", deleted, cutoff);
        Ok(deleted)
    }

    /// Count of stored observations
    #[instrument(skip(self))]
    pub async fn count_observations(&self) -> DbResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM weather_observations")
            .fetch_one(self.pool())
            .await?;

        Ok(row.get("count"))
    }
}
