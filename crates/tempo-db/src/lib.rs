//! Observation store backed by SQLite
//!
//! One table keyed by a unique observation timestamp. Schema creation is
//! idempotent and tolerated to fail (restricted deployments create the
//! table out of band); every other storage fault surfaces as a `DbError`.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use queries::*;
pub use schema::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type DbResult<T> = Result<T, DbError>;
