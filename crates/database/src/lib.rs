//! Parlor Database Crate
//!
//! Connection management and embedded schema migrations for the SQLite store
//! shared by the session, conversation and notification repositories.

use sqlx::SqlitePool;
use parlor_config::DatabaseConfig;
use thiserror::Error;

pub mod connection;
pub mod migrations;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::{applied_migrations, run_migrations, MIGRATOR};

/// Failures raised while bringing the database online.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("migration error: {0}")]
    MigrationError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
