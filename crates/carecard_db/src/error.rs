//! Error types for the database client

use carecard_common::{not_found, CarecardError};
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("{0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query; carries the driver message
    #[error("{0}")]
    QueryError(String),

    /// A row the operation depends on does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The operation would break a business rule (e.g. overdrawing a wallet)
    #[error("{0}")]
    Constraint(String),
}

impl From<DbError> for CarecardError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::SqlxError(e) => CarecardError::DatabaseError(e.to_string()),
            DbError::QueryError(msg) => CarecardError::DatabaseError(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => CarecardError::ConfigError(msg),
            DbError::PoolError(msg) => CarecardError::DatabaseError(msg),
            DbError::NotFound(what) => not_found(format!("{what} not found")),
            DbError::Constraint(msg) => CarecardError::ValidationError(msg),
        }
    }
}
