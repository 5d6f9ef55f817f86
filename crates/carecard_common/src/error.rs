// --- File: crates/carecard_common/src/error.rs ---
use axum::extract::rejection::JsonRejection;
use std::fmt;
use thiserror::Error;

/// The base error type for all CareCard errors.
///
/// Each crate defines its own error enum and implements
/// `From<CrateError> for CarecardError`; handlers return this type so every
/// failure renders the same JSON envelope.
#[derive(Error, Debug)]
pub enum CarecardError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    AuthError(String),

    /// Authenticated, but the caller's role does not allow the action
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    /// Invalid input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database operation failed; the driver message is kept verbatim
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Resource already exists or is in the wrong state
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Anything else
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CarecardError {
    fn status_code(&self) -> u16 {
        match self {
            CarecardError::ConfigError(_) => 500,
            CarecardError::AuthError(_) => 401,
            CarecardError::ForbiddenError(_) => 403,
            CarecardError::ValidationError(_) => 400,
            CarecardError::DatabaseError(_) => 500,
            CarecardError::ExternalServiceError { .. } => 502,
            CarecardError::ConflictError(_) => 409,
            CarecardError::NotFoundError(_) => 404,
            CarecardError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, CarecardError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, CarecardError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, CarecardError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| CarecardError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CarecardError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| CarecardError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<JsonRejection> for CarecardError {
    fn from(rejection: JsonRejection) -> Self {
        CarecardError::ValidationError(rejection.body_text())
    }
}

impl From<std::io::Error> for CarecardError {
    fn from(err: std::io::Error) -> Self {
        CarecardError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> CarecardError {
    CarecardError::ConfigError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CarecardError {
    CarecardError::NotFoundError(message.to_string())
}

pub fn unauthorized<T: fmt::Display>(message: T) -> CarecardError {
    CarecardError::AuthError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> CarecardError {
    CarecardError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
