use carecard_common::{CarecardError, HttpStatusCode, Role};
use carecard_db::DbError;
use thiserror::Error;

/// Portal-specific error types.
#[derive(Error, Debug)]
pub enum PortalError {
    /// Token was valid but no profile exists for the caller
    #[error("no profile for user {0}")]
    MissingProfile(String),

    /// The caller's role may not use this endpoint
    #[error("role '{0}' may not access this resource")]
    Forbidden(Role),

    /// Bad input, including status values outside their enum
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl PortalError {
    pub fn validation(message: impl Into<String>) -> Self {
        PortalError::Validation(message.into())
    }
}

impl From<PortalError> for CarecardError {
    fn from(err: PortalError) -> Self {
        let message = err.to_string();
        match err {
            PortalError::MissingProfile(_) => CarecardError::AuthError(message),
            PortalError::Forbidden(_) => CarecardError::ForbiddenError(message),
            PortalError::Validation(_) => CarecardError::ValidationError(message),
            PortalError::NotFound(_) => CarecardError::NotFoundError(message),
            PortalError::Conflict(_) => CarecardError::ConflictError(message),
            PortalError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for PortalError {
    fn status_code(&self) -> u16 {
        match self {
            PortalError::MissingProfile(_) => 401,
            PortalError::Forbidden(_) => 403,
            PortalError::Validation(_) => 400,
            PortalError::NotFound(_) => 404,
            PortalError::Conflict(_) => 409,
            PortalError::Database(DbError::NotFound(_)) => 404,
            PortalError::Database(DbError::Constraint(_)) => 400,
            PortalError::Database(_) => 500,
        }
    }
}
