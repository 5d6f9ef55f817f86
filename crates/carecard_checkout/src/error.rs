use carecard_common::{CarecardError, HttpStatusCode};
use carecard_db::DbError;
use thiserror::Error;

/// Checkout-specific error types.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// No plan id in the request, or no plan with that id
    #[error("Plan not found")]
    PlanNotFound,

    /// A gateway purchase arrived without the gateway's payment id
    #[error("razorpay_payment_id is required for gateway payments")]
    MissingPaymentId,

    /// Signature verification is on and the payment signature is absent or wrong
    #[error("payment signature mismatch")]
    SignatureMismatch,

    /// Gateway is enabled but its key pair is not configured
    #[error("payment gateway credentials are not configured")]
    MissingCredentials,

    /// Validity window could not be computed from the start date
    #[error("could not compute membership expiry")]
    InvalidValidityWindow,

    /// A required database step failed; the driver message is surfaced
    #[error(transparent)]
    Database(#[from] DbError),

    /// The remote gateway call failed
    #[error(transparent)]
    Gateway(CarecardError),
}

impl From<CheckoutError> for CarecardError {
    fn from(err: CheckoutError) -> Self {
        let message = err.to_string();
        match err {
            CheckoutError::PlanNotFound => CarecardError::NotFoundError(message),
            CheckoutError::MissingPaymentId => CarecardError::ValidationError(message),
            CheckoutError::SignatureMismatch => CarecardError::AuthError(message),
            CheckoutError::MissingCredentials => CarecardError::ConfigError(message),
            CheckoutError::InvalidValidityWindow => CarecardError::InternalError(message),
            CheckoutError::Database(e) => e.into(),
            CheckoutError::Gateway(e) => e,
        }
    }
}

impl HttpStatusCode for CheckoutError {
    fn status_code(&self) -> u16 {
        match self {
            CheckoutError::PlanNotFound => 404,
            CheckoutError::MissingPaymentId => 400,
            CheckoutError::SignatureMismatch => 401,
            CheckoutError::MissingCredentials => 500,
            CheckoutError::InvalidValidityWindow => 500,
            CheckoutError::Database(DbError::NotFound(_)) => 404,
            CheckoutError::Database(DbError::Constraint(_)) => 400,
            CheckoutError::Database(_) => 500,
            CheckoutError::Gateway(e) => e.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_not_found_maps_to_404() {
        let err = CheckoutError::PlanNotFound;
        assert_eq!(err.status_code(), 404);
        let common: CarecardError = err.into();
        assert_eq!(common.status_code(), 404);
    }

    #[test]
    fn test_database_error_keeps_driver_message() {
        let err = CheckoutError::Database(DbError::QueryError(
            "no such table: ecard_members".to_string(),
        ));
        assert_eq!(err.status_code(), 500);
        let common: CarecardError = err.into();
        assert_eq!(common.status_code(), 500);
        assert!(common.to_string().contains("no such table: ecard_members"));
    }
}
