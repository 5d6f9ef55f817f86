use carecard_common::{external_service_error, CarecardError, HttpStatusCode};
use thiserror::Error;

/// Razorpay-specific error types.
#[derive(Error, Debug)]
pub enum RazorpayError {
    /// The HTTP request to Razorpay could not be completed
    #[error("Razorpay API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Razorpay answered with a non-2xx status
    #[error("Razorpay API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// The response body was not the expected JSON
    #[error("Failed to parse Razorpay API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Key id or key secret missing
    #[error("Razorpay credentials missing or incomplete")]
    ConfigError,

    /// The payment signature does not match the order and payment ids
    #[error("Razorpay payment signature verification failed")]
    SignatureMismatch,
}

impl From<RazorpayError> for CarecardError {
    fn from(err: RazorpayError) -> Self {
        match err {
            RazorpayError::RequestError(e) => external_service_error("Razorpay API", e),
            RazorpayError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Razorpay API",
                format!("Status: {}, Message: {}", status_code, message),
            ),
            RazorpayError::ParseError(e) => {
                external_service_error("Razorpay API", format!("unreadable response: {}", e))
            }
            RazorpayError::ConfigError => CarecardError::ConfigError(
                "Razorpay credentials missing or incomplete".to_string(),
            ),
            RazorpayError::SignatureMismatch => {
                CarecardError::AuthError("payment signature mismatch".to_string())
            }
        }
    }
}

impl HttpStatusCode for RazorpayError {
    fn status_code(&self) -> u16 {
        match self {
            RazorpayError::RequestError(_) => 502,
            RazorpayError::ApiError { .. } => 502,
            RazorpayError::ParseError(_) => 502,
            RazorpayError::ConfigError => 500,
            RazorpayError::SignatureMismatch => 401,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_becomes_bad_gateway() {
        let err = RazorpayError::ApiError {
            status_code: 400,
            message: "The amount must be at least INR 1.00".to_string(),
        };
        assert_eq!(err.status_code(), 502);

        let common: CarecardError = err.into();
        assert_eq!(common.status_code(), 502);
        assert!(common.to_string().contains("INR 1.00"));
    }

    #[test]
    fn test_signature_mismatch_is_unauthorized() {
        let common: CarecardError = RazorpayError::SignatureMismatch.into();
        assert_eq!(common.status_code(), 401);
    }
}
