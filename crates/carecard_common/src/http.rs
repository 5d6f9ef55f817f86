// --- File: crates/carecard_common/src/http.rs ---
use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{CarecardError, HttpStatusCode};

pub mod client;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// JSON request body whose rejections render as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(CarecardError))]
pub struct JsonBody<T>(pub T);

/// Result type returned by every JSON handler.
pub type ApiResult<T> = Result<ApiResponse<T>, CarecardError>;

/// Extension trait for CarecardError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for CarecardError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

impl IntoResponse for CarecardError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Wraps a domain result in the success envelope, converting the error.
pub fn handle_result<T, E>(result: Result<T, E>) -> ApiResult<T>
where
    T: Serialize,
    E: Into<CarecardError>,
{
    result.map(ApiResponse::ok).map_err(Into::into)
}
