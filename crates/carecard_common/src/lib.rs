// --- File: crates/carecard_common/src/lib.rs ---

pub mod auth; // Bearer token verification
pub mod error; // Error handling
pub mod http; // HTTP envelopes and the shared client
pub mod logging; // Logging setup
pub mod models; // Shared enums
pub mod services; // Service abstractions

pub use error::{
    config_error, external_service_error, not_found, unauthorized, CarecardError, Context,
    HttpStatusCode,
};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    handle_result, ApiResponse, ApiResult, IntoHttpResponse, JsonBody,
};

pub use auth::{AuthUser, Claims, JwtVerifier};
pub use models::Role;
pub use services::{GatewayCredentials, GatewayOrder, GatewayOrderRequest, PaymentGateway};
