//! Service abstractions for external services.
//!
//! Handlers depend on these traits rather than on concrete clients so tests
//! can swap in fakes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::CarecardError;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Key pair used to talk to the gateway. Comes from the payment_settings
/// table, so it travels with each request instead of living in the client.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

/// Order to create on the remote gateway.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    /// Amount in the smallest currency unit (paise).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notes: HashMap<String, String>,
}

/// Order as returned by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

/// Remote payment-order creation.
pub trait PaymentGateway: Send + Sync {
    /// Create an order the client SDK will collect payment against.
    fn create_order(
        &self,
        credentials: GatewayCredentials,
        order: GatewayOrderRequest,
    ) -> BoxFuture<'_, GatewayOrder, CarecardError>;

    /// Check the signature the client SDK returns after a successful payment.
    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        key_secret: &str,
    ) -> bool;
}
