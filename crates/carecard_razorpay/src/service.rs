use carecard_common::services::BoxFuture;
use carecard_common::{
    CarecardError, GatewayCredentials, GatewayOrder, GatewayOrderRequest, PaymentGateway,
};
use carecard_config::RazorpayConfig;

use crate::logic::{create_order, verify_payment_signature};

/// `PaymentGateway` backed by the Razorpay REST API.
#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    api_base: String,
}

impl RazorpayGateway {
    pub fn new(config: &RazorpayConfig) -> Self {
        Self::with_api_base(config.api_base.clone())
    }

    /// Points the client at another base URL (tests use a mock server).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }
}

impl PaymentGateway for RazorpayGateway {
    fn create_order(
        &self,
        credentials: GatewayCredentials,
        order: GatewayOrderRequest,
    ) -> BoxFuture<'_, GatewayOrder, CarecardError> {
        Box::pin(async move {
            create_order(&self.api_base, &credentials, &order)
                .await
                .map_err(CarecardError::from)
        })
    }

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        key_secret: &str,
    ) -> bool {
        verify_payment_signature(order_id, payment_id, signature, key_secret).is_ok()
    }
}
