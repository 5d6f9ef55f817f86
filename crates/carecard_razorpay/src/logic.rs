// --- File: crates/carecard_razorpay/src/logic.rs ---

use crate::error::RazorpayError;
use carecard_common::{GatewayCredentials, GatewayOrder, GatewayOrderRequest, HTTP_CLIENT};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Creates a payment order on Razorpay (`POST {api_base}/orders`).
///
/// The returned order id is handed to the client-side checkout, which
/// collects the payment and calls back with a payment id and signature.
pub async fn create_order(
    api_base: &str,
    credentials: &GatewayCredentials,
    order: &GatewayOrderRequest,
) -> Result<GatewayOrder, RazorpayError> {
    if credentials.key_id.is_empty() || credentials.key_secret.is_empty() {
        return Err(RazorpayError::ConfigError);
    }

    let api_url = format!("{}/orders", api_base.trim_end_matches('/'));
    info!(
        "[Razorpay Logic] Creating order for {} {} (receipt {})",
        order.amount, order.currency, order.receipt
    );

    let response = HTTP_CLIENT
        .post(&api_url)
        .basic_auth(&credentials.key_id, Some(&credentials.key_secret))
        .json(order)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;
    debug!("[Razorpay Logic] Razorpay API response status: {}", status);

    if status.is_success() {
        let created: GatewayOrder = serde_json::from_str(&body_text)?;
        info!("[Razorpay Logic] Order {} created", created.id);
        Ok(created)
    } else {
        let error_message = match serde_json::from_str::<serde_json::Value>(&body_text) {
            Ok(json_body) => json_body
                .get("error")
                .and_then(|e| e.get("description"))
                .and_then(|m| m.as_str())
                .unwrap_or(&body_text)
                .to_string(),
            Err(_) => body_text,
        };
        warn!(
            "[Razorpay Logic] Order creation failed with HTTP status: {}. Message: {}",
            status, error_message
        );
        Err(RazorpayError::ApiError {
            status_code: status.as_u16(),
            message: error_message,
        })
    }
}

/// Hex-encoded HMAC-SHA256 of `"{order_id}|{payment_id}"` keyed with the
/// account's key secret. This is the signature Razorpay returns to the client
/// after a successful payment.
pub fn payment_signature(order_id: &str, payment_id: &str, key_secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let mut mac = match HmacSha256::new_from_slice(key_secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compares the client-supplied signature with the expected one in constant
/// time.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> Result<(), RazorpayError> {
    if key_secret.is_empty() {
        return Err(RazorpayError::ConfigError);
    }
    let expected = payment_signature(order_id, payment_id, key_secret);
    if !expected.is_empty() && constant_time_eq(expected.as_bytes(), signature.trim().as_bytes()) {
        Ok(())
    } else {
        warn!(
            "[Razorpay Logic] Signature mismatch for order {} / payment {}",
            order_id, payment_id
        );
        Err(RazorpayError::SignatureMismatch)
    }
}
