#![allow(dead_code)]

use carecard_checkout::CheckoutState;
use carecard_common::auth::encode_token;
use carecard_common::services::BoxFuture;
use carecard_common::{
    external_service_error, AuthUser, CarecardError, Claims, GatewayCredentials, GatewayOrder,
    GatewayOrderRequest, JwtVerifier, PaymentGateway,
};
use carecard_config::{AppConfig, AuthConfig};
use carecard_db::{
    init_schema, new_id, DbClient, PaymentSettingsUpdate, Plan, Repository,
    SqlPaymentSettingsRepository, SqlPlanRepository, RAZORPAY_PROVIDER,
};
use chrono::Utc;
use std::sync::{Arc, Mutex};

pub const JWT_SECRET: &str = "checkout-test-secret";

/// Gateway double: records orders and accepts `"{order}|{payment}|{secret}"`
/// as the valid signature.
#[derive(Default)]
pub struct FakeGateway {
    pub orders: Mutex<Vec<(GatewayCredentials, GatewayOrderRequest)>>,
    pub fail: bool,
}

impl FakeGateway {
    pub fn failing() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn signature(order_id: &str, payment_id: &str, secret: &str) -> String {
        format!("{order_id}|{payment_id}|{secret}")
    }
}

impl PaymentGateway for FakeGateway {
    fn create_order(
        &self,
        credentials: GatewayCredentials,
        order: GatewayOrderRequest,
    ) -> BoxFuture<'_, GatewayOrder, CarecardError> {
        Box::pin(async move {
            if self.fail {
                return Err(external_service_error("Razorpay API", "gateway unavailable"));
            }
            let created = GatewayOrder {
                id: "order_test_123".to_string(),
                amount: order.amount,
                currency: order.currency.clone(),
                receipt: Some(order.receipt.clone()),
                status: "created".to_string(),
            };
            self.orders.lock().unwrap().push((credentials, order));
            Ok(created)
        })
    }

    fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature: &str,
        key_secret: &str,
    ) -> bool {
        signature == Self::signature(order_id, payment_id, key_secret)
    }
}

pub async fn test_db() -> DbClient {
    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    init_schema(&db).await.unwrap();
    db
}

pub fn test_config(use_razorpay: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.use_razorpay = use_razorpay;
    config.auth = AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        audience: None,
    };
    config
}

pub async fn seed_plan(db: &DbClient, price: f64) -> Plan {
    SqlPlanRepository::new(db.clone())
        .create(Plan {
            id: new_id(),
            name: "Family Care".to_string(),
            description: Some("Annual family membership".to_string()),
            price,
            duration_months: 12,
            is_active: true,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

pub async fn enable_gateway(db: &DbClient) {
    SqlPaymentSettingsRepository::new(db.clone())
        .upsert(
            RAZORPAY_PROVIDER,
            &PaymentSettingsUpdate {
                is_enabled: Some(true),
                key_id: Some("rzp_test_key".to_string()),
                key_secret: Some("rzp_test_secret".to_string()),
                currency: None,
            },
        )
        .await
        .unwrap();
}

pub fn user() -> AuthUser {
    AuthUser {
        user_id: "user-1".to_string(),
        email: Some("member@example.com".to_string()),
    }
}

pub fn bearer(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: None,
        aud: None,
    };
    format!("Bearer {}", encode_token(JWT_SECRET, &claims).unwrap())
}

pub fn state(config: AppConfig, db: DbClient, gateway: Arc<dyn PaymentGateway>) -> CheckoutState {
    let jwt = JwtVerifier::new(&config.auth).unwrap();
    CheckoutState {
        config: Arc::new(config),
        db,
        gateway,
        jwt,
    }
}
