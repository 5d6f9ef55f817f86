// --- File: crates/carecard_checkout/src/handlers.rs ---
use axum::extract::{FromRef, State};
use carecard_common::{ApiResponse, ApiResult, AuthUser, JsonBody, JwtVerifier, PaymentGateway};
use carecard_config::AppConfig;
use carecard_db::{DbClient, Plan};
use std::sync::Arc;
use tracing::debug;

use crate::logic::{
    self, CreateOrderRequest, CreateOrderResponse, PurchaseRequest, PurchaseSummary,
};

// --- State for Checkout Handlers ---
#[derive(Clone)]
pub struct CheckoutState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub gateway: Arc<dyn PaymentGateway>,
    pub jwt: JwtVerifier,
}

impl FromRef<CheckoutState> for JwtVerifier {
    fn from_ref(state: &CheckoutState) -> Self {
        state.jwt.clone()
    }
}

/// Records a membership purchase for the caller.
pub async fn purchase_handler(
    State(state): State<CheckoutState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<PurchaseRequest>,
) -> ApiResult<PurchaseSummary> {
    debug!(
        "Purchase request from {} for plan {:?} via {:?}",
        user.user_id, payload.plan_id, payload.payment_method
    );
    let summary = logic::purchase(
        &state.config,
        &state.db,
        state.gateway.as_ref(),
        &user,
        payload,
    )
    .await?;
    Ok(ApiResponse::ok(summary))
}

/// Creates a gateway order for the plan, or reports the gateway as disabled.
pub async fn create_order_handler(
    State(state): State<CheckoutState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<CreateOrderRequest>,
) -> ApiResult<CreateOrderResponse> {
    let response = logic::create_order(
        &state.config,
        &state.db,
        state.gateway.as_ref(),
        &user,
        payload,
    )
    .await?;
    Ok(ApiResponse::ok(response))
}

/// Lists the plans currently on sale. Public.
pub async fn list_plans_handler(State(state): State<CheckoutState>) -> ApiResult<Vec<Plan>> {
    let plans = logic::list_plans(&state.db).await?;
    Ok(ApiResponse::ok(plans))
}
