// --- File: crates/carecard_checkout/src/routes.rs ---

use crate::handlers::{
    create_order_handler, list_plans_handler, purchase_handler, CheckoutState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Creates a router containing all routes for the checkout feature.
pub fn routes(state: CheckoutState) -> Router {
    Router::new()
        .route("/checkout/plans", get(list_plans_handler))
        .route("/checkout/create-order", post(create_order_handler))
        .route("/checkout/purchase", post(purchase_handler))
        .with_state(state)
}
