// --- File: crates/carecard_checkout/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use carecard_db::Plan;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::logic::{CreateOrderRequest, CreateOrderResponse, PurchaseRequest, PurchaseSummary};

#[utoipa::path(
    post,
    path = "/checkout/purchase", // Path relative to /api
    request_body(content = PurchaseRequest, example = json!({
        "plan_id": "3f2c9a1e-6b7d-4e3a-9f0c-1d2e3f4a5b6c",
        "payment_method": "gateway",
        "razorpay_order_id": "order_EKwxwAgItmmXdp",
        "razorpay_payment_id": "pay_29QQoUBi66xm2f",
        "razorpay_signature": "9ef4dffbfd84f1318f6739a3ce19f9d85851857ae648f114332d8401e0949a3d",
        "member_name": "Asha Rao"
    })),
    responses(
        (status = 200, description = "Membership, payment and invoice recorded", body = PurchaseSummary),
        (status = 400, description = "Gateway payment without a payment id"),
        (status = 401, description = "Missing or invalid token, or bad payment signature"),
        (status = 404, description = "Plan not found"),
        (status = 500, description = "Database error; the driver message is returned")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
fn doc_purchase_handler() {}

#[utoipa::path(
    post,
    path = "/checkout/create-order", // Path relative to /api
    request_body(content = CreateOrderRequest, example = json!({
        "plan_id": "3f2c9a1e-6b7d-4e3a-9f0c-1d2e3f4a5b6c"
    })),
    responses(
        (status = 200, description = "Order created, or `gateway_enabled: false`", body = CreateOrderResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Plan not found"),
        (status = 502, description = "Payment gateway error")
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
fn doc_create_order_handler() {}

#[utoipa::path(
    get,
    path = "/checkout/plans", // Path relative to /api
    responses(
        (status = 200, description = "Plans currently on sale", body = Vec<Plan>)
    ),
    tag = "Checkout"
)]
fn doc_list_plans_handler() {}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(doc_purchase_handler, doc_create_order_handler, doc_list_plans_handler),
    components(schemas(
        PurchaseRequest,
        PurchaseSummary,
        CreateOrderRequest,
        CreateOrderResponse,
        Plan
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Checkout", description = "Membership purchase and payment orders")
    )
)]
pub struct CheckoutApiDoc;
