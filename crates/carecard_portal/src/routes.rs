// --- File: crates/carecard_portal/src/routes.rs ---
use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Router,
};
use carecard_common::Role;

use crate::auth::{
    require_role, PortalState, RoleGuard, ADMIN_ROLES, CALL_CENTRE_ROLES, PARTNER_ROLES,
};
use crate::handlers::{admin, callcentre, customer, directory, partner};

fn guarded(
    router: Router<PortalState>,
    state: &PortalState,
    allowed: &'static [Role],
) -> Router<PortalState> {
    let guard = RoleGuard {
        state: state.clone(),
        allowed,
    };
    router.route_layer(from_fn_with_state(guard, require_role))
}

fn customer_routes() -> Router<PortalState> {
    Router::new()
        .route(
            "/me",
            get(customer::get_me_handler).put(customer::update_me_handler),
        )
        .route("/me/ecards", get(customer::my_ecards_handler))
        .route("/me/payments", get(customer::my_payments_handler))
        .route("/me/invoices", get(customer::my_invoices_handler))
        .route(
            "/me/service-requests",
            get(customer::my_service_requests_handler)
                .post(customer::create_service_request_handler),
        )
        .route(
            "/me/claims",
            get(customer::my_claims_handler).post(customer::submit_claim_handler),
        )
        .route(
            "/coupons/{code}/validate",
            get(customer::validate_coupon_handler),
        )
        .route("/directory/cities", get(directory::list_cities_handler))
        .route(
            "/directory/departments",
            get(directory::list_departments_handler),
        )
        .route(
            "/directory/franchises",
            get(directory::list_franchises_handler),
        )
}

fn admin_routes() -> Router<PortalState> {
    Router::new()
        .route("/admin/dashboard", get(admin::dashboard_handler))
        .route("/admin/members", get(admin::list_members_handler))
        .route("/admin/payments", get(admin::list_payments_handler))
        .route(
            "/admin/plans",
            get(admin::list_plans_handler).post(admin::create_plan_handler),
        )
        .route("/admin/plans/{id}", patch(admin::patch_plan_handler))
        .route(
            "/admin/payment-settings",
            get(admin::payment_settings_handler).put(admin::update_payment_settings_handler),
        )
        .route("/admin/coupons", post(admin::create_coupon_handler))
        .route(
            "/admin/service-requests/{id}",
            patch(admin::update_service_request_handler),
        )
        .route("/admin/claims/{id}", patch(admin::update_claim_handler))
        .route(
            "/admin/withdrawals/{id}",
            patch(admin::update_withdrawal_handler),
        )
        .route("/admin/franchises", post(admin::create_franchise_handler))
        .route("/admin/profiles/{id}/role", put(admin::assign_role_handler))
        .route(
            "/admin/wallets/{owner_id}/credit",
            post(admin::credit_wallet_handler),
        )
}

fn partner_routes() -> Router<PortalState> {
    Router::new()
        .route("/partner/wallet", get(partner::wallet_handler))
        .route(
            "/partner/wallet/transactions",
            get(partner::wallet_transactions_handler),
        )
        .route(
            "/partner/withdrawals",
            get(partner::list_withdrawals_handler).post(partner::request_withdrawal_handler),
        )
}

fn callcentre_routes() -> Router<PortalState> {
    Router::new()
        .route(
            "/callcentre/ecards/{card_number}",
            get(callcentre::lookup_ecard_handler),
        )
        .route(
            "/callcentre/service-requests",
            get(callcentre::service_queue_handler),
        )
}

/// All portal routes. Mount under `/api`.
pub fn routes(state: PortalState) -> Router {
    Router::new()
        .merge(customer_routes())
        .merge(guarded(admin_routes(), &state, ADMIN_ROLES))
        .merge(guarded(partner_routes(), &state, PARTNER_ROLES))
        .merge(guarded(callcentre_routes(), &state, CALL_CENTRE_ROLES))
        .with_state(state)
}
