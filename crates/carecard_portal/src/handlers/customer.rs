// --- File: crates/carecard_portal/src/handlers/customer.rs ---
//! Endpoints a member uses for their own account. Any authenticated caller
//! may use them; the profile is created on first access.

use axum::extract::{Path, Query, State};
use carecard_common::{handle_result, ApiResponse, ApiResult, AuthUser, JsonBody};
use carecard_db::{
    Invoice, MembershipView, Payment, Profile, ProfileUpdate, ReimbursementClaim, ServiceRequest,
    SqlClaimRepository, SqlInvoiceRepository, SqlMembershipRepository, SqlPaymentRepository,
    SqlProfileRepository, SqlServiceRequestRepository,
};
use tracing::debug;

use crate::auth::PortalState;
use crate::error::PortalError;
use crate::logic::{self, CouponPreview, CouponQuery, NewClaim, NewServiceRequest};

async fn ensure_profile(state: &PortalState, user: &AuthUser) -> Result<Profile, PortalError> {
    Ok(SqlProfileRepository::new(state.db.clone())
        .find_or_create(&user.user_id, user.email.as_deref())
        .await?)
}

pub async fn get_me_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Profile> {
    handle_result(ensure_profile(&state, &user).await)
}

pub async fn update_me_handler(
    State(state): State<PortalState>,
    user: AuthUser,
    JsonBody(update): JsonBody<ProfileUpdate>,
) -> ApiResult<Profile> {
    ensure_profile(&state, &user).await?;
    let profile = SqlProfileRepository::new(state.db.clone())
        .update_contact(&user.user_id, &update)
        .await?;
    Ok(ApiResponse::ok(profile))
}

pub async fn my_ecards_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Vec<MembershipView>> {
    handle_result(
        SqlMembershipRepository::new(state.db.clone())
            .list_for_user(&user.user_id)
            .await,
    )
}

pub async fn my_payments_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Vec<Payment>> {
    handle_result(
        SqlPaymentRepository::new(state.db.clone())
            .list_for_user(&user.user_id)
            .await,
    )
}

pub async fn my_invoices_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Vec<Invoice>> {
    handle_result(
        SqlInvoiceRepository::new(state.db.clone())
            .list_for_user(&user.user_id)
            .await,
    )
}

pub async fn create_service_request_handler(
    State(state): State<PortalState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<NewServiceRequest>,
) -> ApiResult<ServiceRequest> {
    debug!("Service request '{}' from {}", payload.service_type, user.user_id);
    ensure_profile(&state, &user).await?;
    let created = logic::open_service_request(&state.db, &user.user_id, payload).await?;
    Ok(ApiResponse::created(created))
}

pub async fn my_service_requests_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Vec<ServiceRequest>> {
    handle_result(
        SqlServiceRequestRepository::new(state.db.clone())
            .list_for_user(&user.user_id)
            .await,
    )
}

pub async fn submit_claim_handler(
    State(state): State<PortalState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<NewClaim>,
) -> ApiResult<ReimbursementClaim> {
    ensure_profile(&state, &user).await?;
    let claim = logic::submit_claim(&state.db, &user.user_id, payload).await?;
    Ok(ApiResponse::created(claim))
}

pub async fn my_claims_handler(
    State(state): State<PortalState>,
    user: AuthUser,
) -> ApiResult<Vec<ReimbursementClaim>> {
    handle_result(
        SqlClaimRepository::new(state.db.clone())
            .list_for_user(&user.user_id)
            .await,
    )
}

/// Previews a coupon's discount. Nothing is redeemed.
pub async fn validate_coupon_handler(
    State(state): State<PortalState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Query(query): Query<CouponQuery>,
) -> ApiResult<CouponPreview> {
    handle_result(logic::preview_coupon(&state.db, &code, query).await)
}
