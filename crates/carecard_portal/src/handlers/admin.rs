// --- File: crates/carecard_portal/src/handlers/admin.rs ---
//! Admin console. Mounted behind the `admin` role guard, which places the
//! caller's profile in the request extensions.

use axum::{
    extract::{Path, State},
    Extension,
};
use carecard_common::{handle_result, ApiResponse, ApiResult, JsonBody};
use carecard_db::{
    Coupon, Franchise, MembershipView, Payment, PaymentSettings, PaymentSettingsUpdate, Plan,
    Profile, ReimbursementClaim, ServiceRequest, SqlMembershipRepository, SqlPaymentRepository,
    SqlPaymentSettingsRepository, SqlPlanRepository, Wallet, WithdrawalRequest,
    RAZORPAY_PROVIDER,
};
use tracing::info;

use crate::auth::PortalState;
use crate::logic::{
    self, ClaimUpdate, Dashboard, NewCoupon, NewFranchise, NewPlan, PlanPatch, RoleUpdate,
    StatusUpdate, WalletCredit,
};

pub async fn dashboard_handler(State(state): State<PortalState>) -> ApiResult<Dashboard> {
    handle_result(logic::dashboard(&state.db).await)
}

pub async fn list_members_handler(
    State(state): State<PortalState>,
) -> ApiResult<Vec<MembershipView>> {
    handle_result(SqlMembershipRepository::new(state.db).list_all().await)
}

pub async fn list_payments_handler(State(state): State<PortalState>) -> ApiResult<Vec<Payment>> {
    handle_result(SqlPaymentRepository::new(state.db).list_all().await)
}

/// All plans, inactive ones included.
pub async fn list_plans_handler(State(state): State<PortalState>) -> ApiResult<Vec<Plan>> {
    handle_result(SqlPlanRepository::new(state.db).list_all().await)
}

pub async fn create_plan_handler(
    State(state): State<PortalState>,
    Extension(admin): Extension<Profile>,
    JsonBody(payload): JsonBody<NewPlan>,
) -> ApiResult<Plan> {
    let plan = logic::create_plan(&state.db, payload).await?;
    info!("Plan {} created by {}", plan.id, admin.id);
    Ok(ApiResponse::created(plan))
}

pub async fn patch_plan_handler(
    State(state): State<PortalState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<PlanPatch>,
) -> ApiResult<Plan> {
    handle_result(logic::patch_plan(&state.db, &id, payload).await)
}

pub async fn payment_settings_handler(
    State(state): State<PortalState>,
) -> ApiResult<Option<PaymentSettings>> {
    handle_result(
        SqlPaymentSettingsRepository::new(state.db)
            .find_by_provider(RAZORPAY_PROVIDER)
            .await,
    )
}

pub async fn update_payment_settings_handler(
    State(state): State<PortalState>,
    Extension(admin): Extension<Profile>,
    JsonBody(payload): JsonBody<PaymentSettingsUpdate>,
) -> ApiResult<PaymentSettings> {
    let settings = SqlPaymentSettingsRepository::new(state.db)
        .upsert(RAZORPAY_PROVIDER, &payload)
        .await?;
    info!(
        "Payment settings for {} updated by {} (enabled: {})",
        settings.provider, admin.id, settings.is_enabled
    );
    Ok(ApiResponse::ok(settings))
}

pub async fn create_coupon_handler(
    State(state): State<PortalState>,
    JsonBody(payload): JsonBody<NewCoupon>,
) -> ApiResult<Coupon> {
    let coupon = logic::create_coupon(&state.db, payload).await?;
    Ok(ApiResponse::created(coupon))
}

pub async fn update_service_request_handler(
    State(state): State<PortalState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<StatusUpdate>,
) -> ApiResult<ServiceRequest> {
    handle_result(logic::update_service_request(&state.db, &id, payload).await)
}

pub async fn update_claim_handler(
    State(state): State<PortalState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ClaimUpdate>,
) -> ApiResult<ReimbursementClaim> {
    handle_result(logic::update_claim(&state.db, &id, payload).await)
}

pub async fn update_withdrawal_handler(
    State(state): State<PortalState>,
    Extension(admin): Extension<Profile>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<StatusUpdate>,
) -> ApiResult<WithdrawalRequest> {
    let request = logic::update_withdrawal(&state.db, &id, payload).await?;
    info!("Withdrawal {} set to {} by {}", request.id, request.status, admin.id);
    Ok(ApiResponse::ok(request))
}

pub async fn create_franchise_handler(
    State(state): State<PortalState>,
    JsonBody(payload): JsonBody<NewFranchise>,
) -> ApiResult<Franchise> {
    let franchise = logic::create_franchise(&state.db, payload).await?;
    Ok(ApiResponse::created(franchise))
}

pub async fn assign_role_handler(
    State(state): State<PortalState>,
    Extension(admin): Extension<Profile>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<RoleUpdate>,
) -> ApiResult<Profile> {
    let profile = logic::assign_role(&state.db, &id, payload).await?;
    info!("{} assigned role {} to {}", admin.id, profile.role, profile.id);
    Ok(ApiResponse::ok(profile))
}

pub async fn credit_wallet_handler(
    State(state): State<PortalState>,
    Path(owner_id): Path<String>,
    JsonBody(payload): JsonBody<WalletCredit>,
) -> ApiResult<Wallet> {
    handle_result(logic::credit_wallet(&state.db, &owner_id, payload).await)
}
