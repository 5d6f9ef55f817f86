// --- File: crates/carecard_portal/src/logic.rs ---
//! Validation and aggregation behind the portal handlers.

use carecard_common::Role;
use carecard_db::{
    new_id, ClaimStatus, Coupon, DbClient, Franchise, FranchiseStatus, MembershipStatus,
    MembershipView, Plan, Profile, ReimbursementClaim, Repository, ServiceRequest,
    ServiceRequestStatus, SqlClaimRepository, SqlCouponRepository, SqlDirectoryRepository,
    SqlMembershipRepository, SqlPaymentRepository, SqlPlanRepository, SqlProfileRepository,
    SqlServiceRequestRepository, SqlWalletRepository, Wallet, WithdrawalRequest,
    WithdrawalStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::error::PortalError;

const TAX_MULTIPLIER: f64 = 1.18;

// --- Request / Response Structures ---

#[derive(Deserialize, Debug, Clone)]
pub struct NewServiceRequest {
    pub service_type: String,
    pub description: Option<String>,
    pub membership_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewClaim {
    pub membership_id: String,
    pub amount: f64,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CouponQuery {
    pub plan_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CouponPreview {
    pub code: String,
    pub discount_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
    /// Discounted price with tax, rounded like checkout totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_with_tax: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub total_members: i64,
    pub active_members: i64,
    pub pending_service_requests: i64,
    pub open_claims: i64,
    pub pending_withdrawals: i64,
    pub revenue: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_duration_months")]
    pub duration_months: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_duration_months() -> i64 {
    12
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: f64,
    pub max_uses: Option<i64>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClaimUpdate {
    pub status: String,
    pub admin_notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewFranchise {
    pub name: String,
    pub city_id: Option<String>,
    /// Profile promoted to the franchise role and linked to the new franchise.
    pub owner_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RoleUpdate {
    pub role: String,
    pub franchise_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WalletCredit {
    pub amount: f64,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewWithdrawal {
    pub amount: f64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct QueueQuery {
    pub status: Option<String>,
}

// --- Validation helpers ---

/// Parses a status value, turning an unknown one into a 400.
pub fn parse_status<T>(raw: &str) -> Result<T, PortalError>
where
    T: FromStr<Err = String>,
{
    raw.trim().parse::<T>().map_err(PortalError::Validation)
}

pub fn require_positive(amount: f64, field: &str) -> Result<(), PortalError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(PortalError::validation(format!(
            "{field} must be greater than zero"
        )))
    }
}

fn require_text(value: &str, field: &str) -> Result<(), PortalError> {
    if value.trim().is_empty() {
        Err(PortalError::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// --- Customer ---

pub async fn open_service_request(
    db: &DbClient,
    user_id: &str,
    request: NewServiceRequest,
) -> Result<ServiceRequest, PortalError> {
    require_text(&request.service_type, "service_type")?;

    if let Some(membership_id) = request.membership_id.as_deref() {
        let owned = SqlMembershipRepository::new(db.clone())
            .find_by_id(membership_id)
            .await?
            .is_some_and(|m| m.user_id == user_id);
        if !owned {
            return Err(PortalError::NotFound("Membership"));
        }
    }

    let now = Utc::now();
    let created = SqlServiceRequestRepository::new(db.clone())
        .create(ServiceRequest {
            id: new_id(),
            user_id: user_id.to_string(),
            membership_id: request.membership_id,
            service_type: request.service_type.trim().to_string(),
            description: request.description,
            status: ServiceRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(created)
}

/// Files a claim against one of the caller's active memberships.
pub async fn submit_claim(
    db: &DbClient,
    user_id: &str,
    claim: NewClaim,
) -> Result<ReimbursementClaim, PortalError> {
    require_positive(claim.amount, "amount")?;

    let membership = SqlMembershipRepository::new(db.clone())
        .find_by_id(&claim.membership_id)
        .await?
        .filter(|m| m.user_id == user_id)
        .ok_or(PortalError::NotFound("Membership"))?;

    let now = Utc::now();
    if membership.status != MembershipStatus::Active || membership.expiry_date <= now {
        return Err(PortalError::validation("Membership is not active"));
    }

    let created = SqlClaimRepository::new(db.clone())
        .create(ReimbursementClaim {
            id: new_id(),
            user_id: user_id.to_string(),
            membership_id: membership.id,
            amount: claim.amount,
            description: claim.description,
            status: ClaimStatus::Submitted,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(created)
}

/// Pure discount arithmetic for a coupon applied to a plan price.
pub fn apply_coupon(coupon: &Coupon, plan: Option<&Plan>) -> CouponPreview {
    let mut preview = CouponPreview {
        code: coupon.code.clone(),
        discount_percent: coupon.discount_percent,
        plan_id: None,
        original_price: None,
        discount_amount: None,
        discounted_price: None,
        total_with_tax: None,
    };
    if let Some(plan) = plan {
        let discount = round2(plan.price * coupon.discount_percent / 100.0);
        let discounted = round2(plan.price - discount);
        preview.plan_id = Some(plan.id.clone());
        preview.original_price = Some(plan.price);
        preview.discount_amount = Some(discount);
        preview.discounted_price = Some(discounted);
        preview.total_with_tax = Some((discounted * TAX_MULTIPLIER).round());
    }
    preview
}

/// Looks up a redeemable coupon. Inactive, expired and used-up coupons are
/// reported as not found. Nothing is reserved or counted.
pub async fn preview_coupon(
    db: &DbClient,
    code: &str,
    query: CouponQuery,
) -> Result<CouponPreview, PortalError> {
    let coupon = SqlCouponRepository::new(db.clone())
        .find_by_code(code)
        .await?
        .filter(|c| c.is_redeemable(Utc::now()))
        .ok_or(PortalError::NotFound("Coupon"))?;

    let plan = match query.plan_id.as_deref() {
        Some(plan_id) => Some(
            SqlPlanRepository::new(db.clone())
                .read(plan_id)
                .await?
                .ok_or(PortalError::NotFound("Plan"))?,
        ),
        None => None,
    };
    Ok(apply_coupon(&coupon, plan.as_ref()))
}

// --- Admin ---

pub async fn dashboard(db: &DbClient) -> Result<Dashboard, PortalError> {
    let memberships = SqlMembershipRepository::new(db.clone());
    Ok(Dashboard {
        total_members: memberships.count(None).await?,
        active_members: memberships.count(Some(MembershipStatus::Active)).await?,
        pending_service_requests: SqlServiceRequestRepository::new(db.clone())
            .count(ServiceRequestStatus::Pending)
            .await?,
        open_claims: SqlClaimRepository::new(db.clone()).count_open().await?,
        pending_withdrawals: SqlWalletRepository::new(db.clone())
            .count_pending_withdrawals()
            .await?,
        revenue: SqlPaymentRepository::new(db.clone()).total_revenue().await?,
    })
}

pub async fn create_plan(db: &DbClient, plan: NewPlan) -> Result<Plan, PortalError> {
    require_text(&plan.name, "name")?;
    if !plan.price.is_finite() || plan.price < 0.0 {
        return Err(PortalError::validation("price must not be negative"));
    }
    if plan.duration_months <= 0 {
        return Err(PortalError::validation("duration_months must be positive"));
    }

    let created = SqlPlanRepository::new(db.clone())
        .create(Plan {
            id: new_id(),
            name: plan.name.trim().to_string(),
            description: plan.description,
            price: plan.price,
            duration_months: plan.duration_months,
            is_active: plan.is_active,
            created_at: Utc::now(),
        })
        .await?;
    Ok(created)
}

pub async fn patch_plan(db: &DbClient, id: &str, patch: PlanPatch) -> Result<Plan, PortalError> {
    let repo = SqlPlanRepository::new(db.clone());
    let mut plan = repo.read(id).await?.ok_or(PortalError::NotFound("Plan"))?;

    if let Some(name) = patch.name {
        require_text(&name, "name")?;
        plan.name = name.trim().to_string();
    }
    if let Some(price) = patch.price {
        if !price.is_finite() || price < 0.0 {
            return Err(PortalError::validation("price must not be negative"));
        }
        plan.price = price;
    }
    if patch.description.is_some() {
        plan.description = patch.description;
    }
    if let Some(is_active) = patch.is_active {
        plan.is_active = is_active;
    }

    let updated = repo.update(plan).await?;
    info!("Plan {} updated", updated.id);
    Ok(updated)
}

pub async fn create_coupon(db: &DbClient, coupon: NewCoupon) -> Result<Coupon, PortalError> {
    require_text(&coupon.code, "code")?;
    if !(coupon.discount_percent > 0.0 && coupon.discount_percent <= 100.0) {
        return Err(PortalError::validation(
            "discount_percent must be in (0, 100]",
        ));
    }
    if coupon.max_uses.is_some_and(|max| max <= 0) {
        return Err(PortalError::validation("max_uses must be positive"));
    }

    let repo = SqlCouponRepository::new(db.clone());
    if repo.find_by_code(&coupon.code).await?.is_some() {
        return Err(PortalError::Conflict(format!(
            "coupon code '{}' already exists",
            coupon.code.trim().to_uppercase()
        )));
    }

    let created = repo
        .create(Coupon {
            id: new_id(),
            code: coupon.code,
            discount_percent: coupon.discount_percent,
            max_uses: coupon.max_uses,
            used_count: 0,
            valid_until: coupon.valid_until,
            is_active: coupon.is_active,
            created_at: Utc::now(),
        })
        .await?;
    Ok(created)
}

pub fn parse_role(raw: &str) -> Result<Role, PortalError> {
    parse_status::<Role>(raw)
}

pub async fn update_service_request(
    db: &DbClient,
    id: &str,
    update: StatusUpdate,
) -> Result<ServiceRequest, PortalError> {
    let status = parse_status::<ServiceRequestStatus>(&update.status)?;
    Ok(SqlServiceRequestRepository::new(db.clone())
        .update_status(id, status)
        .await?)
}

pub async fn update_claim(
    db: &DbClient,
    id: &str,
    update: ClaimUpdate,
) -> Result<ReimbursementClaim, PortalError> {
    let status = parse_status::<ClaimStatus>(&update.status)?;
    Ok(SqlClaimRepository::new(db.clone())
        .update_status(id, status, update.admin_notes.as_deref())
        .await?)
}

/// Moves a withdrawal request; approval debits the wallet exactly once.
pub async fn update_withdrawal(
    db: &DbClient,
    id: &str,
    update: StatusUpdate,
) -> Result<WithdrawalRequest, PortalError> {
    let status = parse_status::<WithdrawalStatus>(&update.status)?;
    Ok(SqlWalletRepository::new(db.clone())
        .update_withdrawal_status(id, status)
        .await?)
}

/// Creates a franchise. When an owner is named, their profile is promoted to
/// the franchise role and linked to it.
pub async fn create_franchise(
    db: &DbClient,
    request: NewFranchise,
) -> Result<Franchise, PortalError> {
    require_text(&request.name, "name")?;

    let profiles = SqlProfileRepository::new(db.clone());
    if let Some(owner_id) = request.owner_id.as_deref() {
        if profiles.find_by_id(owner_id).await?.is_none() {
            return Err(PortalError::NotFound("Profile"));
        }
    }

    let franchise = SqlDirectoryRepository::new(db.clone())
        .create_franchise(Franchise {
            id: new_id(),
            name: request.name.trim().to_string(),
            city_id: request.city_id,
            owner_id: request.owner_id.clone(),
            status: FranchiseStatus::Active,
            created_at: Utc::now(),
        })
        .await?;

    if let Some(owner_id) = request.owner_id.as_deref() {
        profiles
            .set_role(owner_id, Role::Franchise, Some(&franchise.id))
            .await?;
    }
    Ok(franchise)
}

pub async fn assign_role(
    db: &DbClient,
    profile_id: &str,
    update: RoleUpdate,
) -> Result<Profile, PortalError> {
    let role = parse_role(&update.role)?;
    Ok(SqlProfileRepository::new(db.clone())
        .set_role(profile_id, role, update.franchise_id.as_deref())
        .await?)
}

pub async fn credit_wallet(
    db: &DbClient,
    owner_id: &str,
    credit: WalletCredit,
) -> Result<Wallet, PortalError> {
    require_positive(credit.amount, "amount")?;
    if SqlProfileRepository::new(db.clone())
        .find_by_id(owner_id)
        .await?
        .is_none()
    {
        return Err(PortalError::NotFound("Profile"));
    }
    Ok(SqlWalletRepository::new(db.clone())
        .credit(owner_id, credit.amount, credit.description.as_deref())
        .await?)
}

// --- Partner ---

pub async fn request_withdrawal(
    db: &DbClient,
    owner_id: &str,
    request: NewWithdrawal,
) -> Result<WithdrawalRequest, PortalError> {
    require_positive(request.amount, "amount")?;
    Ok(SqlWalletRepository::new(db.clone())
        .create_withdrawal(owner_id, request.amount)
        .await?)
}

// --- Call centre ---

pub async fn lookup_card(db: &DbClient, card_number: &str) -> Result<MembershipView, PortalError> {
    SqlMembershipRepository::new(db.clone())
        .find_by_card_number(card_number.trim())
        .await?
        .ok_or(PortalError::NotFound("E-card"))
}

pub async fn service_queue(
    db: &DbClient,
    query: QueueQuery,
) -> Result<Vec<ServiceRequest>, PortalError> {
    let status = query
        .status
        .as_deref()
        .map(parse_status::<ServiceRequestStatus>)
        .transpose()?;
    Ok(SqlServiceRequestRepository::new(db.clone())
        .list(status)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(percent: f64) -> Coupon {
        Coupon {
            id: "c1".to_string(),
            code: "SAVE10".to_string(),
            discount_percent: percent,
            max_uses: None,
            used_count: 0,
            valid_until: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn plan(price: f64) -> Plan {
        Plan {
            id: "p1".to_string(),
            name: "Gold".to_string(),
            description: None,
            price,
            duration_months: 12,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_coupon_to_plan() {
        let preview = apply_coupon(&coupon(10.0), Some(&plan(999.0)));
        assert_eq!(preview.discount_amount, Some(99.9));
        assert_eq!(preview.discounted_price, Some(899.1));
        assert_eq!(preview.total_with_tax, Some(1061.0));
        assert_eq!(preview.plan_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_apply_coupon_without_plan_only_reports_discount() {
        let preview = apply_coupon(&coupon(25.0), None);
        assert_eq!(preview.discount_percent, 25.0);
        assert!(preview.discounted_price.is_none());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive(1.0, "amount").is_ok());
        assert!(require_positive(0.0, "amount").is_err());
        assert!(require_positive(-5.0, "amount").is_err());
        assert!(require_positive(f64::NAN, "amount").is_err());
    }

    #[test]
    fn test_parse_status_rejects_unknown_value() {
        let err = parse_status::<ClaimStatus>("done").unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert_eq!(
            parse_status::<ServiceRequestStatus>("in_progress").unwrap(),
            ServiceRequestStatus::InProgress
        );
        assert_eq!(parse_role("call_centre").unwrap(), Role::CallCentre);
    }
}
