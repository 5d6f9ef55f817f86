// --- File: crates/carecard_checkout/src/logic.rs ---

use std::collections::HashMap;

use carecard_common::{AuthUser, GatewayCredentials, GatewayOrderRequest, PaymentGateway};
use carecard_config::{AppConfig, InvoiceConfig};
use carecard_db::{
    new_id, DbClient, EcardMember, Invoice, MembershipStatus, Payment, PaymentSettings,
    PaymentStatus, Plan, Repository, SqlInvoiceRepository, SqlMembershipRepository,
    SqlPaymentRepository, SqlPaymentSettingsRepository, SqlPlanRepository, SqlProfileRepository,
    RAZORPAY_PROVIDER,
};
use chrono::{DateTime, Months, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::CheckoutError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Flat GST applied to every plan.
pub const TAX_RATE: f64 = 0.18;
/// Membership validity in calendar months.
pub const VALIDITY_MONTHS: u32 = 12;
/// `payment_method` value that selects the gateway path.
pub const GATEWAY_METHOD: &str = "gateway";
/// Prefix of transaction ids recorded without a real payment.
pub const TEST_TRANSACTION_PREFIX: &str = "TEST_";
pub const DEFAULT_CURRENCY: &str = "INR";

// --- Request / Response Structures ---

#[derive(Deserialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PurchaseRequest {
    #[cfg_attr(feature = "openapi", schema(example = "3f2c9a1e-6b7d-4e3a-9f0c-1d2e3f4a5b6c"))]
    pub plan_id: Option<String>,
    /// `"gateway"` for a Razorpay payment; anything else records a test payment.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "gateway"))]
    pub payment_method: Option<String>,
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    /// Name printed on the card; defaults to none.
    pub member_name: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PurchaseSummary {
    #[cfg_attr(feature = "openapi", schema(example = "completed"))]
    pub status: String,
    pub transaction_id: String,
    pub test_mode: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub membership: EcardMember,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub payment: Payment,
    /// `null` when the invoice could not be written.
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub invoice: Option<Invoice>,
}

#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateOrderRequest {
    pub plan_id: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateOrderResponse {
    pub gateway_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Amount in paise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Public key id the client SDK needs to open the checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl CreateOrderResponse {
    fn disabled() -> Self {
        Self {
            gateway_enabled: false,
            order_id: None,
            amount: None,
            currency: None,
            key_id: None,
        }
    }
}

/// Tax breakdown for one plan price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub base_amount: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

// --- Pure helpers ---

/// `total = round(price × 1.18)`, `tax = total − price`.
///
/// Scaling by 118 first keeps whole-rupee prices exact, so halves round up
/// instead of drifting with the binary value of 1.18.
pub fn compute_pricing(price: f64) -> Pricing {
    let total_amount = (price * 118.0 / 100.0).round();
    Pricing {
        base_amount: price,
        tax_rate: TAX_RATE,
        tax_amount: total_amount - price,
        total_amount,
    }
}

/// Start and expiry of a membership bought at `start`.
pub fn validity_window(
    start: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), CheckoutError> {
    let expiry = start
        .checked_add_months(Months::new(VALIDITY_MONTHS))
        .ok_or(CheckoutError::InvalidValidityWindow)?;
    Ok((start, expiry))
}

pub fn test_transaction_id() -> String {
    format!("{}{}", TEST_TRANSACTION_PREFIX, Uuid::new_v4())
}

/// `CC` followed by 12 digits.
pub fn generate_card_number() -> String {
    let digits = Uuid::new_v4().as_u128() % 1_000_000_000_000;
    format!("CC{:012}", digits)
}

/// `{prefix}-{YYYYMMDD}-{8 hex}` with the date taken in the configured
/// invoice timezone.
pub fn generate_invoice_number(config: &InvoiceConfig, issued_at: DateTime<Utc>) -> String {
    let tz: Tz = config.timezone.parse().unwrap_or_else(|_| {
        warn!(
            "Unknown invoice timezone '{}', falling back to UTC",
            config.timezone
        );
        Tz::UTC
    });
    let local_date = issued_at.with_timezone(&tz).format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("{}-{}-{}", config.prefix, local_date, suffix)
}

/// Receipt id sent with a remote order.
pub fn generate_receipt() -> String {
    format!("rcpt_{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// The gateway is used only when the runtime flag is on and the provider row
/// is enabled.
pub fn gateway_enabled(config: &AppConfig, settings: Option<&PaymentSettings>) -> bool {
    config.use_razorpay && settings.is_some_and(|s| s.is_enabled)
}

fn key_secret<'a>(config: &'a AppConfig, settings: Option<&'a PaymentSettings>) -> Option<&'a str> {
    settings
        .and_then(|s| s.key_secret.as_deref())
        .or(config.razorpay.key_secret.as_deref())
        .filter(|s| !s.is_empty())
}

async fn find_plan(db: &DbClient, plan_id: Option<&str>) -> Result<Plan, CheckoutError> {
    let plan_id = plan_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(CheckoutError::PlanNotFound)?;
    SqlPlanRepository::new(db.clone())
        .read(plan_id)
        .await?
        .ok_or(CheckoutError::PlanNotFound)
}

// --- Checkout Logic ---

/// How the purchase is paid for, once the request has been checked.
struct PaymentSource {
    method: &'static str,
    transaction_id: String,
    gateway_order_id: Option<String>,
    test_mode: bool,
}

fn resolve_payment_source(
    config: &AppConfig,
    settings: Option<&PaymentSettings>,
    gateway: &dyn PaymentGateway,
    request: &PurchaseRequest,
) -> Result<PaymentSource, CheckoutError> {
    let wants_gateway = request.payment_method.as_deref() == Some(GATEWAY_METHOD);
    if !(wants_gateway && gateway_enabled(config, settings)) {
        return Ok(PaymentSource {
            method: "test",
            transaction_id: test_transaction_id(),
            gateway_order_id: None,
            test_mode: true,
        });
    }

    let payment_id = request
        .razorpay_payment_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(CheckoutError::MissingPaymentId)?;

    if config.razorpay.verify_signatures {
        let (Some(order_id), Some(signature)) = (
            request.razorpay_order_id.as_deref(),
            request.razorpay_signature.as_deref(),
        ) else {
            return Err(CheckoutError::SignatureMismatch);
        };
        let secret = key_secret(config, settings).ok_or(CheckoutError::MissingCredentials)?;
        if !gateway.verify_payment_signature(order_id, payment_id, signature, secret) {
            return Err(CheckoutError::SignatureMismatch);
        }
    }

    Ok(PaymentSource {
        method: RAZORPAY_PROVIDER,
        transaction_id: payment_id.to_string(),
        gateway_order_id: request.razorpay_order_id.clone(),
        test_mode: false,
    })
}

/// Records a completed purchase: membership, payment, then invoice.
///
/// Membership and payment failures abort with the database error. An invoice
/// failure is only logged and the summary carries `invoice: None`. Nothing is
/// rolled back and repeated submits create repeated memberships.
pub async fn purchase(
    config: &AppConfig,
    db: &DbClient,
    gateway: &dyn PaymentGateway,
    user: &AuthUser,
    request: PurchaseRequest,
) -> Result<PurchaseSummary, CheckoutError> {
    let plan = find_plan(db, request.plan_id.as_deref()).await?;

    let settings = SqlPaymentSettingsRepository::new(db.clone())
        .find_by_provider(RAZORPAY_PROVIDER)
        .await?;
    let source = resolve_payment_source(config, settings.as_ref(), gateway, &request)?;
    let currency = settings
        .as_ref()
        .map(|s| s.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    SqlProfileRepository::new(db.clone())
        .find_or_create(&user.user_id, user.email.as_deref())
        .await?;

    let now = Utc::now();
    let (start_date, expiry_date) = validity_window(now)?;
    let pricing = compute_pricing(plan.price);

    let membership = SqlMembershipRepository::new(db.clone())
        .create(EcardMember {
            id: new_id(),
            user_id: user.user_id.clone(),
            plan_id: plan.id.clone(),
            card_number: generate_card_number(),
            member_name: request.member_name.clone(),
            status: MembershipStatus::Active,
            start_date,
            expiry_date,
            created_at: now,
        })
        .await?;

    let payment = SqlPaymentRepository::new(db.clone())
        .create(Payment {
            id: new_id(),
            user_id: user.user_id.clone(),
            plan_id: plan.id.clone(),
            membership_id: Some(membership.id.clone()),
            amount: pricing.total_amount,
            currency,
            method: source.method.to_string(),
            status: PaymentStatus::Completed,
            transaction_id: source.transaction_id.clone(),
            gateway_order_id: source.gateway_order_id,
            created_at: now,
        })
        .await?;

    let invoice = match SqlInvoiceRepository::new(db.clone())
        .create(Invoice {
            id: new_id(),
            invoice_number: generate_invoice_number(&config.invoice, now),
            user_id: user.user_id.clone(),
            payment_id: payment.id.clone(),
            membership_id: Some(membership.id.clone()),
            base_amount: pricing.base_amount,
            tax_rate: pricing.tax_rate,
            tax_amount: pricing.tax_amount,
            total_amount: pricing.total_amount,
            issued_at: now,
        })
        .await
    {
        Ok(invoice) => Some(invoice),
        Err(e) => {
            warn!(
                "Invoice for payment {} could not be recorded: {}",
                payment.id, e
            );
            None
        }
    };

    info!(
        "Purchase completed: user={} plan={} card={} txn={} test_mode={}",
        user.user_id, plan.id, membership.card_number, source.transaction_id, source.test_mode
    );

    Ok(PurchaseSummary {
        status: payment.status.to_string(),
        transaction_id: source.transaction_id,
        test_mode: source.test_mode,
        membership,
        payment,
        invoice,
    })
}

/// Creates the remote order the client SDK pays against. With the gateway
/// disabled the caller is told so and falls back to a test purchase.
pub async fn create_order(
    config: &AppConfig,
    db: &DbClient,
    gateway: &dyn PaymentGateway,
    user: &AuthUser,
    request: CreateOrderRequest,
) -> Result<CreateOrderResponse, CheckoutError> {
    let plan = find_plan(db, request.plan_id.as_deref()).await?;

    let settings = SqlPaymentSettingsRepository::new(db.clone())
        .find_by_provider(RAZORPAY_PROVIDER)
        .await?;
    let settings = match settings {
        Some(settings) if gateway_enabled(config, Some(&settings)) => settings,
        _ => {
            info!("Gateway disabled; plan {} will use test checkout", plan.id);
            return Ok(CreateOrderResponse::disabled());
        }
    };

    let key_id = settings
        .key_id
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or(CheckoutError::MissingCredentials)?;
    let key_secret = key_secret(config, Some(&settings))
        .ok_or(CheckoutError::MissingCredentials)?
        .to_string();

    let pricing = compute_pricing(plan.price);
    let order_request = GatewayOrderRequest {
        amount: (pricing.total_amount * 100.0).round() as i64,
        currency: settings.currency.clone(),
        receipt: generate_receipt(),
        notes: HashMap::from([
            ("plan_id".to_string(), plan.id.clone()),
            ("user_id".to_string(), user.user_id.clone()),
        ]),
    };

    let order = gateway
        .create_order(
            GatewayCredentials {
                key_id: key_id.clone(),
                key_secret,
            },
            order_request,
        )
        .await
        .map_err(CheckoutError::Gateway)?;

    info!("Order {} created for user {} plan {}", order.id, user.user_id, plan.id);
    Ok(CreateOrderResponse {
        gateway_enabled: true,
        order_id: Some(order.id),
        amount: Some(order.amount),
        currency: Some(order.currency),
        key_id: Some(key_id),
    })
}

pub async fn list_plans(db: &DbClient) -> Result<Vec<Plan>, CheckoutError> {
    Ok(SqlPlanRepository::new(db.clone()).list_active().await?)
}
