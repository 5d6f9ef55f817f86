mod common;

use carecard_checkout::logic::{create_order, purchase, CreateOrderRequest, PurchaseRequest};
use carecard_checkout::CheckoutError;
use carecard_common::{CarecardError, HttpStatusCode};
use carecard_db::{
    DbError, MembershipStatus, PaymentStatus, SqlInvoiceRepository, SqlMembershipRepository,
    SqlPaymentRepository, SqlProfileRepository,
};
use chrono::{Datelike, Months};
use common::{enable_gateway, seed_plan, test_config, test_db, user, FakeGateway};

fn test_purchase(plan_id: &str) -> PurchaseRequest {
    PurchaseRequest {
        plan_id: Some(plan_id.to_string()),
        payment_method: Some("test".to_string()),
        member_name: Some("Asha Rao".to_string()),
        ..Default::default()
    }
}

fn gateway_purchase(plan_id: &str, signature: Option<String>) -> PurchaseRequest {
    PurchaseRequest {
        plan_id: Some(plan_id.to_string()),
        payment_method: Some("gateway".to_string()),
        razorpay_order_id: Some("order_abc".to_string()),
        razorpay_payment_id: Some("pay_xyz".to_string()),
        razorpay_signature: signature,
        member_name: None,
    }
}

#[tokio::test]
async fn test_disabled_gateway_records_test_payment() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    let config = test_config(false);

    let summary = purchase(&config, &db, &FakeGateway::default(), &user(), test_purchase(&plan.id))
        .await
        .unwrap();

    assert_eq!(summary.status, "completed");
    assert!(summary.test_mode);
    assert!(summary.transaction_id.starts_with("TEST_"));
    assert_eq!(summary.payment.status, PaymentStatus::Completed);
    assert_eq!(summary.payment.transaction_id, summary.transaction_id);
    assert_eq!(summary.payment.amount, 1179.0);
    assert_eq!(summary.membership.status, MembershipStatus::Active);
    assert_eq!(summary.membership.member_name.as_deref(), Some("Asha Rao"));

    let invoice = summary.invoice.expect("invoice recorded");
    assert_eq!(invoice.base_amount, 999.0);
    assert_eq!(invoice.total_amount, 1179.0);
    assert_eq!(invoice.tax_amount, 180.0);
    assert_eq!(invoice.tax_rate, 0.18);
    assert!(invoice.invoice_number.starts_with("INV-"));
}

#[tokio::test]
async fn test_gateway_method_ignored_while_gateway_disabled() {
    let db = test_db().await;
    let plan = seed_plan(&db, 499.0).await;

    // Runtime flag on, but no enabled settings row.
    let summary = purchase(
        &test_config(true),
        &db,
        &FakeGateway::default(),
        &user(),
        gateway_purchase(&plan.id, None),
    )
    .await
    .unwrap();
    assert!(summary.transaction_id.starts_with("TEST_"));

    // Settings row enabled, but runtime flag off.
    enable_gateway(&db).await;
    let summary = purchase(
        &test_config(false),
        &db,
        &FakeGateway::default(),
        &user(),
        gateway_purchase(&plan.id, None),
    )
    .await
    .unwrap();
    assert!(summary.transaction_id.starts_with("TEST_"));
}

#[tokio::test]
async fn test_missing_or_unknown_plan_is_not_found() {
    let db = test_db().await;
    let config = test_config(false);

    let err = purchase(&config, &db, &FakeGateway::default(), &user(), PurchaseRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PlanNotFound));
    assert_eq!(err.status_code(), 404);

    let err = purchase(&config, &db, &FakeGateway::default(), &user(), test_purchase("no-such-plan"))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::PlanNotFound));

    // Nothing was written.
    let payments = SqlPaymentRepository::new(db.clone()).list_all().await.unwrap();
    assert!(payments.is_empty());
}

#[tokio::test]
async fn test_invoice_total_is_rounded_price_with_tax() {
    let db = test_db().await;
    let config = test_config(false);

    for (price, expected_total) in [(25.0, 30.0), (999.0, 1179.0), (1499.0, 1769.0), (4999.0, 5899.0)] {
        let plan = seed_plan(&db, price).await;
        let summary =
            purchase(&config, &db, &FakeGateway::default(), &user(), test_purchase(&plan.id))
                .await
                .unwrap();
        let invoice = summary.invoice.unwrap();
        assert_eq!(invoice.total_amount, expected_total, "price {price}");
        assert_eq!(invoice.total_amount, (price * 1.18_f64).round(), "price {price}");
        assert_eq!(invoice.tax_amount, expected_total - price);
    }
}

#[tokio::test]
async fn test_expiry_is_one_year_after_start() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    let summary = purchase(
        &test_config(false),
        &db,
        &FakeGateway::default(),
        &user(),
        test_purchase(&plan.id),
    )
    .await
    .unwrap();

    let m = &summary.membership;
    assert_eq!(m.start_date.checked_add_months(Months::new(12)), Some(m.expiry_date));
    assert_eq!(m.expiry_date.year(), m.start_date.year() + 1);

    // The stored row reads back with the same window.
    let stored = SqlMembershipRepository::new(db.clone())
        .find_by_id(&m.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.start_date.checked_add_months(Months::new(12)),
        Some(stored.expiry_date)
    );
}

#[tokio::test]
async fn test_purchase_creates_profile_and_links_rows() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    let summary = purchase(
        &test_config(false),
        &db,
        &FakeGateway::default(),
        &user(),
        test_purchase(&plan.id),
    )
    .await
    .unwrap();

    let profile = SqlProfileRepository::new(db.clone())
        .find_by_id("user-1")
        .await
        .unwrap();
    assert!(profile.is_some());

    assert_eq!(summary.payment.membership_id.as_deref(), Some(summary.membership.id.as_str()));
    let invoices = SqlInvoiceRepository::new(db.clone())
        .list_for_user("user-1")
        .await
        .unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].payment_id, summary.payment.id);
}

#[tokio::test]
async fn test_double_submit_creates_two_memberships() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    let config = test_config(false);
    let gateway = FakeGateway::default();

    let first = purchase(&config, &db, &gateway, &user(), test_purchase(&plan.id))
        .await
        .unwrap();
    let second = purchase(&config, &db, &gateway, &user(), test_purchase(&plan.id))
        .await
        .unwrap();

    assert_ne!(first.membership.card_number, second.membership.card_number);
    let memberships = SqlMembershipRepository::new(db.clone())
        .list_for_user("user-1")
        .await
        .unwrap();
    assert_eq!(memberships.len(), 2);
}

#[tokio::test]
async fn test_enabled_gateway_uses_payment_id() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    enable_gateway(&db).await;

    let summary = purchase(
        &test_config(true),
        &db,
        &FakeGateway::default(),
        &user(),
        gateway_purchase(&plan.id, None),
    )
    .await
    .unwrap();

    assert!(!summary.test_mode);
    assert_eq!(summary.transaction_id, "pay_xyz");
    assert_eq!(summary.payment.method, "razorpay");
    assert_eq!(summary.payment.gateway_order_id.as_deref(), Some("order_abc"));
}

#[tokio::test]
async fn test_enabled_gateway_requires_payment_id() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    enable_gateway(&db).await;

    let mut request = gateway_purchase(&plan.id, None);
    request.razorpay_payment_id = None;
    let err = purchase(&test_config(true), &db, &FakeGateway::default(), &user(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::MissingPaymentId));
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_signature_verification_when_enabled() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    enable_gateway(&db).await;
    let mut config = test_config(true);
    config.razorpay.verify_signatures = true;
    let gateway = FakeGateway::default();

    let good = FakeGateway::signature("order_abc", "pay_xyz", "rzp_test_secret");
    let summary = purchase(&config, &db, &gateway, &user(), gateway_purchase(&plan.id, Some(good)))
        .await
        .unwrap();
    assert_eq!(summary.transaction_id, "pay_xyz");

    let err = purchase(
        &config,
        &db,
        &gateway,
        &user(),
        gateway_purchase(&plan.id, Some("forged".to_string())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CheckoutError::SignatureMismatch));
    assert_eq!(err.status_code(), 401);

    let err = purchase(&config, &db, &gateway, &user(), gateway_purchase(&plan.id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::SignatureMismatch));
}

#[tokio::test]
async fn test_invoice_failure_still_completes_purchase() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    db.execute("DROP TABLE invoices").await.unwrap();

    let summary = purchase(
        &test_config(false),
        &db,
        &FakeGateway::default(),
        &user(),
        test_purchase(&plan.id),
    )
    .await
    .unwrap();

    assert!(summary.invoice.is_none());
    assert_eq!(summary.status, "completed");
    let payments = SqlPaymentRepository::new(db.clone()).list_all().await.unwrap();
    assert_eq!(payments.len(), 1);
}

#[tokio::test]
async fn test_membership_insert_failure_surfaces_database_error() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    db.execute("DROP TABLE ecard_members").await.unwrap();

    let err = purchase(
        &test_config(false),
        &db,
        &FakeGateway::default(),
        &user(),
        test_purchase(&plan.id),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CheckoutError::Database(DbError::QueryError(_))));
    assert_eq!(err.status_code(), 500);
    let common: CarecardError = err.into();
    assert!(common.to_string().contains("ecard_members"), "{common}");
}

#[tokio::test]
async fn test_create_order_disabled_gateway() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    let gateway = FakeGateway::default();

    let response = create_order(
        &test_config(false),
        &db,
        &gateway,
        &user(),
        CreateOrderRequest {
            plan_id: Some(plan.id.clone()),
        },
    )
    .await
    .unwrap();

    assert!(!response.gateway_enabled);
    assert!(response.order_id.is_none());
    assert!(gateway.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_order_charges_total_in_paise() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    enable_gateway(&db).await;
    let gateway = FakeGateway::default();

    let response = create_order(
        &test_config(true),
        &db,
        &gateway,
        &user(),
        CreateOrderRequest {
            plan_id: Some(plan.id.clone()),
        },
    )
    .await
    .unwrap();

    assert!(response.gateway_enabled);
    assert_eq!(response.order_id.as_deref(), Some("order_test_123"));
    assert_eq!(response.amount, Some(117_900));
    assert_eq!(response.key_id.as_deref(), Some("rzp_test_key"));

    let orders = gateway.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    let (credentials, order) = &orders[0];
    assert_eq!(credentials.key_secret, "rzp_test_secret");
    assert_eq!(order.currency, "INR");
    assert!(order.receipt.starts_with("rcpt_"));
    assert_eq!(order.notes.get("plan_id"), Some(&plan.id));
}

#[tokio::test]
async fn test_create_order_gateway_failure_is_bad_gateway() {
    let db = test_db().await;
    let plan = seed_plan(&db, 999.0).await;
    enable_gateway(&db).await;

    let err = create_order(
        &test_config(true),
        &db,
        &FakeGateway::failing(),
        &user(),
        CreateOrderRequest {
            plan_id: Some(plan.id),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 502);
}
