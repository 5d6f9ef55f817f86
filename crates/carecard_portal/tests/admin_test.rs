mod common;

use carecard_common::Role;
use carecard_db::{
    new_id, Payment, PaymentStatus, SqlPaymentRepository, SqlProfileRepository,
    SqlServiceRequestRepository, SqlWalletRepository,
};
use chrono::Utc;
use common::{app, bearer, seed_membership, seed_plan, seed_profile, send, test_db};
use serde_json::json;

async fn admin_app() -> (axum::Router, carecard_db::DbClient, String) {
    let db = test_db().await;
    seed_profile(&db, "admin-1", Role::Admin).await;
    (app(&db), db, bearer("admin-1"))
}

#[tokio::test]
async fn test_dashboard_counts_and_revenue() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "cust", Role::Customer).await;
    let plan = seed_plan(&db, 999.0).await;
    let active = seed_membership(&db, "cust", &plan.id, "CC000000000001", 200).await;
    seed_membership(&db, "cust", &plan.id, "CC000000000002", 100).await;
    SqlPaymentRepository::new(db.clone())
        .create(Payment {
            id: new_id(),
            user_id: "cust".to_string(),
            plan_id: plan.id.clone(),
            membership_id: Some(active.id.clone()),
            amount: 1179.0,
            currency: "INR".to_string(),
            method: "card".to_string(),
            status: PaymentStatus::Completed,
            transaction_id: "TEST_1".to_string(),
            gateway_order_id: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/me/service-requests",
        Some(&bearer("cust")),
        Some(json!({ "service_type": "ambulance" })),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = send(&app, "GET", "/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["total_members"], 2);
    assert_eq!(body["data"]["active_members"], 2);
    assert_eq!(body["data"]["pending_service_requests"], 1);
    assert_eq!(body["data"]["open_claims"], 0);
    assert_eq!(body["data"]["pending_withdrawals"], 0);
    assert_eq!(body["data"]["revenue"], 1179.0);

    let (status, body) = send(&app, "GET", "/admin/members", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "GET", "/admin/payments", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["transaction_id"], "TEST_1");
}

#[tokio::test]
async fn test_status_updates_reject_unknown_values_and_ids() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "cust", Role::Customer).await;
    let (_, created) = send(
        &app,
        "POST",
        "/me/service-requests",
        Some(&bearer("cust")),
        Some(json!({ "service_type": "home visit" })),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/admin/service-requests/{id}"),
        Some(&token),
        Some(json!({ "status": "done" })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        "PATCH",
        "/admin/service-requests/missing",
        Some(&token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, 404);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/admin/service-requests/{id}"),
        Some(&token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "in_progress");

    let (status, _) = send(
        &app,
        "PATCH",
        "/admin/claims/missing",
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_claim_review_keeps_notes() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "cust", Role::Customer).await;
    let plan = seed_plan(&db, 999.0).await;
    let membership = seed_membership(&db, "cust", &plan.id, "CC000000000003", 300).await;

    let (status, created) = send(
        &app,
        "POST",
        "/me/claims",
        Some(&bearer("cust")),
        Some(json!({ "membership_id": membership.id, "amount": 2500.0 })),
    )
    .await;
    assert_eq!(status, 201);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/admin/claims/{id}"),
        Some(&token),
        Some(json!({ "status": "under_review", "admin_notes": "bills requested" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["admin_notes"], "bills requested");

    let (_, body) = send(
        &app,
        "PATCH",
        &format!("/admin/claims/{id}"),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["admin_notes"], "bills requested");
}

#[tokio::test]
async fn test_withdrawal_approval_debits_once_and_never_overdraws() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "pt", Role::Partner).await;
    let partner = bearer("pt");

    let (status, _) = send(
        &app,
        "POST",
        "/admin/wallets/pt/credit",
        Some(&token),
        Some(json!({ "amount": 500.0, "description": "commission" })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, first) = send(
        &app,
        "POST",
        "/partner/withdrawals",
        Some(&partner),
        Some(json!({ "amount": 400.0 })),
    )
    .await;
    assert_eq!(status, 201);
    let (status, second) = send(
        &app,
        "POST",
        "/partner/withdrawals",
        Some(&partner),
        Some(json!({ "amount": 300.0 })),
    )
    .await;
    assert_eq!(status, 201);

    let first_id = first["data"]["id"].as_str().unwrap().to_string();
    let second_id = second["data"]["id"].as_str().unwrap().to_string();

    let approve = json!({ "status": "approved" });
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/admin/withdrawals/{first_id}"),
        Some(&token),
        Some(approve.clone()),
    )
    .await;
    assert_eq!(status, 200);

    // Approving again must not debit twice.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/admin/withdrawals/{first_id}"),
        Some(&token),
        Some(approve.clone()),
    )
    .await;
    assert_eq!(status, 200);

    // Approved is final.
    for status_value in ["rejected", "pending"] {
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/admin/withdrawals/{first_id}"),
            Some(&token),
            Some(json!({ "status": status_value })),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], 400);
    }

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/admin/withdrawals/{second_id}"),
        Some(&token),
        Some(approve),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let wallet = SqlWalletRepository::new(db.clone())
        .find_by_owner("pt")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.balance, 100.0);

    let (_, body) = send(&app, "GET", "/partner/wallet/transactions", Some(&partner), None).await;
    let kinds: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.iter().filter(|k| **k == "debit").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "credit").count(), 1);

    let (_, body) = send(&app, "GET", "/admin/dashboard", Some(&token), None).await;
    assert_eq!(body["data"]["pending_withdrawals"], 1);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let (app, _db, token) = admin_app().await;
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/admin/plans")
        .header(axum::http::header::AUTHORIZATION, &token)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"name\": \"Gold\", \"price\": "))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn test_wallet_credit_validation() {
    let (app, _db, token) = admin_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/admin/wallets/nobody/credit",
        Some(&token),
        Some(json!({ "amount": 50.0 })),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/wallets/admin-1/credit",
        Some(&token),
        Some(json!({ "amount": -5.0 })),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_plan_create_and_patch() {
    let (app, _db, token) = admin_app().await;

    let (status, created) = send(
        &app,
        "POST",
        "/admin/plans",
        Some(&token),
        Some(json!({ "name": "Senior Care", "price": 1499.0 })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(created["data"]["duration_months"], 12);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/admin/plans/{id}"),
        Some(&token),
        Some(json!({ "price": 1299.0, "is_active": false })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["price"], 1299.0);
    assert_eq!(body["data"]["is_active"], false);
    assert_eq!(body["data"]["name"], "Senior Care");

    let (status, _) = send(
        &app,
        "POST",
        "/admin/plans",
        Some(&token),
        Some(json!({ "name": "  ", "price": 10.0 })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        "PATCH",
        "/admin/plans/missing",
        Some(&token),
        Some(json!({ "price": 1.0 })),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_coupon_codes_are_unique_ignoring_case() {
    let (app, _db, token) = admin_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/admin/coupons",
        Some(&token),
        Some(json!({ "code": "welcome10", "discount_percent": 10.0 })),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["code"], "WELCOME10");

    let (status, _) = send(
        &app,
        "POST",
        "/admin/coupons",
        Some(&token),
        Some(json!({ "code": "WELCOME10", "discount_percent": 15.0 })),
    )
    .await;
    assert_eq!(status, 409);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/coupons",
        Some(&token),
        Some(json!({ "code": "BIG", "discount_percent": 120.0 })),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_payment_settings_hide_secret() {
    let (app, _db, token) = admin_app().await;

    let (status, body) = send(
        &app,
        "PUT",
        "/admin/payment-settings",
        Some(&token),
        Some(json!({ "is_enabled": true, "key_id": "rzp_live_x", "key_secret": "shh" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["is_enabled"], true);
    assert_eq!(body["data"]["currency"], "INR");
    assert!(body["data"].get("key_secret").is_none());
}

#[tokio::test]
async fn test_franchise_creation_promotes_owner() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "owner", Role::Customer).await;

    let (status, body) = send(
        &app,
        "POST",
        "/admin/franchises",
        Some(&token),
        Some(json!({ "name": "Pune West", "owner_id": "owner" })),
    )
    .await;
    assert_eq!(status, 201);
    let franchise_id = body["data"]["id"].as_str().unwrap().to_string();

    let owner = SqlProfileRepository::new(db.clone())
        .find_by_id("owner")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.role, Role::Franchise);
    assert_eq!(owner.franchise_id.as_deref(), Some(franchise_id.as_str()));

    let (status, _) = send(&app, "GET", "/partner/wallet", Some(&bearer("owner")), None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_role_assignment() {
    let (app, db, token) = admin_app().await;
    seed_profile(&db, "agent", Role::Customer).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/admin/profiles/agent/role",
        Some(&token),
        Some(json!({ "role": "superuser" })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = send(
        &app,
        "PUT",
        "/admin/profiles/agent/role",
        Some(&token),
        Some(json!({ "role": "call_centre" })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["role"], "call_centre");

    let queue = SqlServiceRequestRepository::new(db.clone());
    assert!(queue.list(None).await.unwrap().is_empty());
    let (status, _) = send(
        &app,
        "GET",
        "/callcentre/service-requests",
        Some(&bearer("agent")),
        None,
    )
    .await;
    assert_eq!(status, 200);
}
