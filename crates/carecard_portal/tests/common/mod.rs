#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use carecard_common::auth::encode_token;
use carecard_common::{Claims, JwtVerifier, Role};
use carecard_config::{AppConfig, AuthConfig};
use carecard_db::{
    init_schema, new_id, DbClient, EcardMember, MembershipStatus, Plan, Profile, Repository,
    SqlMembershipRepository, SqlPlanRepository, SqlProfileRepository,
};
use carecard_portal::{routes, PortalState};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "portal-test-secret";

pub async fn test_db() -> DbClient {
    let db = DbClient::from_url("sqlite::memory:").await.unwrap();
    init_schema(&db).await.unwrap();
    db
}

pub fn app(db: &DbClient) -> Router {
    let mut config = AppConfig::default();
    config.auth = AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        audience: None,
    };
    let jwt = JwtVerifier::new(&config.auth).unwrap();
    routes(PortalState {
        config: Arc::new(config),
        db: db.clone(),
        jwt,
    })
}

pub fn bearer(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
        email: Some(format!("{sub}@example.com")),
        aud: None,
    };
    format!("Bearer {}", encode_token(JWT_SECRET, &claims).unwrap())
}

pub async fn seed_profile(db: &DbClient, id: &str, role: Role) -> Profile {
    SqlProfileRepository::new(db.clone())
        .create(Profile {
            id: id.to_string(),
            full_name: Some(format!("{id} name")),
            email: Some(format!("{id}@example.com")),
            phone: None,
            role,
            city_id: None,
            franchise_id: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

pub async fn seed_plan(db: &DbClient, price: f64) -> Plan {
    SqlPlanRepository::new(db.clone())
        .create(Plan {
            id: new_id(),
            name: "Silver Care".to_string(),
            description: None,
            price,
            duration_months: 12,
            is_active: true,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}

/// Membership for `user_id`; negative `days_left` gives an expired card.
pub async fn seed_membership(
    db: &DbClient,
    user_id: &str,
    plan_id: &str,
    card_number: &str,
    days_left: i64,
) -> EcardMember {
    let now = Utc::now();
    SqlMembershipRepository::new(db.clone())
        .create(EcardMember {
            id: new_id(),
            user_id: user_id.to_string(),
            plan_id: plan_id.to_string(),
            card_number: card_number.to_string(),
            member_name: Some("Asha Rao".to_string()),
            status: MembershipStatus::Active,
            start_date: now - Duration::days(30),
            expiry_date: now + Duration::days(days_left),
            created_at: now,
        })
        .await
        .unwrap()
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
