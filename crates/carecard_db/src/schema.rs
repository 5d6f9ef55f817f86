//! Table definitions.
//!
//! The DDL sticks to types SQLite and PostgreSQL both accept: ids and
//! timestamps are TEXT (UUIDs, RFC 3339), money is DOUBLE PRECISION, flags are
//! BIGINT 0/1 because the `Any` driver cannot decode SQLite booleans.

use crate::client::DbClient;
use crate::error::DbError;
use tracing::{debug, info};

const STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS cities (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        state TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS departments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS franchises (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        city_id TEXT REFERENCES cities(id),
        owner_id TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        full_name TEXT,
        email TEXT,
        phone TEXT,
        role TEXT NOT NULL DEFAULT 'customer',
        city_id TEXT REFERENCES cities(id),
        franchise_id TEXT REFERENCES franchises(id),
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS plans (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price DOUBLE PRECISION NOT NULL,
        duration_months BIGINT NOT NULL DEFAULT 12,
        is_active BIGINT NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS ecard_members (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        plan_id TEXT NOT NULL REFERENCES plans(id),
        card_number TEXT NOT NULL UNIQUE,
        member_name TEXT,
        status TEXT NOT NULL,
        start_date TEXT NOT NULL,
        expiry_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS payments (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        plan_id TEXT NOT NULL REFERENCES plans(id),
        membership_id TEXT REFERENCES ecard_members(id),
        amount DOUBLE PRECISION NOT NULL,
        currency TEXT NOT NULL,
        method TEXT NOT NULL,
        status TEXT NOT NULL,
        transaction_id TEXT NOT NULL,
        gateway_order_id TEXT,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        invoice_number TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        payment_id TEXT NOT NULL REFERENCES payments(id),
        membership_id TEXT REFERENCES ecard_members(id),
        base_amount DOUBLE PRECISION NOT NULL,
        tax_rate DOUBLE PRECISION NOT NULL,
        tax_amount DOUBLE PRECISION NOT NULL,
        total_amount DOUBLE PRECISION NOT NULL,
        issued_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS payment_settings (
        id TEXT PRIMARY KEY,
        provider TEXT NOT NULL UNIQUE,
        is_enabled BIGINT NOT NULL DEFAULT 0,
        key_id TEXT,
        key_secret TEXT,
        currency TEXT NOT NULL DEFAULT 'INR',
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS coupons (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        discount_percent DOUBLE PRECISION NOT NULL,
        max_uses BIGINT,
        used_count BIGINT NOT NULL DEFAULT 0,
        valid_until TEXT,
        is_active BIGINT NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS service_requests (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        membership_id TEXT REFERENCES ecard_members(id),
        service_type TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS reimbursement_claims (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES profiles(id),
        membership_id TEXT NOT NULL REFERENCES ecard_members(id),
        amount DOUBLE PRECISION NOT NULL,
        description TEXT,
        status TEXT NOT NULL,
        admin_notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS wallets (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL UNIQUE REFERENCES profiles(id),
        balance DOUBLE PRECISION NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS wallet_transactions (
        id TEXT PRIMARY KEY,
        wallet_id TEXT NOT NULL REFERENCES wallets(id),
        amount DOUBLE PRECISION NOT NULL,
        kind TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS withdrawal_requests (
        id TEXT PRIMARY KEY,
        wallet_id TEXT NOT NULL REFERENCES wallets(id),
        owner_id TEXT NOT NULL REFERENCES profiles(id),
        amount DOUBLE PRECISION NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_ecard_members_user ON ecard_members(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_user ON payments(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_invoices_user ON invoices(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_service_requests_status ON service_requests(status)",
    "CREATE INDEX IF NOT EXISTS idx_claims_user ON reimbursement_claims(user_id)",
];

/// Create every table and index if it does not exist yet.
pub async fn init_schema(db: &DbClient) -> Result<(), DbError> {
    debug!("Initializing schema ({} statements)", STATEMENTS.len());
    for statement in STATEMENTS {
        db.execute(statement).await?;
    }
    info!("Database schema initialized successfully");
    Ok(())
}
