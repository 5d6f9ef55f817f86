//! Payment records.

use crate::error::DbError;
use crate::repositories::status::PaymentStatus;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub membership_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub method: String,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub gateway_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            plan_id: row.try_get("plan_id")?,
            membership_id: rows::optional(row, "membership_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            method: row.try_get("method")?,
            status: rows::status(row, "status")?,
            transaction_id: row.try_get("transaction_id")?,
            gateway_order_id: rows::optional(row, "gateway_order_id")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

const COLUMNS: &str = "id, user_id, plan_id, membership_id, amount, currency, method, status, \
                       transaction_id, gateway_order_id, created_at";

#[derive(Debug, Clone)]
pub struct SqlPaymentRepository {
    db_client: DbClient,
}

impl SqlPaymentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn create(&self, payment: Payment) -> Result<Payment, DbError> {
        debug!(
            "Recording {} payment {} of {} {}",
            payment.method, payment.transaction_id, payment.amount, payment.currency
        );
        sqlx::query(
            r#"
            INSERT INTO payments
                (id, user_id, plan_id, membership_id, amount, currency, method, status,
                 transaction_id, gateway_order_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.user_id)
        .bind(&payment.plan_id)
        .bind(&payment.membership_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.method)
        .bind(payment.status.as_str())
        .bind(&payment.transaction_id)
        .bind(&payment.gateway_order_id)
        .bind(to_db_timestamp(&payment.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert payment"))?;

        info!("Payment {} recorded", payment.id);
        Ok(payment)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Payment>, DbError> {
        let query =
            format!("SELECT {COLUMNS} FROM payments WHERE user_id = $1 ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list payments for user"))?;
        rows::decode_all(rows, Payment::from_row)
    }

    pub async fn list_all(&self) -> Result<Vec<Payment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM payments ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list payments"))?;
        rows::decode_all(rows, Payment::from_row)
    }

    /// Sum of completed payment amounts.
    pub async fn total_revenue(&self) -> Result<f64, DbError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0.0) AS total FROM payments WHERE status = $1",
        )
        .bind(PaymentStatus::Completed.as_str())
        .fetch_one(self.db_client.pool())
        .await
        .map_err(query_failed("sum revenue"))?;
        Ok(row.try_get("total")?)
    }
}
