//! Tax invoices issued on purchase.

use crate::error::DbError;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub user_id: String,
    pub payment_id: String,
    pub membership_id: Option<String>,
    pub base_amount: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub issued_at: DateTime<Utc>,
}

impl Invoice {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            invoice_number: row.try_get("invoice_number")?,
            user_id: row.try_get("user_id")?,
            payment_id: row.try_get("payment_id")?,
            membership_id: rows::optional(row, "membership_id")?,
            base_amount: row.try_get("base_amount")?,
            tax_rate: row.try_get("tax_rate")?,
            tax_amount: row.try_get("tax_amount")?,
            total_amount: row.try_get("total_amount")?,
            issued_at: rows::timestamp(row, "issued_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqlInvoiceRepository {
    db_client: DbClient,
}

impl SqlInvoiceRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn create(&self, invoice: Invoice) -> Result<Invoice, DbError> {
        sqlx::query(
            r#"
            INSERT INTO invoices
                (id, invoice_number, user_id, payment_id, membership_id,
                 base_amount, tax_rate, tax_amount, total_amount, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.user_id)
        .bind(&invoice.payment_id)
        .bind(&invoice.membership_id)
        .bind(invoice.base_amount)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_amount)
        .bind(invoice.total_amount)
        .bind(to_db_timestamp(&invoice.issued_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert invoice"))?;

        info!("Invoice {} issued", invoice.invoice_number);
        Ok(invoice)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Invoice>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_number, user_id, payment_id, membership_id,
                   base_amount, tax_rate, tax_amount, total_amount, issued_at
            FROM invoices
            WHERE user_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_failed("list invoices for user"))?;
        rows::decode_all(rows, Invoice::from_row)
    }
}
