//! Payment-gateway settings, one row per provider.

use crate::error::DbError;
use crate::rows::{self, new_id, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

pub const RAZORPAY_PROVIDER: &str = "razorpay";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    pub id: String,
    pub provider: String,
    pub is_enabled: bool,
    pub key_id: Option<String>,
    #[serde(skip_serializing)]
    pub key_secret: Option<String>,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl PaymentSettings {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            provider: row.try_get("provider")?,
            is_enabled: rows::flag(row, "is_enabled")?,
            key_id: rows::optional(row, "key_id")?,
            key_secret: rows::optional(row, "key_secret")?,
            currency: row.try_get("currency")?,
            updated_at: rows::timestamp(row, "updated_at")?,
        })
    }
}

/// Admin edit of a provider row. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentSettingsUpdate {
    pub is_enabled: Option<bool>,
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SqlPaymentSettingsRepository {
    db_client: DbClient,
}

impl SqlPaymentSettingsRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn find_by_provider(
        &self,
        provider: &str,
    ) -> Result<Option<PaymentSettings>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT id, provider, is_enabled, key_id, key_secret, currency, updated_at
            FROM payment_settings
            WHERE provider = $1
            "#,
        )
        .bind(provider)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_failed("fetch payment settings"))?;
        Ok(row.as_ref().map(PaymentSettings::from_row).transpose()?)
    }

    /// Applies `update` to the provider row, creating it (disabled, INR) first
    /// if it is missing.
    pub async fn upsert(
        &self,
        provider: &str,
        update: &PaymentSettingsUpdate,
    ) -> Result<PaymentSettings, DbError> {
        let now = to_db_timestamp(&Utc::now());

        if self.find_by_provider(provider).await?.is_none() {
            debug!("No settings row for {}, inserting one", provider);
            sqlx::query(
                r#"
                INSERT INTO payment_settings (id, provider, is_enabled, currency, updated_at)
                VALUES ($1, $2, 0, 'INR', $3)
                "#,
            )
            .bind(new_id())
            .bind(provider)
            .bind(&now)
            .execute(self.db_client.pool())
            .await
            .map_err(query_failed("insert payment settings"))?;
        }

        sqlx::query(
            r#"
            UPDATE payment_settings
            SET is_enabled = COALESCE($1, is_enabled),
                key_id = COALESCE($2, key_id),
                key_secret = COALESCE($3, key_secret),
                currency = COALESCE($4, currency),
                updated_at = $5
            WHERE provider = $6
            "#,
        )
        .bind(update.is_enabled.map(i64::from))
        .bind(&update.key_id)
        .bind(&update.key_secret)
        .bind(&update.currency)
        .bind(&now)
        .bind(provider)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update payment settings"))?;

        info!("Payment settings for {} updated", provider);
        self.find_by_provider(provider)
            .await?
            .ok_or_else(|| DbError::NotFound("Payment settings".to_string()))
    }
}
