//! Discount coupons.

use crate::error::DbError;
use crate::repository::Repository;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    /// Stored upper-case; lookups are case-insensitive.
    pub code: String,
    pub discount_percent: f64,
    pub max_uses: Option<i64>,
    pub used_count: i64,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            discount_percent: row.try_get("discount_percent")?,
            max_uses: rows::optional(row, "max_uses")?,
            used_count: row.try_get("used_count")?,
            valid_until: rows::opt_timestamp(row, "valid_until")?,
            is_active: rows::flag(row, "is_active")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }

    /// Active, not past `valid_until` and not out of uses.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.valid_until.is_some_and(|until| until < now) {
            return false;
        }
        !self.max_uses.is_some_and(|max| self.used_count >= max)
    }
}

const COLUMNS: &str =
    "id, code, discount_percent, max_uses, used_count, valid_until, is_active, created_at";

#[derive(Debug, Clone)]
pub struct SqlCouponRepository {
    db_client: DbClient,
}

impl SqlCouponRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE code = $1");
        let row = sqlx::query(&query)
            .bind(code.trim().to_uppercase())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find coupon"))?;
        Ok(row.as_ref().map(Coupon::from_row).transpose()?)
    }
}

impl Repository<Coupon, DbError> for SqlCouponRepository {
    async fn create(&self, mut coupon: Coupon) -> Result<Coupon, DbError> {
        coupon.code = coupon.code.trim().to_uppercase();
        sqlx::query(
            r#"
            INSERT INTO coupons
                (id, code, discount_percent, max_uses, used_count, valid_until, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_percent)
        .bind(coupon.max_uses)
        .bind(coupon.used_count)
        .bind(coupon.valid_until.as_ref().map(to_db_timestamp))
        .bind(i64::from(coupon.is_active))
        .bind(to_db_timestamp(&coupon.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert coupon"))?;

        info!("Coupon {} created", coupon.code);
        Ok(coupon)
    }

    async fn read(&self, id: &str) -> Result<Option<Coupon>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM coupons WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("read coupon"))?;
        Ok(row.as_ref().map(Coupon::from_row).transpose()?)
    }

    async fn update(&self, coupon: Coupon) -> Result<Coupon, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET discount_percent = $1, max_uses = $2, used_count = $3, valid_until = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(coupon.discount_percent)
        .bind(coupon.max_uses)
        .bind(coupon.used_count)
        .bind(coupon.valid_until.as_ref().map(to_db_timestamp))
        .bind(i64::from(coupon.is_active))
        .bind(&coupon.id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update coupon"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Coupon".to_string()));
        }
        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon() -> Coupon {
        Coupon {
            id: "c1".to_string(),
            code: "WELCOME10".to_string(),
            discount_percent: 10.0,
            max_uses: Some(2),
            used_count: 0,
            valid_until: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_redeemable_when_active_and_unused() {
        assert!(coupon().is_redeemable(Utc::now()));
    }

    #[test]
    fn test_not_redeemable_when_exhausted_or_expired() {
        let now = Utc::now();

        let mut exhausted = coupon();
        exhausted.used_count = 2;
        assert!(!exhausted.is_redeemable(now));

        let mut expired = coupon();
        expired.valid_until = Some(now - Duration::days(1));
        assert!(!expired.is_redeemable(now));

        let mut inactive = coupon();
        inactive.is_active = false;
        assert!(!inactive.is_redeemable(now));
    }
}
