//! Reimbursement claims.

use crate::error::DbError;
use crate::repositories::status::ClaimStatus;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementClaim {
    pub id: String,
    pub user_id: String,
    pub membership_id: String,
    pub amount: f64,
    pub description: Option<String>,
    pub status: ClaimStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReimbursementClaim {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            membership_id: row.try_get("membership_id")?,
            amount: row.try_get("amount")?,
            description: rows::optional(row, "description")?,
            status: rows::status(row, "status")?,
            admin_notes: rows::optional(row, "admin_notes")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::timestamp(row, "updated_at")?,
        })
    }
}

const COLUMNS: &str = "id, user_id, membership_id, amount, description, status, admin_notes, \
                       created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqlClaimRepository {
    db_client: DbClient,
}

impl SqlClaimRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn create(&self, claim: ReimbursementClaim) -> Result<ReimbursementClaim, DbError> {
        sqlx::query(
            r#"
            INSERT INTO reimbursement_claims
                (id, user_id, membership_id, amount, description, status, admin_notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&claim.id)
        .bind(&claim.user_id)
        .bind(&claim.membership_id)
        .bind(claim.amount)
        .bind(&claim.description)
        .bind(claim.status.as_str())
        .bind(&claim.admin_notes)
        .bind(to_db_timestamp(&claim.created_at))
        .bind(to_db_timestamp(&claim.updated_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert claim"))?;

        info!("Claim {} submitted for {}", claim.id, claim.amount);
        Ok(claim)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ReimbursementClaim>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM reimbursement_claims WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find claim"))?;
        Ok(row.as_ref().map(ReimbursementClaim::from_row).transpose()?)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ReimbursementClaim>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM reimbursement_claims WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list claims for user"))?;
        rows::decode_all(rows, ReimbursementClaim::from_row)
    }

    /// Sets the status; `notes` replaces the admin notes when given.
    pub async fn update_status(
        &self,
        id: &str,
        status: ClaimStatus,
        notes: Option<&str>,
    ) -> Result<ReimbursementClaim, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE reimbursement_claims
            SET status = $1, admin_notes = COALESCE($2, admin_notes), updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(status.as_str())
        .bind(notes)
        .bind(to_db_timestamp(&Utc::now()))
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update claim"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Claim".to_string()));
        }
        info!("Claim {} moved to {}", id, status);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Claim".to_string()))
    }

    /// Claims still awaiting a decision (submitted or under review).
    pub async fn count_open(&self) -> Result<i64, DbError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM reimbursement_claims WHERE status IN ($1, $2)",
        )
        .bind(ClaimStatus::Submitted.as_str())
        .bind(ClaimStatus::UnderReview.as_str())
        .fetch_one(self.db_client.pool())
        .await
        .map_err(query_failed("count open claims"))?;
        Ok(row.try_get("n")?)
    }
}
