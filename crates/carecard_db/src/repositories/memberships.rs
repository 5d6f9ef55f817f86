//! E-card memberships (`ecard_members`).

use crate::error::DbError;
use crate::repositories::status::MembershipStatus;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcardMember {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub card_number: String,
    pub member_name: Option<String>,
    pub status: MembershipStatus,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl EcardMember {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            plan_id: row.try_get("plan_id")?,
            card_number: row.try_get("card_number")?,
            member_name: rows::optional(row, "member_name")?,
            status: rows::status(row, "status")?,
            start_date: rows::timestamp(row, "start_date")?,
            expiry_date: rows::timestamp(row, "expiry_date")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

/// A membership joined with the name of its plan, as the portals list it.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipView {
    #[serde(flatten)]
    pub membership: EcardMember,
    pub plan_name: Option<String>,
}

impl MembershipView {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            membership: EcardMember::from_row(row)?,
            plan_name: rows::optional(row, "plan_name")?,
        })
    }
}

const COLUMNS: &str =
    "id, user_id, plan_id, card_number, member_name, status, start_date, expiry_date, created_at";

const VIEW_SELECT: &str = r#"
    SELECT m.id, m.user_id, m.plan_id, m.card_number, m.member_name, m.status,
           m.start_date, m.expiry_date, m.created_at, p.name AS plan_name
    FROM ecard_members m
    LEFT JOIN plans p ON p.id = m.plan_id
"#;

#[derive(Debug, Clone)]
pub struct SqlMembershipRepository {
    db_client: DbClient,
}

impl SqlMembershipRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn create(&self, membership: EcardMember) -> Result<EcardMember, DbError> {
        debug!(
            "Creating membership {} for user {} on plan {}",
            membership.card_number, membership.user_id, membership.plan_id
        );
        sqlx::query(
            r#"
            INSERT INTO ecard_members
                (id, user_id, plan_id, card_number, member_name, status, start_date, expiry_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&membership.id)
        .bind(&membership.user_id)
        .bind(&membership.plan_id)
        .bind(&membership.card_number)
        .bind(&membership.member_name)
        .bind(membership.status.as_str())
        .bind(to_db_timestamp(&membership.start_date))
        .bind(to_db_timestamp(&membership.expiry_date))
        .bind(to_db_timestamp(&membership.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert membership"))?;

        info!("Membership {} created", membership.id);
        Ok(membership)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<EcardMember>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM ecard_members WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find membership"))?;
        Ok(row.as_ref().map(EcardMember::from_row).transpose()?)
    }

    pub async fn find_by_card_number(
        &self,
        card_number: &str,
    ) -> Result<Option<MembershipView>, DbError> {
        let query = format!("{VIEW_SELECT} WHERE m.card_number = $1");
        let row = sqlx::query(&query)
            .bind(card_number)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find membership by card number"))?;
        Ok(row.as_ref().map(MembershipView::from_row).transpose()?)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<MembershipView>, DbError> {
        let query = format!("{VIEW_SELECT} WHERE m.user_id = $1 ORDER BY m.created_at DESC");
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list memberships for user"))?;
        rows::decode_all(rows, MembershipView::from_row)
    }

    pub async fn list_all(&self) -> Result<Vec<MembershipView>, DbError> {
        let query = format!("{VIEW_SELECT} ORDER BY m.created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list memberships"))?;
        rows::decode_all(rows, MembershipView::from_row)
    }

    /// Counts memberships, optionally restricted to one status.
    pub async fn count(&self, status: Option<MembershipStatus>) -> Result<i64, DbError> {
        let row = match status {
            Some(status) => {
                sqlx::query("SELECT COUNT(*) AS n FROM ecard_members WHERE status = $1")
                    .bind(status.as_str())
                    .fetch_one(self.db_client.pool())
                    .await
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS n FROM ecard_members")
                    .fetch_one(self.db_client.pool())
                    .await
            }
        }
        .map_err(query_failed("count memberships"))?;
        Ok(row.try_get("n")?)
    }
}
