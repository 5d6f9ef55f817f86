//! Membership plans.

use crate::error::DbError;
use crate::repository::Repository;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Price before tax, whole rupees.
    pub price: f64,
    pub duration_months: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: rows::optional(row, "description")?,
            price: row.try_get("price")?,
            duration_months: row.try_get("duration_months")?,
            is_active: rows::flag(row, "is_active")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

const COLUMNS: &str = "id, name, description, price, duration_months, is_active, created_at";

#[derive(Debug, Clone)]
pub struct SqlPlanRepository {
    db_client: DbClient,
}

impl SqlPlanRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Plans shown on the public plan picker.
    pub async fn list_active(&self) -> Result<Vec<Plan>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE is_active = 1 ORDER BY price ASC");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list active plans"))?;
        rows::decode_all(rows, Plan::from_row)
    }

    pub async fn list_all(&self) -> Result<Vec<Plan>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM plans ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list plans"))?;
        rows::decode_all(rows, Plan::from_row)
    }
}

impl Repository<Plan, DbError> for SqlPlanRepository {
    async fn create(&self, plan: Plan) -> Result<Plan, DbError> {
        debug!("Creating plan '{}' at {}", plan.name, plan.price);
        sqlx::query(
            r#"
            INSERT INTO plans (id, name, description, price, duration_months, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.duration_months)
        .bind(i64::from(plan.is_active))
        .bind(to_db_timestamp(&plan.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert plan"))?;

        info!("Plan {} created", plan.id);
        Ok(plan)
    }

    async fn read(&self, id: &str) -> Result<Option<Plan>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find plan"))?;
        Ok(row.as_ref().map(Plan::from_row).transpose()?)
    }

    async fn update(&self, plan: Plan) -> Result<Plan, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE plans
            SET name = $1, description = $2, price = $3, duration_months = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.duration_months)
        .bind(i64::from(plan.is_active))
        .bind(&plan.id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update plan"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Plan".to_string()));
        }
        Ok(plan)
    }
}
