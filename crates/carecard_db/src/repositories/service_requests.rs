//! Customer service requests worked by the call centre.

use crate::error::DbError;
use crate::repositories::status::ServiceRequestStatus;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub user_id: String,
    pub membership_id: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub status: ServiceRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequest {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            membership_id: rows::optional(row, "membership_id")?,
            service_type: row.try_get("service_type")?,
            description: rows::optional(row, "description")?,
            status: rows::status(row, "status")?,
            created_at: rows::timestamp(row, "created_at")?,
            updated_at: rows::timestamp(row, "updated_at")?,
        })
    }
}

const COLUMNS: &str =
    "id, user_id, membership_id, service_type, description, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqlServiceRequestRepository {
    db_client: DbClient,
}

impl SqlServiceRequestRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn create(&self, request: ServiceRequest) -> Result<ServiceRequest, DbError> {
        sqlx::query(
            r#"
            INSERT INTO service_requests
                (id, user_id, membership_id, service_type, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(&request.membership_id)
        .bind(&request.service_type)
        .bind(&request.description)
        .bind(request.status.as_str())
        .bind(to_db_timestamp(&request.created_at))
        .bind(to_db_timestamp(&request.updated_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert service request"))?;

        info!("Service request {} opened ({})", request.id, request.service_type);
        Ok(request)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<ServiceRequest>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list service requests for user"))?;
        rows::decode_all(rows, ServiceRequest::from_row)
    }

    /// Queue view, oldest first.
    pub async fn list(
        &self,
        status: Option<ServiceRequestStatus>,
    ) -> Result<Vec<ServiceRequest>, DbError> {
        let rows = match status {
            Some(status) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM service_requests WHERE status = $1 ORDER BY created_at ASC"
                );
                sqlx::query(&query)
                    .bind(status.as_str())
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM service_requests ORDER BY created_at ASC");
                sqlx::query(&query).fetch_all(self.db_client.pool()).await
            }
        }
        .map_err(query_failed("list service requests"))?;
        rows::decode_all(rows, ServiceRequest::from_row)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: ServiceRequestStatus,
    ) -> Result<ServiceRequest, DbError> {
        let result = sqlx::query(
            "UPDATE service_requests SET status = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(status.as_str())
        .bind(to_db_timestamp(&Utc::now()))
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update service request"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Service request".to_string()));
        }
        info!("Service request {} moved to {}", id, status);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Service request".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ServiceRequest>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find service request"))?;
        Ok(row.as_ref().map(ServiceRequest::from_row).transpose()?)
    }

    pub async fn count(&self, status: ServiceRequestStatus) -> Result<i64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM service_requests WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(query_failed("count service requests"))?;
        Ok(row.try_get("n")?)
    }
}
