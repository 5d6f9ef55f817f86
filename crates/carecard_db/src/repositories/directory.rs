//! Reference data: cities, departments and franchises.

use crate::error::DbError;
use crate::repositories::status::FranchiseStatus;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: Option<String>,
}

impl City {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            state: rows::optional(row, "state")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
}

impl Department {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Franchise {
    pub id: String,
    pub name: String,
    pub city_id: Option<String>,
    pub owner_id: Option<String>,
    pub status: FranchiseStatus,
    pub created_at: DateTime<Utc>,
}

impl Franchise {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            city_id: rows::optional(row, "city_id")?,
            owner_id: rows::optional(row, "owner_id")?,
            status: rows::status(row, "status")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqlDirectoryRepository {
    db_client: DbClient,
}

impl SqlDirectoryRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, DbError> {
        let rows = sqlx::query("SELECT id, name, state FROM cities ORDER BY name ASC")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list cities"))?;
        rows::decode_all(rows, City::from_row)
    }

    pub async fn create_city(&self, city: City) -> Result<City, DbError> {
        sqlx::query("INSERT INTO cities (id, name, state) VALUES ($1, $2, $3)")
            .bind(&city.id)
            .bind(&city.name)
            .bind(&city.state)
            .execute(self.db_client.pool())
            .await
            .map_err(query_failed("insert city"))?;
        Ok(city)
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, DbError> {
        let rows = sqlx::query("SELECT id, name FROM departments ORDER BY name ASC")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_failed("list departments"))?;
        rows::decode_all(rows, Department::from_row)
    }

    pub async fn list_franchises(&self) -> Result<Vec<Franchise>, DbError> {
        let rows = sqlx::query(
            "SELECT id, name, city_id, owner_id, status, created_at FROM franchises ORDER BY name ASC",
        )
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_failed("list franchises"))?;
        rows::decode_all(rows, Franchise::from_row)
    }

    pub async fn create_franchise(&self, franchise: Franchise) -> Result<Franchise, DbError> {
        sqlx::query(
            r#"
            INSERT INTO franchises (id, name, city_id, owner_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&franchise.id)
        .bind(&franchise.name)
        .bind(&franchise.city_id)
        .bind(&franchise.owner_id)
        .bind(franchise.status.as_str())
        .bind(to_db_timestamp(&franchise.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert franchise"))?;

        info!("Franchise {} ({}) created", franchise.name, franchise.id);
        Ok(franchise)
    }
}
