//! Profiles: one row per auth-service user, carrying the portal role.

use crate::error::DbError;
use crate::rows::{self, query_failed, to_db_timestamp};
use crate::DbClient;
use carecard_common::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub city_id: Option<String>,
    pub franchise_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    fn from_row(row: &AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            full_name: rows::optional(row, "full_name")?,
            email: rows::optional(row, "email")?,
            phone: rows::optional(row, "phone")?,
            role: rows::status(row, "role")?,
            city_id: rows::optional(row, "city_id")?,
            franchise_id: rows::optional(row, "franchise_id")?,
            created_at: rows::timestamp(row, "created_at")?,
        })
    }
}

/// Editable contact fields. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub city_id: Option<String>,
}

const COLUMNS: &str = "id, full_name, email, phone, role, city_id, franchise_id, created_at";

#[derive(Debug, Clone)]
pub struct SqlProfileRepository {
    db_client: DbClient,
}

impl SqlProfileRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Profile>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_failed("find profile"))?;
        Ok(row.as_ref().map(Profile::from_row).transpose()?)
    }

    pub async fn create(&self, profile: Profile) -> Result<Profile, DbError> {
        debug!("Creating profile {} with role {}", profile.id, profile.role);
        sqlx::query(
            r#"
            INSERT INTO profiles (id, full_name, email, phone, role, city_id, franchise_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.role.as_str())
        .bind(&profile.city_id)
        .bind(&profile.franchise_id)
        .bind(to_db_timestamp(&profile.created_at))
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("insert profile"))?;

        info!("Profile {} created", profile.id);
        Ok(profile)
    }

    /// Returns the caller's profile, creating a customer profile on first
    /// sight of a new auth user.
    pub async fn find_or_create(
        &self,
        id: &str,
        email: Option<&str>,
    ) -> Result<Profile, DbError> {
        if let Some(profile) = self.find_by_id(id).await? {
            return Ok(profile);
        }
        self.create(Profile {
            id: id.to_string(),
            full_name: None,
            email: email.map(str::to_string),
            phone: None,
            role: Role::Customer,
            city_id: None,
            franchise_id: None,
            created_at: Utc::now(),
        })
        .await
    }

    pub async fn update_contact(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = COALESCE($1, full_name),
                phone = COALESCE($2, phone),
                city_id = COALESCE($3, city_id)
            WHERE id = $4
            "#,
        )
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.city_id)
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update profile"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Profile".to_string()));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Profile".to_string()))
    }

    /// Changes a profile's portal role and, for franchise staff, the franchise
    /// it belongs to.
    pub async fn set_role(
        &self,
        id: &str,
        role: Role,
        franchise_id: Option<&str>,
    ) -> Result<Profile, DbError> {
        let result = sqlx::query(
            "UPDATE profiles SET role = $1, franchise_id = COALESCE($2, franchise_id) WHERE id = $3",
        )
        .bind(role.as_str())
        .bind(franchise_id)
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(query_failed("update profile role"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("Profile".to_string()));
        }
        info!("Profile {} is now {}", id, role);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound("Profile".to_string()))
    }

    pub async fn list(&self, role: Option<Role>) -> Result<Vec<Profile>, DbError> {
        let rows = match role {
            Some(role) => {
                let query =
                    format!("SELECT {COLUMNS} FROM profiles WHERE role = $1 ORDER BY created_at DESC");
                sqlx::query(&query)
                    .bind(role.as_str())
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM profiles ORDER BY created_at DESC");
                sqlx::query(&query).fetch_all(self.db_client.pool()).await
            }
        }
        .map_err(query_failed("list profiles"))?;

        rows::decode_all(rows, Profile::from_row)
    }
}
