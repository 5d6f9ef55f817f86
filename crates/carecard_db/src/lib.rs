//! Database integration for CareCard
//!
//! A database client over an sqlx `Any` pool, the table schema, and one
//! repository per table. SQLite is the default backend; PostgreSQL is
//! available through the `postgres` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use carecard_config::AppConfig;
//! use carecard_db::{init_schema, DbClient, SqlPlanRepository};
//!
//! async fn setup_db() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let db_client = DbClient::new(&config).await?;
//!     init_schema(&db_client).await?;
//!     let plans = SqlPlanRepository::new(db_client).list_active().await?;
//!     println!("{} plans on sale", plans.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;
mod rows;
pub mod schema;

// Register the SQLite driver when the crate is loaded
#[cfg(feature = "sqlite")]
mod sqlite_driver {
    #[allow(unused_imports)]
    use sqlx::sqlite::SqlitePoolOptions as _;
}

pub use client::DbClient;
pub use error::DbError;
pub use repository::Repository;
pub use rows::{new_id, to_db_timestamp};
pub use schema::init_schema;

pub use repositories::*;
