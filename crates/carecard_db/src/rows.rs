//! Row decoding helpers shared by the repositories.
//!
//! `DateTime<Utc>` and `bool` do not decode through `sqlx::Any`, so
//! timestamps are stored as RFC 3339 text and flags as 0/1 integers.
//! `Any` rows also refuse to decode SQL NULL into `Option<T>`, so nullable
//! columns go through [`optional`].

use crate::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::{Any, Decode, Row, Type, ValueRef};
use tracing::error;
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fixed-width UTC text so lexical order equals time order.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

pub(crate) fn timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    parse_timestamp(&raw, column)
}

/// Decode a nullable column, mapping SQL NULL to `None`.
pub(crate) fn optional<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get(column).map(Some)
}

pub(crate) fn opt_timestamp(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let raw: Option<String> = optional(row, column)?;
    raw.map(|s| parse_timestamp(&s, column)).transpose()
}

pub(crate) fn flag(row: &AnyRow, column: &str) -> Result<bool, sqlx::Error> {
    let raw: i64 = row.try_get(column)?;
    Ok(raw != 0)
}

/// Decode a status column into its enum.
pub(crate) fn status<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

/// Map a failed query to `DbError::QueryError`, logging what was attempted.
pub(crate) fn query_failed(action: &'static str) -> impl Fn(sqlx::Error) -> DbError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        DbError::QueryError(e.to_string())
    }
}

/// Decode every row with `f`, failing on the first bad row.
pub(crate) fn decode_all<T>(
    rows: Vec<AnyRow>,
    f: fn(&AnyRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, DbError> {
    rows.iter().map(|row| f(row).map_err(DbError::from)).collect()
}
