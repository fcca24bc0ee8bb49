//! Row decoding helpers shared by the PostgreSQL adapters.

use std::fmt::Display;
use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};

/// Reads a typed column, reporting the column name on failure.
pub(super) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    })
}

/// Reads a text column and parses it into a domain enum.
pub(super) fn parsed<T>(row: &PgRow, name: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = column(row, name)?;
    raw.parse().map_err(|e: T::Err| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid {} '{}': {}", name, raw, e),
        )
    })
}

pub(super) fn user_id_column(row: &PgRow) -> Result<UserId, DomainError> {
    let raw: String = column(row, "user_id")?;
    UserId::new(raw).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
    })
}

pub(super) fn timestamp(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    let value: chrono::DateTime<chrono::Utc> = column(row, name)?;
    Ok(Timestamp::from_datetime(value))
}

/// True when `err` is a PostgreSQL unique constraint violation.
pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
