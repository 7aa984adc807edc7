//! SQLite row layout and decoding
//!
//! Timestamps are stored as Unix milliseconds, enums as their lowercase /
//! uppercase string forms. Decoding never panics: malformed rows surface as
//! [`StorageError::SerializationError`].

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::error::{StorageError, StorageResult};
use crate::models::{CheckResult, CheckStatus, HttpMethod, Monitor};

pub const MONITOR_COLUMNS: &str = "id, name, url, method, interval_secs, timeout_secs, \
     expected_status, is_active, created_at, updated_at";

pub const CHECK_COLUMNS: &str =
    "id, monitor_id, status, response_time_ms, status_code, error, timestamp";

/// Convert timestamp to Unix milliseconds for SQLite
pub fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert Unix milliseconds from SQLite to DateTime
pub fn millis_to_timestamp(millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StorageError::SerializationError(format!("timestamp out of range: {millis}"))
    })
}

fn non_negative(column: &str, value: i64) -> StorageResult<u64> {
    u64::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("negative value in {column}: {value}"))
    })
}

/// Convert a seconds column for binding, rejecting values SQLite cannot hold
pub fn seconds_to_column(column: &str, value: u64) -> StorageResult<i64> {
    i64::try_from(value).map_err(|_| {
        StorageError::SerializationError(format!("value too large for {column}: {value}"))
    })
}

pub fn monitor_from_row(row: &SqliteRow) -> StorageResult<Monitor> {
    let method: String = row.try_get("method")?;
    let expected_status: i64 = row.try_get("expected_status")?;

    Ok(Monitor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        method: method
            .parse::<HttpMethod>()
            .map_err(StorageError::SerializationError)?,
        interval: non_negative("interval_secs", row.try_get("interval_secs")?)?,
        timeout: non_negative("timeout_secs", row.try_get("timeout_secs")?)?,
        expected_status: u16::try_from(expected_status).map_err(|_| {
            StorageError::SerializationError(format!("invalid status code {expected_status}"))
        })?,
        is_active: row.try_get("is_active")?,
        created_at: millis_to_timestamp(row.try_get("created_at")?)?,
        updated_at: millis_to_timestamp(row.try_get("updated_at")?)?,
    })
}

pub fn check_from_row(row: &SqliteRow) -> StorageResult<CheckResult> {
    let status: String = row.try_get("status")?;
    let status_code: Option<i64> = row.try_get("status_code")?;

    Ok(CheckResult {
        id: row.try_get("id")?,
        monitor_id: row.try_get("monitor_id")?,
        status: status
            .parse::<CheckStatus>()
            .map_err(StorageError::SerializationError)?,
        response_time: non_negative("response_time_ms", row.try_get("response_time_ms")?)?,
        status_code: status_code
            .map(|code| {
                u16::try_from(code).map_err(|_| {
                    StorageError::SerializationError(format!("invalid status code {code}"))
                })
            })
            .transpose()?,
        error: row.try_get("error")?,
        timestamp: millis_to_timestamp(row.try_get("timestamp")?)?,
    })
}
