//! SQLite storage backend implementation
//!
//! Implements [`MonitorRegistry`], [`ResultStore`] and [`StorageBackend`] on
//! top of a local SQLite database file.
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: Better concurrency for reads during writes
//! - **Connection pooling**: Efficient resource usage
//! - **Migrations**: Automatic schema versioning with sqlx
//!
//! ## Retention
//!
//! Every insert is followed by a trim that keeps the newest
//! `max_results_per_monitor` rows of that monitor, ordered by
//! `(timestamp, rowid)`. The trim runs outside the insert transaction; racing
//! inserts for the same monitor can only leave a few extra rows behind.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info, instrument, trace, warn};

use super::backend::{
    DEFAULT_MAX_RESULTS_PER_MONITOR, HealthStatus, MonitorRegistry, ResultStore, StorageBackend,
    average_response_time, uptime_percentage, window_start,
};
use super::error::{StorageError, StorageResult};
use super::schema::{
    CHECK_COLUMNS, MONITOR_COLUMNS, check_from_row, millis_to_timestamp, monitor_from_row,
    seconds_to_column, timestamp_to_millis,
};
use crate::models::{CheckResult, Monitor, MonitorUpdate, NewMonitor};

/// SQLite storage backend
pub struct SqliteBackend {
    pool: Pool<Sqlite>,
    db_path: String,
    max_results_per_monitor: usize,
}

impl SqliteBackend {
    /// Create a new SQLite backend
    ///
    /// This will:
    /// 1. Create the database file if it doesn't exist
    /// 2. Run migrations to create tables
    /// 3. Configure SQLite for WAL mode and a busy timeout
    ///
    /// ## Example
    ///
    /// ```no_run
    /// # use uptime_monitor::storage::sqlite::SqliteBackend;
    /// # async fn example() -> anyhow::Result<()> {
    /// let backend = SqliteBackend::new("./uptime.db").await?.with_retention(100);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite backend at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations complete");

        Ok(Self {
            pool,
            db_path: db_path_str,
            max_results_per_monitor: DEFAULT_MAX_RESULTS_PER_MONITOR,
        })
    }

    /// Keep at most `max_results_per_monitor` results per monitor
    pub fn with_retention(mut self, max_results_per_monitor: usize) -> Self {
        self.max_results_per_monitor = max_results_per_monitor;
        self
    }

    async fn trim_history(&self, monitor_id: &str) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM check_results
            WHERE monitor_id = ?
              AND id NOT IN (
                  SELECT id FROM check_results
                  WHERE monitor_id = ?
                  ORDER BY timestamp DESC, rowid DESC
                  LIMIT ?
              )
            "#,
        )
        .bind(monitor_id)
        .bind(monitor_id)
        .bind(self.max_results_per_monitor as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MonitorRegistry for SqliteBackend {
    #[instrument(skip(self))]
    async fn get_all(&self) -> StorageResult<Vec<Monitor>> {
        let sql = format!("SELECT {MONITOR_COLUMNS} FROM monitors ORDER BY created_at ASC, rowid ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(monitor_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Monitor>> {
        let sql = format!("SELECT {MONITOR_COLUMNS} FROM monitors WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(monitor_from_row).transpose()
    }

    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: NewMonitor) -> StorageResult<Monitor> {
        let monitor = data.into_monitor(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO monitors (
                id, name, url, method, interval_secs, timeout_secs,
                expected_status, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&monitor.id)
        .bind(&monitor.name)
        .bind(&monitor.url)
        .bind(monitor.method.as_str())
        .bind(seconds_to_column("interval_secs", monitor.interval)?)
        .bind(seconds_to_column("timeout_secs", monitor.timeout)?)
        .bind(i64::from(monitor.expected_status))
        .bind(monitor.is_active)
        .bind(timestamp_to_millis(&monitor.created_at))
        .bind(timestamp_to_millis(&monitor.updated_at))
        .execute(&self.pool)
        .await?;

        debug!("registered monitor {}", monitor.id);
        Ok(monitor)
    }

    #[instrument(skip(self, data))]
    async fn update(&self, id: &str, data: MonitorUpdate) -> StorageResult<Option<Monitor>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {MONITOR_COLUMNS} FROM monitors WHERE id = ?");
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };

        let mut monitor = monitor_from_row(&row)?;
        data.apply_to(&mut monitor, Utc::now());

        sqlx::query(
            r#"
            UPDATE monitors SET
                name = ?, url = ?, method = ?, interval_secs = ?, timeout_secs = ?,
                expected_status = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&monitor.name)
        .bind(&monitor.url)
        .bind(monitor.method.as_str())
        .bind(seconds_to_column("interval_secs", monitor.interval)?)
        .bind(seconds_to_column("timeout_secs", monitor.timeout)?)
        .bind(i64::from(monitor.expected_status))
        .bind(monitor.is_active)
        .bind(timestamp_to_millis(&monitor.updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(monitor))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StorageResult<Option<Monitor>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {MONITOR_COLUMNS} FROM monitors WHERE id = ?");
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };
        let monitor = monitor_from_row(&row)?;

        let checks = sqlx::query("DELETE FROM check_results WHERE monitor_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM monitors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(
            "deleted monitor {} and {} check results",
            id,
            checks.rows_affected()
        );

        Ok(Some(monitor))
    }
}

#[async_trait]
impl ResultStore for SqliteBackend {
    #[instrument(skip(self, result), fields(monitor = %result.monitor_id, status = %result.status))]
    async fn create(&self, result: CheckResult) -> StorageResult<CheckResult> {
        sqlx::query(
            r#"
            INSERT INTO check_results (
                id, monitor_id, status, response_time_ms, status_code, error, timestamp
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(&result.monitor_id)
        .bind(result.status.as_str())
        .bind(result.response_time as i64)
        .bind(result.status_code.map(i64::from))
        .bind(&result.error)
        .bind(timestamp_to_millis(&result.timestamp))
        .execute(&self.pool)
        .await?;

        // Best effort: a failed trim only means temporary over-retention
        match self.trim_history(&result.monitor_id).await {
            Ok(0) => {}
            Ok(trimmed) => trace!("trimmed {trimmed} old results"),
            Err(e) => warn!("failed to trim check history: {e}"),
        }

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_by_monitor_id(
        &self,
        monitor_id: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CheckResult>> {
        let sql = format!(
            "SELECT {CHECK_COLUMNS} FROM check_results WHERE monitor_id = ? \
             ORDER BY timestamp DESC, rowid DESC LIMIT ?"
        );
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = sqlx::query(&sql)
            .bind(monitor_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(check_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_latest_by_monitor_id(
        &self,
        monitor_id: &str,
    ) -> StorageResult<Option<CheckResult>> {
        let sql = format!(
            "SELECT {CHECK_COLUMNS} FROM check_results WHERE monitor_id = ? \
             ORDER BY timestamp DESC, rowid DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(monitor_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(check_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_uptime_percentage(&self, monitor_id: &str, hours: u32) -> StorageResult<f64> {
        let cutoff = timestamp_to_millis(&window_start(hours));

        let (total, up): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN status = 'up' THEN 1 ELSE 0 END), 0)
            FROM check_results
            WHERE monitor_id = ? AND timestamp > ?
            "#,
        )
        .bind(monitor_id)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(uptime_percentage(up as usize, total as usize))
    }

    #[instrument(skip(self))]
    async fn get_average_response_time(
        &self,
        monitor_id: &str,
        hours: u32,
    ) -> StorageResult<f64> {
        let cutoff = timestamp_to_millis(&window_start(hours));

        let (count, sum): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(response_time_ms), 0)
            FROM check_results
            WHERE monitor_id = ? AND timestamp > ? AND status = 'up'
            "#,
        )
        .bind(monitor_id)
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;

        Ok(average_response_time(sum as u64, count as usize))
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => {
                let mut metadata = HashMap::new();
                metadata.insert("backend".to_string(), "sqlite".to_string());
                metadata.insert("db_path".to_string(), self.db_path.clone());

                Ok(HealthStatus {
                    healthy: true,
                    message: "SQLite backend operational".to_string(),
                    metadata,
                })
            }
            Err(e) => {
                warn!("health check failed: {}", e);
                Ok(HealthStatus {
                    healthy: false,
                    message: format!("health check failed: {}", e),
                    metadata: HashMap::new(),
                })
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_stats(&self) -> StorageResult<String> {
        let (monitors,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM monitors")
            .fetch_one(&self.pool)
            .await?;
        let (checks, oldest): (i64, Option<i64>) =
            sqlx::query_as("SELECT COUNT(*), MIN(timestamp) FROM check_results")
                .fetch_one(&self.pool)
                .await?;

        let file_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);
        let file_size_mb = file_size as f64 / 1_000_000.0;

        let since = match oldest {
            Some(millis) => millis_to_timestamp(millis)?.format("%Y-%m-%d").to_string(),
            None => "no data".to_string(),
        };

        Ok(format!(
            "SQLite: {} monitors, {} check results, {:.2} MB on disk, oldest: {}",
            monitors, checks, file_size_mb, since
        ))
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite backend");
        self.pool.close().await;
        Ok(())
    }
}
