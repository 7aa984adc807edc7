//! Storage traits
//!
//! The monitoring core only talks to storage through these traits:
//!
//! - [`MonitorRegistry`]: durable monitor configurations
//! - [`ResultStore`]: append-mostly check history with retention and aggregates
//! - [`StorageBackend`]: operational concerns (health, stats, shutdown)
//!
//! Every concrete backend implements all three; [`Storage`] bundles one
//! backend as trait objects for the scheduler, aggregator and API.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::error::StorageResult;
use crate::models::{CheckResult, Monitor, MonitorUpdate, NewMonitor};

/// Default number of results kept per monitor
pub const DEFAULT_MAX_RESULTS_PER_MONITOR: usize = 100;

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,

    /// Additional backend-specific metadata
    pub metadata: HashMap<String, String>,
}

/// Durable record of monitor configurations
///
/// `get_all` returns monitors in creation order.
#[async_trait]
pub trait MonitorRegistry: Send + Sync {
    async fn get_all(&self) -> StorageResult<Vec<Monitor>>;

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Monitor>>;

    /// Store a new monitor and return it with its assigned id and timestamps
    async fn create(&self, data: NewMonitor) -> StorageResult<Monitor>;

    /// Apply a partial update. Returns `None` when the id is unknown.
    async fn update(&self, id: &str, data: MonitorUpdate) -> StorageResult<Option<Monitor>>;

    /// Delete a monitor together with all of its check results.
    /// Returns the deleted monitor, or `None` when the id is unknown.
    async fn delete(&self, id: &str) -> StorageResult<Option<Monitor>>;
}

/// Check result history
///
/// ## Retention
///
/// `create` trims the history of the result's monitor down to the configured
/// cap, deleting the oldest entries by timestamp. The trim is not required to
/// be atomic with the insert but must never remove one of the `cap` newest
/// results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Append a result and trim the monitor's history to the retention cap
    async fn create(&self, result: CheckResult) -> StorageResult<CheckResult>;

    /// Results for a monitor, newest first, optionally limited
    async fn get_by_monitor_id(
        &self,
        monitor_id: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CheckResult>>;

    /// Most recent result for a monitor by timestamp
    async fn get_latest_by_monitor_id(&self, monitor_id: &str)
    -> StorageResult<Option<CheckResult>>;

    /// Percentage (0-100) of `up` results within the trailing window.
    /// Returns 0 when the window holds no results.
    async fn get_uptime_percentage(&self, monitor_id: &str, hours: u32) -> StorageResult<f64>;

    /// Mean response time in ms of `up` results within the trailing window,
    /// rounded to whole milliseconds. Returns 0 when there are none.
    async fn get_average_response_time(&self, monitor_id: &str, hours: u32)
    -> StorageResult<f64>;
}

/// Operational interface shared by all backends
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Lightweight check that the backend is reachable
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Human-readable statistics
    async fn get_stats(&self) -> StorageResult<String>;

    /// Release resources (connections, file handles)
    async fn close(&self) -> StorageResult<()>;
}

/// One backend exposed through all storage traits
#[derive(Clone)]
pub struct Storage {
    pub registry: Arc<dyn MonitorRegistry>,
    pub results: Arc<dyn ResultStore>,
    pub backend: Arc<dyn StorageBackend>,
}

impl Storage {
    pub fn new<B>(backend: B) -> Self
    where
        B: MonitorRegistry + ResultStore + StorageBackend + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            registry: backend.clone(),
            results: backend.clone(),
            backend,
        }
    }
}

/// Start of the trailing window ending now
pub fn window_start(hours: u32) -> DateTime<Utc> {
    Utc::now() - Duration::hours(i64::from(hours))
}

/// Uptime percentage from up/total counts
pub fn uptime_percentage(up: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    up as f64 / total as f64 * 100.0
}

/// Rounded mean of response times, 0 for an empty set
pub fn average_response_time(total_ms: u64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (total_ms as f64 / count as f64).round()
}
