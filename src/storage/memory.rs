//! In-memory storage backend (no persistence)
//!
//! Useful for:
//! - Testing without database dependencies
//! - Running the hub without a database file (`"backend": "none"`)
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Single process**: State lives behind one `RwLock`

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::backend::{
    DEFAULT_MAX_RESULTS_PER_MONITOR, HealthStatus, MonitorRegistry, ResultStore, StorageBackend,
    average_response_time, uptime_percentage, window_start,
};
use super::error::StorageResult;
use crate::models::{CheckResult, CheckStatus, Monitor, MonitorUpdate, NewMonitor};

#[derive(Default)]
struct MemoryState {
    /// Monitors in creation order
    monitors: Vec<Monitor>,

    /// Results per monitor id, sorted by timestamp (oldest first)
    results: HashMap<String, Vec<CheckResult>>,
}

/// In-memory storage backend
pub struct MemoryBackend {
    state: RwLock<MemoryState>,

    /// Maximum results kept per monitor
    max_results_per_monitor: usize,
}

impl MemoryBackend {
    /// Create a new in-memory backend with the default retention cap
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_MAX_RESULTS_PER_MONITOR)
    }

    /// Create a backend keeping at most `max_results_per_monitor` results per monitor
    pub fn with_retention(max_results_per_monitor: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            max_results_per_monitor,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonitorRegistry for MemoryBackend {
    async fn get_all(&self) -> StorageResult<Vec<Monitor>> {
        Ok(self.state.read().await.monitors.clone())
    }

    async fn get_by_id(&self, id: &str) -> StorageResult<Option<Monitor>> {
        let state = self.state.read().await;
        Ok(state.monitors.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, data: NewMonitor) -> StorageResult<Monitor> {
        let monitor = data.into_monitor(Utc::now());
        debug!("registering monitor {} ({})", monitor.name, monitor.id);

        self.state.write().await.monitors.push(monitor.clone());
        Ok(monitor)
    }

    async fn update(&self, id: &str, data: MonitorUpdate) -> StorageResult<Option<Monitor>> {
        let mut state = self.state.write().await;
        let Some(monitor) = state.monitors.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        data.apply_to(monitor, Utc::now());
        Ok(Some(monitor.clone()))
    }

    async fn delete(&self, id: &str) -> StorageResult<Option<Monitor>> {
        let mut state = self.state.write().await;
        let Some(index) = state.monitors.iter().position(|m| m.id == id) else {
            return Ok(None);
        };

        let monitor = state.monitors.remove(index);
        let removed = state.results.remove(id).map(|r| r.len()).unwrap_or(0);
        debug!("deleted monitor {id} and {removed} check results");

        Ok(Some(monitor))
    }
}

#[async_trait]
impl ResultStore for MemoryBackend {
    async fn create(&self, result: CheckResult) -> StorageResult<CheckResult> {
        let mut state = self.state.write().await;
        let history = state.results.entry(result.monitor_id.clone()).or_default();

        let position = history.partition_point(|r| r.timestamp <= result.timestamp);
        history.insert(position, result.clone());

        if history.len() > self.max_results_per_monitor {
            let excess = history.len() - self.max_results_per_monitor;
            history.drain(..excess);
            trace!("trimmed {excess} results for {}", result.monitor_id);
        }

        Ok(result)
    }

    async fn get_by_monitor_id(
        &self,
        monitor_id: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CheckResult>> {
        let state = self.state.read().await;
        let results = state
            .results
            .get(monitor_id)
            .map(|history| {
                history
                    .iter()
                    .rev()
                    .take(limit.unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(results)
    }

    async fn get_latest_by_monitor_id(
        &self,
        monitor_id: &str,
    ) -> StorageResult<Option<CheckResult>> {
        let state = self.state.read().await;
        Ok(state
            .results
            .get(monitor_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn get_uptime_percentage(&self, monitor_id: &str, hours: u32) -> StorageResult<f64> {
        let cutoff = window_start(hours);
        let state = self.state.read().await;

        let (up, total) = state
            .results
            .get(monitor_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|r| r.timestamp > cutoff)
                    .fold((0, 0), |(up, total), r| {
                        (up + usize::from(r.status == CheckStatus::Up), total + 1)
                    })
            })
            .unwrap_or((0, 0));

        Ok(uptime_percentage(up, total))
    }

    async fn get_average_response_time(
        &self,
        monitor_id: &str,
        hours: u32,
    ) -> StorageResult<f64> {
        let cutoff = window_start(hours);
        let state = self.state.read().await;

        let (sum, count) = state
            .results
            .get(monitor_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|r| r.timestamp > cutoff && r.is_up())
                    .fold((0u64, 0usize), |(sum, count), r| {
                        (sum + r.response_time, count + 1)
                    })
            })
            .unwrap_or((0, 0));

        Ok(average_response_time(sum, count))
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let state = self.state.read().await;
        let total_results: usize = state.results.values().map(Vec::len).sum();

        Ok(HealthStatus {
            healthy: true,
            message: "In-memory storage operational".to_string(),
            metadata: HashMap::from([
                ("backend".to_string(), "memory".to_string()),
                ("total_results".to_string(), total_results.to_string()),
            ]),
        })
    }

    async fn get_stats(&self) -> StorageResult<String> {
        let state = self.state.read().await;
        let total_results: usize = state.results.values().map(Vec::len).sum();

        Ok(format!(
            "In-Memory: {} monitors, {} check results",
            state.monitors.len(),
            total_results
        ))
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory backend (no-op)");
        Ok(())
    }
}
