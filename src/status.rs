//! Status aggregation
//!
//! Combines the liveness map with the stored check history into the summary
//! the dashboard shows for each monitor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::models::{CheckResult, HttpMethod, Monitor};
use crate::scheduler::MonitorScheduler;
use crate::storage::{MonitorRegistry, ResultStore, StorageError, StorageResult};

/// Live status of one monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Whether the monitor is currently scheduled
    pub is_active: bool,

    /// Most recent result, absent while the monitor has never been checked
    pub latest_check: Option<CheckResult>,

    /// Share of `up` results in the window, 0-100
    pub uptime_percentage: f64,

    /// Mean response time of `up` results in the window, in milliseconds
    pub average_response_time: f64,
}

/// A monitor together with its live status
///
/// `isActive` reports the liveness map; the stored flag is exposed as
/// `enabled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorWithStatus {
    pub id: String,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub interval: u64,
    pub timeout: u64,
    pub expected_status: u16,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(flatten)]
    pub status: MonitorStatus,
}

impl MonitorWithStatus {
    pub fn new(monitor: Monitor, status: MonitorStatus) -> Self {
        Self {
            id: monitor.id,
            name: monitor.name,
            url: monitor.url,
            method: monitor.method,
            interval: monitor.interval,
            timeout: monitor.timeout,
            expected_status: monitor.expected_status,
            enabled: monitor.is_active,
            created_at: monitor.created_at,
            updated_at: monitor.updated_at,
            status,
        }
    }
}

pub struct StatusAggregator {
    registry: Arc<dyn MonitorRegistry>,
    results: Arc<dyn ResultStore>,
    scheduler: Arc<MonitorScheduler>,

    /// Trailing window for uptime and latency, in hours
    window_hours: u32,
}

impl StatusAggregator {
    pub fn new(
        registry: Arc<dyn MonitorRegistry>,
        results: Arc<dyn ResultStore>,
        scheduler: Arc<MonitorScheduler>,
        window_hours: u32,
    ) -> Self {
        Self {
            registry,
            results,
            scheduler,
            window_hours,
        }
    }

    pub fn window_hours(&self) -> u32 {
        self.window_hours
    }

    /// Status of a single monitor id
    ///
    /// Unknown ids are not an error: they report inactive with no history.
    #[instrument(skip(self))]
    pub async fn monitor_status(&self, monitor_id: &str) -> StorageResult<MonitorStatus> {
        let is_active = self.scheduler.is_scheduled(monitor_id).await;

        let (latest_check, uptime_percentage, average_response_time) = tokio::try_join!(
            self.results.get_latest_by_monitor_id(monitor_id),
            self.results
                .get_uptime_percentage(monitor_id, self.window_hours),
            self.results
                .get_average_response_time(monitor_id, self.window_hours),
        )?;

        Ok(MonitorStatus {
            is_active,
            latest_check,
            uptime_percentage,
            average_response_time,
        })
    }

    /// Every registered monitor with its status, in creation order
    #[instrument(skip(self))]
    pub async fn all_statuses(&self) -> StorageResult<Vec<MonitorWithStatus>> {
        let monitors = self.registry.get_all().await?;

        try_join_all(monitors.into_iter().map(|monitor| async move {
            let status = self.monitor_status(&monitor.id).await?;
            Ok::<_, StorageError>(MonitorWithStatus::new(monitor, status))
        }))
        .await
    }
}
