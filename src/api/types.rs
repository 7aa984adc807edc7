//! Request and response types of the HTTP API

use serde::{Deserialize, Serialize};

use crate::models::{
    DEFAULT_EXPECTED_STATUS, DEFAULT_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS, HttpMethod, MonitorUpdate,
    NewMonitor,
};

/// Default number of results returned by the history endpoint
pub const DEFAULT_CHECKS_LIMIT: usize = 50;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub scheduled_monitors: usize,
}

/// Confirmation returned after a delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Query parameters for the check history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecksQuery {
    pub limit: Option<usize>,
}

impl ChecksQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_CHECKS_LIMIT)
    }
}

/// Body of `POST /api/monitors`
///
/// Everything is optional at the wire level so a missing name or URL is
/// reported as a 400 with a readable message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMonitorRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub interval: Option<u64>,
    pub timeout: Option<u64>,
    pub expected_status: Option<u16>,
    pub is_active: Option<bool>,
}

impl CreateMonitorRequest {
    /// Fill in defaults; `None` when name or URL is missing or blank
    pub fn into_new_monitor(self) -> Option<NewMonitor> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        let url = self.url.filter(|u| !u.trim().is_empty())?;

        Some(NewMonitor {
            name,
            url,
            method: self.method.unwrap_or_default(),
            interval: clamp_interval(self.interval.unwrap_or(DEFAULT_INTERVAL_SECS)),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            expected_status: self.expected_status.unwrap_or(DEFAULT_EXPECTED_STATUS),
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Normalize the body of `PUT /api/monitors/:id`
pub fn normalize_update(mut update: MonitorUpdate) -> MonitorUpdate {
    update.interval = update.interval.map(clamp_interval);
    update
}

/// Intervals below one second are raised to one
fn clamp_interval(interval: u64) -> u64 {
    interval.max(1)
}
