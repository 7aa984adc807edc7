//! Core data model: monitors and the check results they produce
//!
//! These types are shared by the storage backends, the scheduler, the status
//! aggregator and the HTTP API. JSON field names are camelCase because the
//! dashboard consumes them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default poll interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default probe timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default expected HTTP status code
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

/// Longest accepted poll interval: 30 days
pub const MAX_INTERVAL_SECS: u64 = 30 * 24 * 60 * 60;

/// Longest accepted request timeout: one hour
pub const MAX_TIMEOUT_SECS: u64 = 60 * 60;

/// HTTP method used for a probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

/// A configured HTTP target that is checked on a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    /// Unique identifier (assigned by the registry)
    pub id: String,

    /// Human-readable display name
    pub name: String,

    /// Target URL
    pub url: String,

    /// HTTP method used for the probe
    pub method: HttpMethod,

    /// Poll interval in seconds (>= 1)
    pub interval: u64,

    /// Probe timeout in seconds (> 0)
    pub timeout: u64,

    /// Status code that counts as "up"
    pub expected_status: u16,

    /// Whether the monitor should be scheduled
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Monitor {
    /// Build the probe target for this monitor
    pub fn target(&self) -> ProbeTarget {
        ProbeTarget {
            monitor_id: self.id.clone(),
            url: self.url.clone(),
            method: self.method,
            timeout_secs: self.timeout,
            expected_status: self.expected_status,
        }
    }
}

/// Payload for creating a monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonitor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_expected_status() -> u16 {
    DEFAULT_EXPECTED_STATUS
}

fn default_active() -> bool {
    true
}

impl NewMonitor {
    /// Create a payload with default schedule settings
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: HttpMethod::default(),
            interval: DEFAULT_INTERVAL_SECS,
            timeout: DEFAULT_TIMEOUT_SECS,
            expected_status: DEFAULT_EXPECTED_STATUS,
            is_active: true,
        }
    }

    /// Check the monitor invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        validate_url(&self.url)?;
        validate_schedule(self.interval, self.timeout)
    }

    /// Turn the payload into a stored monitor with a fresh id
    pub fn into_monitor(self, now: DateTime<Utc>) -> Monitor {
        Monitor {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            url: self.url,
            method: self.method,
            interval: self.interval,
            timeout: self.timeout,
            expected_status: self.expected_status,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a monitor; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorUpdate {
    pub name: Option<String>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub interval: Option<u64>,
    pub timeout: Option<u64>,
    pub expected_status: Option<u16>,
    pub is_active: Option<bool>,
}

impl MonitorUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".to_string());
            }
        }
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        validate_schedule(self.interval.unwrap_or(1), self.timeout.unwrap_or(1))
    }

    /// Apply the update in place and bump `updated_at`
    pub fn apply_to(&self, monitor: &mut Monitor, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            monitor.name = name.clone();
        }
        if let Some(url) = &self.url {
            monitor.url = url.clone();
        }
        if let Some(method) = self.method {
            monitor.method = method;
        }
        if let Some(interval) = self.interval {
            monitor.interval = interval;
        }
        if let Some(timeout) = self.timeout {
            monitor.timeout = timeout;
        }
        if let Some(expected_status) = self.expected_status {
            monitor.expected_status = expected_status;
        }
        if let Some(is_active) = self.is_active {
            monitor.is_active = is_active;
        }
        monitor.updated_at = now;
    }
}

fn validate_url(url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| format!("invalid url '{url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!("unsupported url scheme '{scheme}'")),
    }
}

fn validate_schedule(interval: u64, timeout: u64) -> Result<(), String> {
    if !(1..=MAX_INTERVAL_SECS).contains(&interval) {
        return Err(format!(
            "interval must be between 1 and {MAX_INTERVAL_SECS} seconds"
        ));
    }
    if !(1..=MAX_TIMEOUT_SECS).contains(&timeout) {
        return Err(format!(
            "timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
        ));
    }
    Ok(())
}

/// Everything the probe executor needs to check one monitor
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTarget {
    pub monitor_id: String,
    pub url: String,
    pub method: HttpMethod,
    pub timeout_secs: u64,
    pub expected_status: u16,
}

/// Outcome classification of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Up => "up",
            CheckStatus::Down => "down",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(CheckStatus::Up),
            "down" => Ok(CheckStatus::Down),
            other => Err(format!("unknown check status: {other}")),
        }
    }
}

/// Result of one probe cycle
///
/// Immutable once written. `status_code` is `None` when no response arrived,
/// `error` is only set for `Down` results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: String,
    pub monitor_id: String,
    pub status: CheckStatus,

    /// Milliseconds from dispatch to completion (or failure)
    pub response_time: u64,

    pub status_code: Option<u16>,
    pub error: Option<String>,

    /// Completion time of the probe
    pub timestamp: DateTime<Utc>,
}

impl CheckResult {
    pub fn up(monitor_id: impl Into<String>, response_time: u64, status_code: u16) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            monitor_id: monitor_id.into(),
            status: CheckStatus::Up,
            response_time,
            status_code: Some(status_code),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn down(
        monitor_id: impl Into<String>,
        response_time: u64,
        status_code: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            monitor_id: monitor_id.into(),
            status: CheckStatus::Down,
            response_time,
            status_code,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Override the completion timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }
}
