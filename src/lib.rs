//! Website uptime monitor
//!
//! Periodically checks HTTP targets, stores every result with count-based
//! retention and aggregates uptime and latency per monitor.
//!
//! - [`probe`]: one HTTP check, always producing a [`models::CheckResult`]
//! - [`storage`]: monitor registry and result store (in-memory or SQLite)
//! - [`scheduler`]: one actor per active monitor, the liveness map
//! - [`status`]: uptime and latency over a trailing window
//! - [`service`]: the facade used by the API and the hub binary

pub mod actors;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod probe;
pub mod scheduler;
pub mod service;
pub mod status;
pub mod storage;
pub mod util;

pub use error::{MonitorError, MonitorResult};
pub use models::{CheckResult, CheckStatus, HttpMethod, Monitor, MonitorUpdate, NewMonitor};
pub use service::MonitoringService;
