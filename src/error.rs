//! Errors surfaced by the monitoring service
//!
//! Probe failures never show up here: they are recorded as `down` results.
//! What remains are persistence failures, lookups of unknown monitors and
//! rejected input.

use crate::storage::StorageError;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The backing store failed; never masked so statistics stay honest
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("monitor not found: {0}")]
    NotFound(String),

    #[error("invalid monitor: {0}")]
    Invalid(String),

    /// The monitor's task exited before answering
    #[error("monitor task for {0} is no longer running")]
    Stopped(String),
}
