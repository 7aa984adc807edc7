//! Message types for actor communication
//!
//! Commands travel to a single monitor actor over its mpsc channel. Shutdown
//! is a separate watch signal so it never queues behind pending checks. Stored
//! check results fan out to any number of subscribers over a broadcast
//! channel; slow subscribers may lag and miss results, the store stays
//! authoritative.

use tokio::sync::oneshot;

use crate::error::MonitorResult;
use crate::models::CheckResult;

/// Event published after a check result has been persisted
pub type CheckEvent = CheckResult;

/// Commands that can be sent to a MonitorActor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Run a probe cycle immediately, outside the interval timer
    CheckNow {
        respond_to: oneshot::Sender<MonitorResult<CheckResult>>,
    },
}
