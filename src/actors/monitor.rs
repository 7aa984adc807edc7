//! MonitorActor - periodically checks one monitor's URL
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → Probe → ResultStore::create → publish CheckEvent
//!     ↑
//!     └─── Commands (CheckNow), shutdown signal
//! ```
//!
//! The first tick fires as soon as the actor starts, so a newly scheduled
//! monitor is checked immediately and then every `interval` seconds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, instrument, trace, warn};

use crate::error::{MonitorError, MonitorResult};
use crate::models::{CheckResult, Monitor, ProbeTarget};
use crate::probe::Probe;
use crate::storage::ResultStore;

use super::messages::{CheckEvent, MonitorCommand};

/// One probe cycle: execute, persist, publish
///
/// Shared by every actor and by on-demand checks of unscheduled monitors.
pub struct ProbeCycle {
    probe: Arc<dyn Probe>,
    results: Arc<dyn ResultStore>,
    event_tx: broadcast::Sender<CheckEvent>,
}

impl ProbeCycle {
    pub fn new(
        probe: Arc<dyn Probe>,
        results: Arc<dyn ResultStore>,
        event_tx: broadcast::Sender<CheckEvent>,
    ) -> Self {
        Self {
            probe,
            results,
            event_tx,
        }
    }

    /// Probe the target and persist the outcome
    ///
    /// Probe failures are already folded into a `down` result; the only error
    /// returned here is a failed write to the result store.
    pub async fn run(&self, target: &ProbeTarget) -> MonitorResult<CheckResult> {
        trace!("checking {}", target.url);

        let result = self.probe.execute(target).await;
        let stored = self.results.create(result).await?;

        debug!(
            monitor_id = %stored.monitor_id,
            status = %stored.status,
            response_time_ms = stored.response_time,
            "check recorded"
        );

        // no subscribers is fine
        let _ = self.event_tx.send(stored.clone());

        Ok(stored)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CheckEvent> {
        self.event_tx.subscribe()
    }
}

/// Actor that checks a single monitor on its interval
///
/// The actor works on a snapshot of the monitor taken when it was spawned.
/// Configuration changes take effect by replacing the actor.
pub struct MonitorActor {
    name: String,
    target: ProbeTarget,
    cycle: Arc<ProbeCycle>,
    command_rx: mpsc::Receiver<MonitorCommand>,
    shutdown_rx: watch::Receiver<bool>,
    interval_duration: Duration,
}

impl MonitorActor {
    pub fn new(
        monitor: &Monitor,
        cycle: Arc<ProbeCycle>,
        command_rx: mpsc::Receiver<MonitorCommand>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            name: monitor.name.clone(),
            target: monitor.target(),
            cycle,
            command_rx,
            shutdown_rx,
            interval_duration: Duration::from_secs(monitor.interval.max(1)),
        }
    }

    /// Run the actor's main loop
    ///
    /// This runs until:
    /// - The shutdown signal is raised
    /// - Every handle has been dropped
    ///
    /// A cycle that is already running finishes before the signal is seen;
    /// queued CheckNow requests are dropped and their callers get `Stopped`.
    #[instrument(skip(self), fields(monitor = %self.name))]
    pub async fn run(mut self) {
        debug!("starting monitor actor");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Shutdown wins over queued commands and a due tick
                biased;

                _ = self.shutdown_rx.changed() => {
                    debug!("shutdown requested");
                    break;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(MonitorCommand::CheckNow { respond_to }) => {
                            debug!("received CheckNow command");
                            let result = self.cycle.run(&self.target).await;
                            let _ = respond_to.send(result);
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.cycle.run(&self.target).await {
                        error!("failed to record check for {}: {e}", self.target.url);
                    }
                }
            }
        }

        debug!("monitor actor stopped");
    }
}

/// Handle for controlling a MonitorActor
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    monitor_id: String,
}

impl MonitorHandle {
    /// Spawn a new actor for `monitor`
    pub fn spawn(monitor: &Monitor, cycle: Arc<ProbeCycle>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let actor = MonitorActor::new(monitor, cycle, cmd_rx, shutdown_rx);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            shutdown_tx: Arc::new(shutdown_tx),
            monitor_id: monitor.id.clone(),
        }
    }

    /// Run a check right away and wait for the stored result
    pub async fn check_now(&self) -> MonitorResult<CheckResult> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::CheckNow { respond_to: tx })
            .await
            .map_err(|_| MonitorError::Stopped(self.monitor_id.clone()))?;

        rx.await
            .map_err(|_| MonitorError::Stopped(self.monitor_id.clone()))?
    }

    /// Shut down the actor
    ///
    /// Returns immediately. Neither a full command queue nor an in-flight
    /// probe delays the caller.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    pub fn monitor_id(&self) -> &str {
        &self.monitor_id
    }
}

// ============================================================================
// Tests
// ============================================================================
