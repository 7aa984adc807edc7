//! Scheduling core
//!
//! Owns the liveness map: the set of monitor ids that currently have a
//! running [`MonitorActor`](crate::actors::monitor::MonitorActor). At most one
//! actor exists per id; starting a monitor replaces any actor it already has.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use crate::actors::messages::CheckEvent;
use crate::actors::monitor::{MonitorHandle, ProbeCycle};
use crate::error::MonitorResult;
use crate::models::{CheckResult, Monitor};
use crate::probe::Probe;
use crate::storage::{MonitorRegistry, ResultStore, StorageResult};

/// Capacity of the check event channel before slow subscribers lag
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct MonitorScheduler {
    registry: Arc<dyn MonitorRegistry>,
    cycle: Arc<ProbeCycle>,

    /// Liveness map: monitor id -> running actor
    ///
    /// Held for the whole cancel-then-insert sequence in [`Self::start`] so two
    /// concurrent starts for the same id cannot both leave an actor behind.
    /// Nothing awaits an actor while holding it.
    active: Mutex<HashMap<String, MonitorHandle>>,
}

impl MonitorScheduler {
    pub fn new(
        registry: Arc<dyn MonitorRegistry>,
        results: Arc<dyn ResultStore>,
        probe: Arc<dyn Probe>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            registry,
            cycle: Arc::new(ProbeCycle::new(probe, results, event_tx)),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule `monitor`, replacing any actor it already has
    ///
    /// Inactive monitors are left alone. Returns whether a new actor was
    /// spawned.
    pub async fn start(&self, monitor: &Monitor) -> bool {
        if !monitor.is_active {
            debug!("monitor {} is inactive, not scheduling", monitor.name);
            return false;
        }

        let mut active = self.active.lock().await;

        if let Some(previous) = active.remove(&monitor.id) {
            debug!("replacing running actor for {}", monitor.id);
            previous.shutdown();
        }

        let handle = MonitorHandle::spawn(monitor, self.cycle.clone());
        active.insert(monitor.id.clone(), handle);

        info!(
            "started monitoring {} ({}) every {}s",
            monitor.name, monitor.url, monitor.interval
        );
        true
    }

    /// Unschedule a monitor; a no-op for ids that are not scheduled
    ///
    /// Returns whether an actor was stopped.
    pub async fn stop(&self, monitor_id: &str) -> bool {
        let handle = self.active.lock().await.remove(monitor_id);

        match handle {
            Some(handle) => {
                handle.shutdown();
                info!("stopped monitoring {monitor_id}");
                true
            }
            None => false,
        }
    }

    /// Re-read the monitor from the registry and reschedule it
    ///
    /// An inactive monitor ends up unscheduled. For an id the registry no
    /// longer knows this is a no-op and returns `false`.
    pub async fn restart(&self, monitor_id: &str) -> StorageResult<bool> {
        match self.registry.get_by_id(monitor_id).await? {
            Some(monitor) => {
                self.stop(monitor_id).await;
                Ok(self.start(&monitor).await)
            }
            None => {
                debug!("monitor {monitor_id} no longer exists, nothing to restart");
                Ok(false)
            }
        }
    }

    /// Schedule every active monitor in the registry
    ///
    /// Returns the number of monitors scheduled.
    pub async fn start_all(&self) -> StorageResult<usize> {
        let monitors = self.registry.get_all().await?;

        let mut started = 0;
        for monitor in monitors.iter().filter(|m| m.is_active) {
            if self.start(monitor).await {
                started += 1;
            }
        }

        info!("started {started} monitor(s)");
        Ok(started)
    }

    /// Unschedule everything
    pub async fn stop_all(&self) -> usize {
        let handles: Vec<MonitorHandle> = {
            let mut active = self.active.lock().await;
            active.drain().map(|(_, handle)| handle).collect()
        };

        let stopped = handles.len();
        for handle in &handles {
            handle.shutdown();
        }

        info!("stopped {stopped} monitor(s)");
        stopped
    }

    /// Run a check immediately and return the stored result
    ///
    /// Scheduled monitors are checked by their own actor; unscheduled ones are
    /// probed directly without being scheduled.
    pub async fn check_now(&self, monitor: &Monitor) -> MonitorResult<CheckResult> {
        let handle = self.active.lock().await.get(&monitor.id).cloned();

        match handle {
            Some(handle) => handle.check_now().await,
            None => self.cycle.run(&monitor.target()).await,
        }
    }

    pub async fn is_scheduled(&self, monitor_id: &str) -> bool {
        self.active.lock().await.contains_key(monitor_id)
    }

    /// Ids of all scheduled monitors, sorted
    pub async fn scheduled_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Receive every check result after it has been stored
    pub fn subscribe(&self) -> broadcast::Receiver<CheckEvent> {
        self.cycle.subscribe()
    }
}
