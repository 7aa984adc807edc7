//! Monitoring service facade
//!
//! The single entry point the API and the hub binary talk to. It keeps the
//! registry and the scheduler in step: creating an active monitor schedules
//! it, updating reschedules it, deleting unschedules it before the row goes.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::actors::messages::CheckEvent;
use crate::error::{MonitorError, MonitorResult};
use crate::models::{CheckResult, Monitor, MonitorUpdate, NewMonitor};
use crate::probe::Probe;
use crate::scheduler::MonitorScheduler;
use crate::status::{MonitorStatus, MonitorWithStatus, StatusAggregator};
use crate::storage::{MonitorRegistry, ResultStore, Storage};

pub struct MonitoringService {
    registry: Arc<dyn MonitorRegistry>,
    results: Arc<dyn ResultStore>,
    scheduler: Arc<MonitorScheduler>,
    status: StatusAggregator,
}

impl MonitoringService {
    pub fn new(storage: &Storage, probe: Arc<dyn Probe>, window_hours: u32) -> Self {
        let scheduler = Arc::new(MonitorScheduler::new(
            storage.registry.clone(),
            storage.results.clone(),
            probe,
        ));
        let status = StatusAggregator::new(
            storage.registry.clone(),
            storage.results.clone(),
            scheduler.clone(),
            window_hours,
        );

        Self {
            registry: storage.registry.clone(),
            results: storage.results.clone(),
            scheduler,
            status,
        }
    }

    pub fn scheduler(&self) -> &Arc<MonitorScheduler> {
        &self.scheduler
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    pub async fn start_monitoring(&self, monitor: &Monitor) -> bool {
        self.scheduler.start(monitor).await
    }

    pub async fn stop_monitoring(&self, monitor_id: &str) -> bool {
        self.scheduler.stop(monitor_id).await
    }

    pub async fn restart_monitoring(&self, monitor_id: &str) -> MonitorResult<bool> {
        Ok(self.scheduler.restart(monitor_id).await?)
    }

    pub async fn start_all_monitors(&self) -> MonitorResult<usize> {
        Ok(self.scheduler.start_all().await?)
    }

    pub async fn stop_all_monitors(&self) -> usize {
        self.scheduler.stop_all().await
    }

    pub async fn get_monitor_status(&self, monitor_id: &str) -> MonitorResult<MonitorStatus> {
        Ok(self.status.monitor_status(monitor_id).await?)
    }

    pub async fn get_all_monitor_statuses(&self) -> MonitorResult<Vec<MonitorWithStatus>> {
        Ok(self.status.all_statuses().await?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CheckEvent> {
        self.scheduler.subscribe()
    }

    // ---------------------------------------------------------------------
    // Registry operations coupled to scheduling
    // ---------------------------------------------------------------------

    /// Monitor with its live status
    pub async fn get_monitor(&self, monitor_id: &str) -> MonitorResult<MonitorWithStatus> {
        let monitor = self.find(monitor_id).await?;
        let status = self.status.monitor_status(monitor_id).await?;
        Ok(MonitorWithStatus::new(monitor, status))
    }

    /// Register a monitor and schedule it when active
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn create_monitor(&self, data: NewMonitor) -> MonitorResult<Monitor> {
        data.validate().map_err(MonitorError::Invalid)?;

        let monitor = self.registry.create(data).await?;
        info!("created monitor {} ({})", monitor.name, monitor.id);

        if monitor.is_active {
            self.scheduler.start(&monitor).await;
        }
        Ok(monitor)
    }

    /// Apply a partial update, then reschedule or unschedule
    #[instrument(skip(self, data))]
    pub async fn update_monitor(
        &self,
        monitor_id: &str,
        data: MonitorUpdate,
    ) -> MonitorResult<Monitor> {
        data.validate().map_err(MonitorError::Invalid)?;

        let monitor = self
            .registry
            .update(monitor_id, data)
            .await?
            .ok_or_else(|| MonitorError::NotFound(monitor_id.to_string()))?;

        if monitor.is_active {
            self.scheduler.restart(monitor_id).await?;
        } else {
            self.scheduler.stop(monitor_id).await;
        }
        Ok(monitor)
    }

    /// Unschedule, then delete the monitor and its history
    #[instrument(skip(self))]
    pub async fn delete_monitor(&self, monitor_id: &str) -> MonitorResult<Monitor> {
        self.scheduler.stop(monitor_id).await;

        let monitor = self
            .registry
            .delete(monitor_id)
            .await?
            .ok_or_else(|| MonitorError::NotFound(monitor_id.to_string()))?;

        info!("deleted monitor {} ({})", monitor.name, monitor.id);
        Ok(monitor)
    }

    /// Stored history, newest first
    ///
    /// Ids without history, including unknown ones, give an empty list.
    pub async fn get_checks(
        &self,
        monitor_id: &str,
        limit: Option<usize>,
    ) -> MonitorResult<Vec<CheckResult>> {
        Ok(self.results.get_by_monitor_id(monitor_id, limit).await?)
    }

    /// Run one probe cycle right away
    pub async fn check_now(&self, monitor_id: &str) -> MonitorResult<CheckResult> {
        let monitor = self.find(monitor_id).await?;
        self.scheduler.check_now(&monitor).await
    }

    /// Insert `monitors` when the registry is empty
    ///
    /// Returns the number inserted; an already populated registry is left alone.
    pub async fn seed_monitors(&self, monitors: Vec<NewMonitor>) -> MonitorResult<usize> {
        if !self.registry.get_all().await?.is_empty() {
            return Ok(0);
        }

        let mut seeded = 0;
        for data in monitors {
            data.validate()
                .map_err(|e| MonitorError::Invalid(format!("{}: {e}", data.name)))?;
            self.registry.create(data).await?;
            seeded += 1;
        }

        info!("seeded {seeded} monitor(s)");
        Ok(seeded)
    }

    async fn find(&self, monitor_id: &str) -> MonitorResult<Monitor> {
        self.registry
            .get_by_id(monitor_id)
            .await?
            .ok_or_else(|| MonitorError::NotFound(monitor_id.to_string()))
    }
}
