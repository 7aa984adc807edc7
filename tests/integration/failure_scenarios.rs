//! Failure scenario tests
//!
//! - Result store writes failing
//! - Registry reads failing
//! - Probe failures recorded as `down`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uptime_monitor::MonitorError;
use uptime_monitor::models::{CheckResult, Monitor, MonitorUpdate, NewMonitor};
use uptime_monitor::storage::memory::MemoryBackend;
use uptime_monitor::storage::{
    MonitorRegistry, ResultStore, Storage, StorageError, StorageResult,
};

use crate::helpers::*;

/// Result store whose writes can be switched off
struct FlakyResults {
    inner: MemoryBackend,
    failing: AtomicBool,
}

#[async_trait]
impl ResultStore for FlakyResults {
    async fn create(&self, result: CheckResult) -> StorageResult<CheckResult> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::QueryFailed("disk full".to_string()));
        }
        ResultStore::create(&self.inner, result).await
    }

    async fn get_by_monitor_id(
        &self,
        monitor_id: &str,
        limit: Option<usize>,
    ) -> StorageResult<Vec<CheckResult>> {
        self.inner.get_by_monitor_id(monitor_id, limit).await
    }

    async fn get_latest_by_monitor_id(&self, monitor_id: &str) -> StorageResult<Option<CheckResult>> {
        self.inner.get_latest_by_monitor_id(monitor_id).await
    }

    async fn get_uptime_percentage(&self, monitor_id: &str, hours: u32) -> StorageResult<f64> {
        self.inner.get_uptime_percentage(monitor_id, hours).await
    }

    async fn get_average_response_time(&self, monitor_id: &str, hours: u32) -> StorageResult<f64> {
        self.inner.get_average_response_time(monitor_id, hours).await
    }
}

/// Registry that fails every call
struct BrokenRegistry;

#[async_trait]
impl MonitorRegistry for BrokenRegistry {
    async fn get_all(&self) -> StorageResult<Vec<Monitor>> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> StorageResult<Option<Monitor>> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn create(&self, _data: NewMonitor) -> StorageResult<Monitor> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn update(&self, _id: &str, _data: MonitorUpdate) -> StorageResult<Option<Monitor>> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }

    async fn delete(&self, _id: &str) -> StorageResult<Option<Monitor>> {
        Err(StorageError::ConnectionFailed("database is gone".to_string()))
    }
}

fn flaky_storage() -> (Storage, Arc<FlakyResults>) {
    let memory = Arc::new(MemoryBackend::new());
    let results = Arc::new(FlakyResults {
        inner: MemoryBackend::new(),
        failing: AtomicBool::new(false),
    });

    let storage = Storage {
        registry: memory.clone(),
        results: results.clone(),
        backend: memory,
    };
    (storage, results)
}

#[tokio::test(start_paused = true)]
async fn test_check_now_propagates_write_failure() {
    let (storage, results) = flaky_storage();
    let probe = Arc::new(CountingProbe::default());
    let service = service_with_probe(&storage, probe.clone());

    let mut data = new_monitor("Doomed", "https://example.com", 60);
    data.is_active = false;
    let monitor = service.create_monitor(data).await.unwrap();

    results.failing.store(true, Ordering::SeqCst);

    let err = service.check_now(&monitor.id).await.unwrap_err();
    assert!(matches!(
        err,
        MonitorError::Storage(StorageError::QueryFailed(_))
    ));
    assert_eq!(probe.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timer_survives_write_failures() {
    let (storage, results) = flaky_storage();
    let probe = Arc::new(CountingProbe::default());
    let service = service_with_probe(&storage, probe.clone());

    results.failing.store(true, Ordering::SeqCst);
    let monitor = service
        .create_monitor(new_monitor("Stubborn", "https://example.com", 1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(probe.calls(), 3);
    assert!(service.get_checks(&monitor.id, None).await.unwrap().is_empty());

    // writes recover, the same actor keeps going
    results.failing.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(service.get_checks(&monitor.id, None).await.unwrap().len(), 2);

    service.stop_all_monitors().await;
}

#[tokio::test]
async fn test_registry_failures_propagate() {
    let memory = Arc::new(MemoryBackend::new());
    let storage = Storage {
        registry: Arc::new(BrokenRegistry),
        results: memory.clone(),
        backend: memory,
    };
    let service = service_with_probe(&storage, Arc::new(CountingProbe::default()));

    assert!(matches!(
        service.start_all_monitors().await.unwrap_err(),
        MonitorError::Storage(StorageError::ConnectionFailed(_))
    ));
    assert!(matches!(
        service.restart_monitoring("any").await.unwrap_err(),
        MonitorError::Storage(_)
    ));
    assert!(matches!(
        service.get_all_monitor_statuses().await.unwrap_err(),
        MonitorError::Storage(_)
    ));

    // stop never touches the registry
    assert!(!service.stop_monitoring("any").await);
}
