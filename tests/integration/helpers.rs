//! Helper functions for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uptime_monitor::MonitoringService;
use uptime_monitor::models::{CheckResult, NewMonitor, ProbeTarget};
use uptime_monitor::probe::Probe;
use uptime_monitor::storage::Storage;
use uptime_monitor::storage::memory::MemoryBackend;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Probe that answers `up` without network access and counts its calls
#[derive(Default)]
pub struct CountingProbe {
    calls: AtomicUsize,
}

impl CountingProbe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for CountingProbe {
    async fn execute(&self, target: &ProbeTarget) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CheckResult::up(target.monitor_id.clone(), 10, target.expected_status)
    }
}

/// Takes `delay` to answer for any URL containing "slow", answers `up` at
/// once otherwise
pub struct SlowCheck {
    delay: Duration,
}

impl SlowCheck {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Probe for SlowCheck {
    async fn execute(&self, target: &ProbeTarget) -> CheckResult {
        if target.url.contains("slow") {
            tokio::time::sleep(self.delay).await;
        }
        CheckResult::up(target.monitor_id.clone(), 10, target.expected_status)
    }
}

pub fn memory_storage() -> Storage {
    Storage::new(MemoryBackend::new())
}

pub fn service_with_probe(storage: &Storage, probe: Arc<dyn Probe>) -> Arc<MonitoringService> {
    Arc::new(MonitoringService::new(storage, probe, 24))
}

/// In-memory service driven by a counting probe
pub fn counting_service() -> (Arc<MonitoringService>, Arc<CountingProbe>) {
    let probe = Arc::new(CountingProbe::default());
    let service = service_with_probe(&memory_storage(), probe.clone());
    (service, probe)
}

pub fn new_monitor(name: &str, url: &str, interval: u64) -> NewMonitor {
    let mut monitor = NewMonitor::new(name, url);
    monitor.interval = interval;
    monitor.timeout = 5;
    monitor
}

/// Mock target at `/status` that alternates 200 and 500, starting with 200
pub async fn alternating_target() -> MockServer {
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(move |_req: &wiremock::Request| {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                ResponseTemplate::new(200)
            } else {
                ResponseTemplate::new(500)
            }
        })
        .mount(&server)
        .await;

    server
}
