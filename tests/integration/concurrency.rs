//! Concurrency and race condition tests
//!
//! - Concurrent starts of one monitor leave a single actor
//! - Lifecycle operations on one monitor leave the others running
//! - On-demand checks run alongside the timers
//! - A monitor stuck on a slow target blocks nobody else

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use uptime_monitor::models::MonitorUpdate;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn test_concurrent_starts_leave_one_timer() {
    let (service, probe) = counting_service();

    let mut data = new_monitor("Racy", "https://example.com", 1);
    data.is_active = false;
    let mut monitor = service.create_monitor(data).await.unwrap();
    monitor.is_active = true;

    let starts = (0..10).map(|_| {
        let service = service.clone();
        let monitor = monitor.clone();
        tokio::spawn(async move { service.start_monitoring(&monitor).await })
    });
    for started in join_all(starts).await {
        assert!(started.unwrap());
    }

    assert_eq!(service.scheduler().scheduled_ids().await, vec![monitor.id.clone()]);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let before = probe.calls();
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(probe.calls() - before, 3);

    service.stop_all_monitors().await;
}

#[tokio::test(start_paused = true)]
async fn test_stopping_one_monitor_leaves_others_running() {
    let (service, _probe) = counting_service();

    let mut ids = vec![];
    for i in 0..5 {
        let monitor = service
            .create_monitor(new_monitor(&format!("m{i}"), "https://example.com", 1))
            .await
            .unwrap();
        ids.push(monitor.id);
    }

    service.stop_monitoring(&ids[2]).await;
    tokio::time::sleep(Duration::from_millis(2500)).await;

    for (i, id) in ids.iter().enumerate() {
        let checks = service.get_checks(id, None).await.unwrap();
        if i == 2 {
            assert!(checks.len() <= 1, "stopped monitor kept ticking");
        } else {
            assert_eq!(checks.len(), 3, "monitor {i} missed ticks");
        }
    }

    let statuses = service.get_all_monitor_statuses().await.unwrap();
    assert_eq!(statuses.len(), 5);
    for status in statuses {
        assert_eq!(status.status.is_active, status.id != ids[2]);
    }

    service.stop_all_monitors().await;
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_check_now_calls() {
    let (service, _probe) = counting_service();

    let monitor = service
        .create_monitor(new_monitor("Busy", "https://example.com", 60))
        .await
        .unwrap();

    let checks = (0..8).map(|_| {
        let service = service.clone();
        let id = monitor.id.clone();
        tokio::spawn(async move { service.check_now(&id).await })
    });
    for result in join_all(checks).await {
        assert!(result.unwrap().unwrap().is_up());
    }

    tokio::time::sleep(Duration::from_millis(10)).await;

    // the fire-on-start check plus eight on-demand ones
    let history = service.get_checks(&monitor.id, None).await.unwrap();
    assert_eq!(history.len(), 9);

    service.stop_all_monitors().await;
}

#[tokio::test(start_paused = true)]
async fn test_delete_while_running() {
    let (service, probe) = counting_service();

    let monitor = service
        .create_monitor(new_monitor("Short-lived", "https://example.com", 1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    service.delete_monitor(&monitor.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let calls = probe.calls();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(probe.calls(), calls);
    assert!(service.scheduler().scheduled_ids().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_target_does_not_stall_other_monitors() {
    let service = service_with_probe(
        &memory_storage(),
        Arc::new(SlowCheck::new(Duration::from_secs(600))),
    );

    let slow = service
        .create_monitor(new_monitor("Slow", "https://slow.example.com", 3600))
        .await
        .unwrap();
    let mut fast = vec![];
    for i in 0..3 {
        let monitor = service
            .create_monitor(new_monitor(&format!("fast{i}"), "https://example.com", 1))
            .await
            .unwrap();
        fast.push(monitor);
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    // pile up on-demand checks behind the slow monitor's running cycle
    for _ in 0..40 {
        let service = service.clone();
        let id = slow.id.clone();
        tokio::spawn(async move { service.check_now(&id).await });
    }
    tokio::time::sleep(Duration::from_millis(10)).await;

    let limit = Duration::from_secs(1);

    // editing the slow monitor replaces its actor without waiting for it
    let update = MonitorUpdate {
        interval: Some(1800),
        ..Default::default()
    };
    let updated = timeout(limit, service.update_monitor(&slow.id, update))
        .await
        .expect("update blocked")
        .unwrap();
    assert_eq!(updated.interval, 1800);

    let statuses = timeout(limit, service.get_all_monitor_statuses())
        .await
        .expect("status listing blocked")
        .unwrap();
    assert_eq!(statuses.len(), 4);
    assert!(statuses.iter().all(|s| s.status.is_active));

    assert!(
        timeout(limit, service.stop_monitoring(&fast[0].id))
            .await
            .expect("stop blocked")
    );

    tokio::time::sleep(Duration::from_millis(2500)).await;
    for monitor in &fast[1..] {
        let checks = service.get_checks(&monitor.id, None).await.unwrap();
        assert!(checks.len() >= 3, "{} missed ticks", monitor.name);
    }
    assert!(service.get_checks(&slow.id, None).await.unwrap().is_empty());

    let stopped = timeout(limit, service.stop_all_monitors())
        .await
        .expect("stop_all blocked");
    assert_eq!(stopped, 3);
}
