//! Integration tests for the HTTP API
//!
//! Each test spawns the server on an ephemeral port with an in-memory store
//! and a counting probe, then talks to it with reqwest.

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};
use uptime_monitor::MonitoringService;
use uptime_monitor::api::{ApiConfig, ApiState, spawn_api_server};

use crate::helpers::*;

const TOKEN: &str = "test-token";

async fn spawn_test_api(service: Arc<MonitoringService>, token: Option<&str>) -> SocketAddr {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        auth_token: token.map(str::to_string),
        enable_cors: true,
    };
    spawn_api_server(config, ApiState::new(service)).await.unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (service, _probe) = counting_service();
    let addr = spawn_test_api(service, None).await;

    let response = client()
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
    assert_eq!(json["scheduledMonitors"], 0);
}

#[tokio::test]
async fn test_monitor_lifecycle() {
    let (service, _probe) = counting_service();
    let addr = spawn_test_api(service.clone(), None).await;
    let base = format!("http://{addr}/api/monitors");

    // create
    let response = client()
        .post(&base)
        .json(&json!({ "name": "Example", "url": "https://example.com", "interval": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["interval"], 1);
    assert_eq!(created["method"], "GET");
    assert_eq!(created["expectedStatus"], 200);
    assert!(service.scheduler().is_scheduled(&id).await);

    // list
    let listed: Value = client().get(&base).send().await.unwrap().json().await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["isActive"], true);
    assert!(listed[0]["uptimePercentage"].is_number());

    // update: deactivate
    let response = client()
        .put(format!("{base}/{id}"))
        .json(&json!({ "isActive": false, "name": "Renamed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "Renamed");
    assert!(!service.scheduler().is_scheduled(&id).await);

    // get one
    let fetched: Value = client()
        .get(format!("{base}/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["isActive"], false);
    assert_eq!(fetched["enabled"], false);

    // on-demand check, then history
    let response = client()
        .post(format!("{base}/{id}/check"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let check: Value = response.json().await.unwrap();
    assert_eq!(check["monitorId"], id.as_str());
    assert_eq!(check["status"], "up");

    let history: Value = client()
        .get(format!("{base}/{id}/checks?limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], check["id"]);

    // delete
    let response = client()
        .delete(format!("{base}/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: Value = response.json().await.unwrap();
    assert!(deleted["message"].is_string());

    let response = client().get(format!("{base}/{id}")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_requests() {
    let (service, _probe) = counting_service();
    let addr = spawn_test_api(service, None).await;
    let base = format!("http://{addr}/api/monitors");

    let response = client()
        .post(&base)
        .json(&json!({ "name": "No URL" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Name and URL are required");

    let response = client()
        .post(&base)
        .json(&json!({ "name": "Bad", "url": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client()
        .post(&base)
        .header("content-type", "application/json")
        .body("{")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for (method, path) in [
        (reqwest::Method::GET, "missing"),
        (reqwest::Method::DELETE, "missing"),
        (reqwest::Method::POST, "missing/check"),
    ] {
        let response = client()
            .request(method.clone(), format!("{base}/{path}"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {path}");
    }

    let response = client()
        .put(format!("{base}/missing"))
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // history of an unknown id is just empty
    let response = client()
        .get(format!("{base}/missing/checks"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));

    for field in ["interval", "timeout"] {
        let mut body = json!({ "name": "Huge", "url": "https://example.com" });
        body[field] = json!(u64::MAX);

        let response = client()
            .post(&base)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");
    }
}

#[tokio::test]
async fn test_token_required_when_configured() {
    let (service, _probe) = counting_service();
    let addr = spawn_test_api(service, Some(TOKEN)).await;

    let response = client()
        .get(format!("http://{addr}/api/monitors"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client()
        .get(format!("http://{addr}/api/monitors"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client()
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
