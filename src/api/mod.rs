//! REST API for the uptime monitor
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/monitors` - All monitors with live status
//! - `POST /api/monitors` - Create a monitor (scheduled when active)
//! - `GET /api/monitors/:id` - One monitor with live status
//! - `PUT /api/monitors/:id` - Partial update (rescheduled or unscheduled)
//! - `DELETE /api/monitors/:id` - Unschedule and delete with history
//! - `GET /api/monitors/:id/checks?limit=N` - Check history, newest first
//! - `POST /api/monitors/:id/check` - Run one check now

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{ChecksQuery, DeleteResponse, HealthResponse};

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiSettings;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_addr: SocketAddr,

    /// Optional authentication token
    pub auth_token: Option<String>,

    /// Enable CORS for dashboard
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiSettings::default().into()
    }
}

impl From<ApiSettings> for ApiConfig {
    fn from(settings: ApiSettings) -> Self {
        Self {
            bind_addr: settings.bind,
            auth_token: settings.token,
            enable_cors: settings.cors,
        }
    }
}

/// Build the router with every route and layer applied
pub fn build_router(config: &ApiConfig, state: ApiState) -> Router {
    let mut app = Router::new()
        .route("/api/health", get(routes::health::health_check))
        .route(
            "/api/monitors",
            get(routes::monitors::list_monitors).post(routes::monitors::create_monitor),
        )
        .route(
            "/api/monitors/:id",
            get(routes::monitors::get_monitor)
                .put(routes::monitors::update_monitor)
                .delete(routes::monitors::delete_monitor),
        )
        .route("/api/monitors/:id/checks", get(routes::checks::list_checks))
        .route("/api/monitors/:id/check", post(routes::checks::check_now))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    if let Some(token) = config.auth_token.clone() {
        app = app.layer(axum::middleware::from_fn_with_state(
            token,
            middleware::auth::auth_middleware,
        ));
    }

    app
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = build_router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
