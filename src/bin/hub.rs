use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use uptime_monitor::{
    MonitoringService,
    config::{Config, read_config_file},
    probe::HttpProbe,
    storage,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON); defaults are used when omitted
    #[arg(short, long)]
    file: Option<String>,

    /// Log level for the hub and the library
    #[arg(long, default_value = "trace")]
    log_level: LevelFilter,
}

fn init(level: LevelFilter) {
    let filter = filter::Targets::new()
        .with_targets(vec![("uptime_monitor", level), ("hub", level)]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides();

    let storage = storage::open(&config.storage, config.retention.max_results_per_monitor).await?;

    let health = storage.backend.health_check().await?;
    if !health.healthy {
        anyhow::bail!("storage backend is unhealthy: {}", health.message);
    }
    info!("storage backend healthy: {}", health.message);

    let service = Arc::new(MonitoringService::new(
        &storage,
        Arc::new(HttpProbe::new()),
        config.uptime_window_hours,
    ));

    if let Some(monitors) = config.monitors.clone() {
        service.seed_monitors(monitors).await?;
    }

    service.start_all_monitors().await?;

    #[cfg(feature = "api")]
    {
        use uptime_monitor::api::{ApiConfig, ApiState, spawn_api_server};

        let api_config = ApiConfig::from(config.api.clone());
        if api_config.auth_token.is_none() {
            warn!("API token not set, the API is open to anyone who can reach it");
        }
        spawn_api_server(api_config, ApiState::new(service.clone())).await?;
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    service.stop_all_monitors().await;
    if let Err(e) = storage.backend.close().await {
        error!("failed to close storage: {e}");
    }

    Ok(())
}
