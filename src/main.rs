use anyhow::Result;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubeslo_telemetry::{
    api::AppState, config::Config, create_router, prometheus::PrometheusClient,
};

const LISTEN_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting KubeSLO Telemetry");

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        prometheus = %config.prometheus_address,
        timeout_secs = config.prometheus_timeout_secs,
        "Configuration loaded"
    );

    // One client for the whole process; reqwest pools connections internally
    let prometheus = PrometheusClient::new(&config.prometheus())?;
    let state = AppState::with_prometheus(prometheus);

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
