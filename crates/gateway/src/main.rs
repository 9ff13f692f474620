//! H.I.V.E gateway - honeypot validation and lifecycle API
//!
//! Sits between the builder UI / CLI and the container backend: rejects
//! invalid submissions before they reach the backend and serializes
//! lifecycle operations per honeypot.

use anyhow::{Context, Result};
use hive_gateway::{api, config::GatewayConfig};
use hive_lib::{
    health::{components, HealthRegistry},
    GatewayMetrics, HoneypotCatalog, HttpLifecycleClient, StructuredLogger,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting hive-gateway");

    let config = GatewayConfig::load()?;
    info!(
        instance = %config.instance_name,
        upstream_url = %config.upstream_url,
        "Gateway configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::UPSTREAM).await;
    health_registry.register(components::CATALOG).await;

    let catalog = match &config.catalog_path {
        Some(path) => HoneypotCatalog::load_from_path(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => HoneypotCatalog::builtin(),
    };

    let upstream = HttpLifecycleClient::builder(config.upstream_url.clone())
        .timeout(config.request_timeout())
        .restart_strategy(config.restart()?)
        .catalog(catalog.clone())
        .build()
        .context("Failed to build upstream client")?;

    let metrics = GatewayMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(GATEWAY_VERSION, &config.upstream_url, catalog.len());

    let app_state = Arc::new(
        api::AppState::new(
            Arc::new(upstream),
            catalog,
            health_registry.clone(),
            metrics,
            logger.clone(),
        )
        .with_port_check_sessions(api::PortCheckSessions::new(
            config.port_check_max_sessions,
            config.port_check_session_idle(),
        )),
    );

    health_registry.set_ready(true).await;

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // Without a signal handler the server runs until killed
            std::future::pending::<()>().await;
        }
    };

    api::serve(config.listen_port, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
