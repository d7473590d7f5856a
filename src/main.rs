// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::forecast_model::ForecastModel;
use crate::application::forecast_service::ForecastService;
use crate::infrastructure::additive_model::AdditiveTrendModel;
use crate::infrastructure::config::load_app_config;
use crate::presentation::app_state::AppState;
use crate::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info,tower_http=info".into()),
        )
        .init();

    // Load configuration
    let config = load_app_config().context("failed to load configuration")?;

    // Forecasting capability (infrastructure layer)
    let model: Arc<dyn ForecastModel> = Arc::new(AdditiveTrendModel::new(config.model.interval_width));

    // Create services (application layer)
    let forecast_service = ForecastService::new(model, config.forecast.clone());

    // Create application state
    let state = Arc::new(AppState {
        forecast_service,
        upload_dir: config.server.upload_dir(),
    });

    // Build router (presentation layer)
    let router = build_router(state, config.server.max_upload_bytes);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    tracing::info!(%addr, "starting sales-forecast service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, never resolve and keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
