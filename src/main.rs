// Main entry point - Dependency injection, pollers and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::poller::{Poller, PredictionPoll, SourceState, TelemetryPoll};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::prediction_client::PredictionClient;
use crate::infrastructure::telemetry_client::TelemetryClient;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load and validate configuration
    let config = load_app_config()?;
    let settings = config.raw;
    let layout = Arc::new(config.layout);

    // Upstream clients (infrastructure layer)
    let telemetry_client = Arc::new(TelemetryClient::new(&settings.telemetry)?);
    let prediction_client = Arc::new(PredictionClient::new(&settings.prediction)?);

    // Pollers (application layer). Only prediction failures are shown to users.
    let (telemetry_poller, telemetry_rx) = Poller::new(
        "telemetry",
        TelemetryPoll::new(telemetry_client, layout.count()),
        settings.telemetry.poll_interval(),
        false,
    );
    let (prediction_poller, prediction_rx) = Poller::new(
        "prediction",
        PredictionPoll::new(prediction_client),
        settings.prediction.poll_interval(),
        true,
    );

    let dashboard_service = DashboardService::new(
        layout.clone(),
        config.ranges,
        settings.series.flattened_style(),
        settings.series.aux_style(),
    );
    let initial_view = dashboard_service.compose(&SourceState::default(), &SourceState::default());
    let (view_tx, view_rx) = watch::channel(Arc::new(initial_view));

    let shutdown = CancellationToken::new();
    let telemetry_handle = telemetry_poller.start(&shutdown);
    let prediction_handle = prediction_poller.start(&shutdown);
    let composer = tokio::spawn(dashboard_service.run(
        telemetry_rx,
        prediction_rx,
        view_tx,
        shutdown.child_token(),
    ));

    // Build router (presentation layer)
    let state = Arc::new(AppState { view_rx });
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = settings.server.bind.parse()?;
    tracing::info!(
        "Starting ocular-telemetry service on {} ({} channels in {} bands)",
        addr,
        layout.count(),
        layout.bands().len()
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown requested");
        signal_token.cancel();
    });

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    // Teardown: stop timers, abort in-flight fetches, then the composer.
    shutdown.cancel();
    telemetry_handle.stop().await;
    prediction_handle.stop().await;
    if let Err(e) = composer.await {
        tracing::error!("Dashboard composer ended abnormally: {}", e);
    }

    Ok(())
}
