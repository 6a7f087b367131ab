// Presentation layer - HTTP surface consumed by the dashboard UI
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_band, get_dashboard, get_indicator, health_check};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/bands/:id", get(get_band))
        .route("/dashboard/indicators/:name", get(get_indicator))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
