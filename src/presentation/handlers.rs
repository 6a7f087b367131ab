// HTTP request handlers
use crate::domain::dashboard::{DashboardView, IndicatorView};
use crate::domain::indicator::Indicator;
use crate::domain::telemetry::ChannelSeries;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct BandResponse {
    pub id: String,
    pub title: String,
    pub series: Vec<ChannelSeries>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest merged dashboard view
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.current_view().as_ref().clone())
}

/// Channel series of one display band
pub async fn get_band(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BandResponse>, StatusCode> {
    let view = state.current_view();
    let band = view.bands.iter().find(|b| b.id == id).ok_or(StatusCode::NOT_FOUND)?;
    let series = view
        .band_series(&id)
        .unwrap_or_default()
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(BandResponse {
        id: band.id.clone(),
        title: band.title.clone(),
        series,
    }))
}

/// One indicator's value and verdict, looked up by display name
pub async fn get_indicator(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndicatorView>, StatusCode> {
    let indicator = Indicator::from_name(&name).ok_or(StatusCode::NOT_FOUND)?;
    let view = state.current_view();
    let found = view.indicator(indicator).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(found.clone()))
}
