// Dashboard domain model: the merged view handed to the presentation layer
use super::indicator::{Indicator, Reading, Verdict};
use super::telemetry::{ChannelSeries, TimeSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    pub name: Indicator,
    pub value: Option<Reading>,
    pub unit: Option<String>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandView {
    pub id: String,
    pub title: String,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub channels: BTreeMap<String, ChannelSeries>,
    pub bands: Vec<BandView>,
    pub flattened: Option<TimeSeries>,
    pub aux: Option<TimeSeries>,
    pub latest_aux: Option<f64>,
    pub indicators: Vec<IndicatorView>,
    pub overall: Verdict,
    pub prediction: Option<Verdict>,
    pub prediction_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn indicator(&self, indicator: Indicator) -> Option<&IndicatorView> {
        self.indicators.iter().find(|v| v.name == indicator)
    }

    pub fn band_series(&self, band_id: &str) -> Option<Vec<&ChannelSeries>> {
        let band = self.bands.iter().find(|b| b.id == band_id)?;
        Some(
            band.channels
                .iter()
                .filter_map(|name| self.channels.get(name))
                .collect(),
        )
    }
}
