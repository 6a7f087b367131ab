// Telemetry data domain models
use super::indicator::{INDICATOR_COUNT, Reading};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One upstream sample after the typed decode step.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRecord {
    pub created_at: DateTime<Utc>,
    pub channel_packed: Option<String>,
    pub aux_scalar: Option<f64>,
    pub indicator_raw: [Option<Reading>; INDICATOR_COUNT],
}

impl FeedRecord {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            channel_packed: None,
            aux_scalar: None,
            indicator_raw: Default::default(),
        }
    }
}

/// Aligned timestamps and values. NaN marks a missing reading and serializes
/// as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub timestamps: Vec<i64>,
    pub values: Vec<f64>,
    pub label: String,
    pub color: String,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<i64>, values: Vec<f64>, label: String, color: String) -> Self {
        Self {
            timestamps,
            values,
            label,
            color,
        }
    }
}

/// A single logical channel: one value per feed record.
pub type ChannelSeries = TimeSeries;

/// Everything derived from one telemetry poll.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub stride: usize,
    pub timestamps: Vec<i64>,
    /// Record-major concatenation of decoded channels, `timestamps.len() * stride` long.
    pub flattened: Vec<f64>,
    pub aux: Vec<f64>,
    /// Aux reading of the newest record, if it had a parseable one.
    pub latest_aux: Option<f64>,
    pub last_indicator_values: [Option<Reading>; INDICATOR_COUNT],
}

impl SeriesSnapshot {
    pub fn record_count(&self) -> usize {
        self.timestamps.len()
    }
}
