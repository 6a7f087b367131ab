// Dashboard service - Recomposes the merged view whenever either poller applies
use crate::application::channel_extractor::extract_all;
use crate::application::indicator_merger::merge_indicators;
use crate::application::poller::SourceState;
use crate::application::range_classifier::{NormalRangeTable, overall_verdict};
use crate::domain::channel::ChannelLayout;
use crate::domain::dashboard::{BandView, DashboardView, IndicatorView};
use crate::domain::indicator::{PredictionResult, Verdict};
use crate::domain::telemetry::{SeriesSnapshot, TimeSeries};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub label: String,
    pub color: String,
}

impl SeriesStyle {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    layout: Arc<ChannelLayout>,
    ranges: NormalRangeTable,
    flattened_style: SeriesStyle,
    aux_style: SeriesStyle,
}

impl DashboardService {
    pub fn new(
        layout: Arc<ChannelLayout>,
        ranges: NormalRangeTable,
        flattened_style: SeriesStyle,
        aux_style: SeriesStyle,
    ) -> Self {
        Self {
            layout,
            ranges,
            flattened_style,
            aux_style,
        }
    }

    pub fn compose(
        &self,
        telemetry: &SourceState<SeriesSnapshot>,
        prediction: &SourceState<PredictionResult>,
    ) -> DashboardView {
        let series = telemetry.latest.as_deref();
        let predicted = prediction.latest.as_deref();

        let merged = merge_indicators(predicted, series.map(|s| &s.last_indicator_values));
        let verdicts = merged
            .each_ref()
            .map(|(indicator, value)| self.ranges.classify(*indicator, value.as_ref()));
        let prediction_label = predicted.and_then(|p| p.prediction);
        let overall = overall_verdict(&verdicts, prediction_label);

        let indicators = merged
            .into_iter()
            .zip(verdicts)
            .map(|((name, value), verdict)| IndicatorView {
                name,
                value,
                unit: self.ranges.get(name).map(|r| r.unit.clone()),
                verdict,
            })
            .collect();

        let bands = self
            .layout
            .bands()
            .iter()
            .map(|band| BandView {
                id: band.id.clone(),
                title: band.title.clone(),
                channels: band.channels.iter().map(|c| c.name.clone()).collect(),
            })
            .collect();

        DashboardView {
            channels: series
                .map(|s| extract_all(s, &self.layout))
                .unwrap_or_default(),
            bands,
            flattened: series.map(|s| self.flattened_series(s)),
            aux: series.map(|s| {
                TimeSeries::new(
                    s.timestamps.clone(),
                    s.aux.clone(),
                    self.aux_style.label.clone(),
                    self.aux_style.color.clone(),
                )
            }),
            latest_aux: series.and_then(|s| s.latest_aux),
            indicators,
            overall,
            prediction: prediction_label,
            prediction_error: prediction.last_error.clone(),
            updated_at: telemetry.applied_at.max(prediction.applied_at),
        }
    }

    /// Each record's timestamp is repeated once per channel so the flattened
    /// series keeps one timestamp per value.
    fn flattened_series(&self, snapshot: &SeriesSnapshot) -> TimeSeries {
        let timestamps = snapshot
            .timestamps
            .iter()
            .flat_map(|t| std::iter::repeat_n(*t, snapshot.stride))
            .collect();

        TimeSeries::new(
            timestamps,
            snapshot.flattened.clone(),
            self.flattened_style.label.clone(),
            self.flattened_style.color.clone(),
        )
    }

    /// Publish a fresh view now and again after every apply on either
    /// source, until cancelled or a source goes away.
    pub async fn run(
        self,
        mut telemetry_rx: watch::Receiver<SourceState<SeriesSnapshot>>,
        mut prediction_rx: watch::Receiver<SourceState<PredictionResult>>,
        view_tx: watch::Sender<Arc<DashboardView>>,
        cancel: CancellationToken,
    ) {
        loop {
            let telemetry = telemetry_rx.borrow_and_update().clone();
            let prediction = prediction_rx.borrow_and_update().clone();
            let view = self.compose(&telemetry, &prediction);

            tracing::debug!(
                records = telemetry.latest.as_ref().map(|s| s.record_count()).unwrap_or(0),
                overall = ?view.overall,
                "Dashboard view recomposed"
            );
            if view.overall == Verdict::Abnormal {
                tracing::info!("Overall verdict is abnormal");
            }
            view_tx.send_replace(Arc::new(view));

            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = telemetry_rx.changed() => if changed.is_err() { break },
                changed = prediction_rx.changed() => if changed.is_err() { break },
            }
        }

        tracing::info!("Dashboard composer stopped");
    }
}
