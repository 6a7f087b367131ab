// Poller - Single-flight periodic fetch loop with cancellation
use crate::application::feed_source::{PredictionFeed, TelemetryFeed};
use crate::application::series_builder::build_series;
use crate::domain::indicator::PredictionResult;
use crate::domain::telemetry::SeriesSnapshot;
use crate::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// One pollable upstream. `Ok(None)` means the fetch succeeded but there is
/// nothing to apply, so the previous state stays in place.
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    async fn poll(&self) -> Result<Option<Self::Snapshot>, FetchError>;
}

pub struct TelemetryPoll {
    feed: Arc<dyn TelemetryFeed>,
    width: usize,
}

impl TelemetryPoll {
    pub fn new(feed: Arc<dyn TelemetryFeed>, width: usize) -> Self {
        Self { feed, width }
    }
}

#[async_trait]
impl PollSource for TelemetryPoll {
    type Snapshot = SeriesSnapshot;

    async fn poll(&self) -> Result<Option<SeriesSnapshot>, FetchError> {
        let records = self.feed.fetch_feed().await?;
        Ok(build_series(&records, self.width))
    }
}

pub struct PredictionPoll {
    feed: Arc<dyn PredictionFeed>,
}

impl PredictionPoll {
    pub fn new(feed: Arc<dyn PredictionFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl PollSource for PredictionPoll {
    type Snapshot = PredictionResult;

    async fn poll(&self) -> Result<Option<PredictionResult>, FetchError> {
        Ok(Some(self.feed.fetch_prediction().await?))
    }
}

/// Last applied result of one source. `latest` is only ever replaced whole.
#[derive(Debug)]
pub struct SourceState<T> {
    pub latest: Option<Arc<T>>,
    pub last_error: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
}

impl<T> Default for SourceState<T> {
    fn default() -> Self {
        Self {
            latest: None,
            last_error: None,
            applied_at: None,
        }
    }
}

impl<T> Clone for SourceState<T> {
    fn clone(&self) -> Self {
        Self {
            latest: self.latest.clone(),
            last_error: self.last_error.clone(),
            applied_at: self.applied_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
    Applying,
    Failed,
}

pub struct Poller<S: PollSource> {
    name: &'static str,
    source: S,
    period: Duration,
    surface_errors: bool,
    phase: PollPhase,
    state_tx: watch::Sender<SourceState<S::Snapshot>>,
}

impl<S: PollSource> Poller<S> {
    /// `surface_errors` records fetch failures in the published state for
    /// display; otherwise failures are only logged.
    pub fn new(
        name: &'static str,
        source: S,
        period: Duration,
        surface_errors: bool,
    ) -> (Self, watch::Receiver<SourceState<S::Snapshot>>) {
        let (state_tx, state_rx) = watch::channel(SourceState::default());
        let poller = Self {
            name,
            source,
            period,
            surface_errors,
            phase: PollPhase::Idle,
            state_tx,
        };
        (poller, state_rx)
    }

    /// Spawn the loop on a child of `cancel`, so teardown of the parent
    /// stops every poller while `PollerHandle::stop` stops just this one.
    pub fn start(self, cancel: &CancellationToken) -> PollerHandle {
        let token = cancel.child_token();
        let name = self.name;
        let task = tokio::spawn(self.run(token.clone()));
        PollerHandle {
            name,
            cancel: token,
            task,
        }
    }

    /// Poll immediately, then every `period`. Ticks that fall due while a
    /// fetch is outstanding are dropped: the next fetch starts no sooner
    /// than one full period after the overrunning fetch completed.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            poller = self.name,
            interval_ms = self.period.as_millis() as u64,
            "Poller started"
        );

        loop {
            let scheduled = tokio::select! {
                _ = cancel.cancelled() => break,
                scheduled = interval.tick() => scheduled,
            };

            if !self.poll_once(&cancel).await {
                break;
            }

            // A fetch that ran past the next tick must not trigger an
            // immediate catch-up fetch; wait a full period from now instead.
            if Instant::now() >= scheduled + self.period {
                tracing::debug!(poller = self.name, "Fetch overran the poll interval, skipping tick");
                interval.reset();
            }
        }

        tracing::info!(poller = self.name, "Poller stopped");
    }

    /// Run one fetch/apply cycle. Returns `false` if cancelled mid-fetch,
    /// in which case nothing is applied.
    pub(crate) async fn poll_once(&mut self, cancel: &CancellationToken) -> bool {
        self.transition(PollPhase::Fetching);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            outcome = self.source.poll() => Some(outcome),
        };

        let Some(outcome) = outcome else {
            tracing::debug!(poller = self.name, "In-flight fetch aborted");
            self.transition(PollPhase::Idle);
            return false;
        };

        match outcome {
            Ok(Some(snapshot)) => {
                self.transition(PollPhase::Applying);
                self.state_tx.send_modify(|state| {
                    state.latest = Some(Arc::new(snapshot));
                    state.last_error = None;
                    state.applied_at = Some(Utc::now());
                });
            }
            Ok(None) => {
                tracing::debug!(poller = self.name, "Empty poll result, keeping previous state");
            }
            Err(e) => {
                self.transition(PollPhase::Failed);
                tracing::warn!(poller = self.name, error = %e, "Poll failed, keeping previous state");
                if self.surface_errors {
                    let message = e.to_string();
                    self.state_tx.send_modify(|state| state.last_error = Some(message));
                }
            }
        }

        self.transition(PollPhase::Idle);
        true
    }

    fn transition(&mut self, next: PollPhase) {
        tracing::trace!(poller = self.name, from = ?self.phase, to = ?next, "Poller transition");
        self.phase = next;
    }
}

pub struct PollerHandle {
    name: &'static str,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancel the loop, abort any in-flight fetch and wait for the task.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(poller = self.name, error = %e, "Poller task ended abnormally");
        }
    }
}
