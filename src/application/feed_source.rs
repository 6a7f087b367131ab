// Source traits for the two upstream feeds
use crate::domain::indicator::PredictionResult;
use crate::domain::telemetry::FeedRecord;
use crate::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryFeed: Send + Sync {
    /// Fetch the feed history, oldest record first.
    async fn fetch_feed(&self) -> Result<Vec<FeedRecord>, FetchError>;
}

#[async_trait]
pub trait PredictionFeed: Send + Sync {
    /// Fetch the latest external prediction.
    async fn fetch_prediction(&self) -> Result<PredictionResult, FetchError>;
}
