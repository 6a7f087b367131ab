// Error types shared across layers
use thiserror::Error;

/// Failure of a single fetch against an upstream source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Invalid startup configuration. These abort startup instead of
/// silently misaligning channels or indicators at runtime.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("channel count must be at least 1")]
    EmptyLayout,

    #[error("channel {name} has index {index}, outside [0, {count})")]
    ChannelOutOfRange {
        name: String,
        index: usize,
        count: usize,
    },

    #[error("channel index {0} is assigned more than once")]
    DuplicateChannelIndex(usize),

    #[error("channel name {0} is used more than once")]
    DuplicateChannelName(String),

    #[error("channel index {0} is not assigned to any band")]
    UnassignedChannel(usize),

    #[error("expected {expected} indicator fields, got {got}")]
    IndicatorFieldCount { expected: usize, got: usize },

    #[error("unknown indicator in range table: {0}")]
    UnknownIndicator(String),

    #[error("range for {indicator} has min {min} above max {max}")]
    InvertedRange { indicator: String, min: f64, max: f64 },
}
