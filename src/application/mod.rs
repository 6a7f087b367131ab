// Application layer - Decoding, merge and classification pipeline plus polling
pub mod band_decoder;
pub mod channel_extractor;
pub mod dashboard_service;
pub mod feed_source;
pub mod indicator_merger;
pub mod poller;
pub mod range_classifier;
pub mod series_builder;
