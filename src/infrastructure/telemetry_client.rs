// Telemetry feed client - HTTP fetch plus the typed decode of upstream feed records
use crate::application::feed_source::TelemetryFeed;
use crate::domain::indicator::{INDICATOR_COUNT, Reading};
use crate::domain::telemetry::FeedRecord;
use crate::error::FetchError;
use crate::infrastructure::config::{FieldMapping, TelemetrySettings};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    feeds: Option<Vec<RawFeed>>,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    created_at: Option<String>,
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: reqwest::Client,
    url: String,
    fields: FieldMapping,
}

impl TelemetryClient {
    pub fn new(settings: &TelemetrySettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: build_feed_url(&settings.url, settings.api_key.as_deref(), settings.results),
            fields: settings.fields.clone(),
        })
    }
}

#[async_trait]
impl TelemetryFeed for TelemetryClient {
    async fn fetch_feed(&self) -> Result<Vec<FeedRecord>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        let records = decode_feed_body(&body, &self.fields)?;
        tracing::debug!("Fetched {} feed records", records.len());
        Ok(records)
    }
}

fn build_feed_url(base: &str, api_key: Option<&str>, results: Option<u32>) -> String {
    let mut params = Vec::new();
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        params.push(format!("api_key={}", urlencoding::encode(key)));
    }
    if let Some(results) = results {
        params.push(format!("results={}", results));
    }

    if params.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, params.join("&"))
}

/// Decode a feed response body. Missing or null `feeds` decodes to an empty
/// history; records without a usable timestamp are dropped.
pub fn decode_feed_body(body: &str, mapping: &FieldMapping) -> Result<Vec<FeedRecord>, FetchError> {
    let response: FeedResponse = serde_json::from_str(body)?;

    Ok(response
        .feeds
        .unwrap_or_default()
        .into_iter()
        .filter_map(|raw| decode_record(raw, mapping))
        .collect())
}

fn decode_record(raw: RawFeed, mapping: &FieldMapping) -> Option<FeedRecord> {
    let created_at = match raw.created_at.as_deref().map(DateTime::parse_from_rfc3339) {
        Some(Ok(ts)) => ts.with_timezone(&Utc),
        Some(Err(e)) => {
            tracing::warn!("Skipping feed record with bad created_at {:?}: {}", raw.created_at, e);
            return None;
        }
        None => {
            tracing::warn!("Skipping feed record without created_at");
            return None;
        }
    };

    let field = |name: &str| raw.fields.get(name).filter(|v| !v.is_null());

    let mut record = FeedRecord::new(created_at);
    record.channel_packed = field(&mapping.channels).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    record.aux_scalar = field(&mapping.aux)
        .and_then(Reading::from_json)
        .and_then(|r| r.as_number());
    match mapping.indicators_packed.as_deref() {
        Some(name) => match field(name) {
            Some(Value::String(packed)) => {
                for (slot, token) in record.indicator_raw.iter_mut().zip(packed.split(',')) {
                    *slot = Reading::parse(token);
                }
            }
            // A lone number is the first indicator with the rest absent.
            Some(other) => record.indicator_raw[0] = Reading::from_json(other),
            None => {}
        },
        None => {
            for (slot, name) in record
                .indicator_raw
                .iter_mut()
                .zip(mapping.indicators.iter().take(INDICATOR_COUNT))
            {
                *slot = field(name).and_then(Reading::from_json);
            }
        }
    }

    Some(record)
}
