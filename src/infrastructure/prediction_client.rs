// Prediction client - Fetches the latest external prediction result
use crate::application::feed_source::PredictionFeed;
use crate::domain::indicator::{PredictionResult, Reading, Verdict};
use crate::error::FetchError;
use crate::infrastructure::config::PredictionSettings;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const PREDICTION_PATH: &str = "/predict";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    latest_values: LatestValues,
    #[serde(default)]
    prediction: Option<String>,
}

/// Older producers send the values as one comma-joined string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum LatestValues {
    List(Vec<Value>),
    Packed(String),
    #[default]
    Missing,
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    url: String,
}

impl PredictionClient {
    pub fn new(settings: &PredictionSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", settings.base_url.trim_end_matches('/'), PREDICTION_PATH),
        })
    }
}

#[async_trait]
impl PredictionFeed for PredictionClient {
    async fn fetch_prediction(&self) -> Result<PredictionResult, FetchError> {
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
        decode_prediction_body(&body)
    }
}

pub fn decode_prediction_body(body: &str) -> Result<PredictionResult, FetchError> {
    let response: PredictionResponse = serde_json::from_str(body)?;

    let latest_values = match response.latest_values {
        LatestValues::List(values) => values.iter().map(Reading::from_json).collect(),
        LatestValues::Packed(packed) => packed.split(',').map(Reading::parse).collect(),
        LatestValues::Missing => Vec::new(),
    };

    let prediction = response.prediction.as_deref().and_then(|label| {
        let verdict = Verdict::from_label(label);
        if verdict.is_none() {
            tracing::warn!("Ignoring unknown prediction label {:?}", label);
        }
        verdict
    });

    Ok(PredictionResult {
        latest_values,
        prediction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::poller::{Poller, PredictionPoll};
    use axum::{Router, http::StatusCode, routing::get};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio_util::sync::CancellationToken;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn settings(base_url: String) -> PredictionSettings {
        PredictionSettings {
            base_url,
            poll_interval_secs: 5,
        }
    }

    #[test]
    fn test_decode_list() {
        let result =
            decode_prediction_body(r#"{"latest_values": [12, "3.5", null, "", "n/a"], "prediction": "Abnormal"}"#)
                .unwrap();
        assert_eq!(
            result.latest_values,
            vec![
                Some(Reading::Number(12.0)),
                Some(Reading::Number(3.5)),
                None,
                None,
                Some(Reading::Text("n/a".to_string())),
            ]
        );
        assert_eq!(result.prediction, Some(Verdict::Abnormal));
    }

    #[test]
    fn test_decode_packed_and_missing() {
        let packed = decode_prediction_body(r#"{"latest_values": "1,2,,4", "prediction": "Normal"}"#).unwrap();
        assert_eq!(packed.latest_values.len(), 4);
        assert_eq!(packed.latest_values[2], None);
        assert_eq!(packed.latest_values[3], Some(Reading::Number(4.0)));
        assert_eq!(packed.prediction, Some(Verdict::Normal));

        let empty = decode_prediction_body(r#"{"prediction": "unsure"}"#).unwrap();
        assert!(empty.latest_values.is_empty());
        assert_eq!(empty.prediction, None);
    }

    #[tokio::test]
    async fn test_fetch_prediction_over_http() {
        let base = serve(Router::new().route(
            PREDICTION_PATH,
            get(|| async { r#"{"latest_values": [20, 15, 2, 98, 60, 45], "prediction": "Normal"}"# }),
        ))
        .await;
        let client = PredictionClient::new(&settings(format!("{}/", base))).unwrap();

        let result = client.fetch_prediction().await.unwrap();
        assert_eq!(result.latest_values.len(), 6);
        assert_eq!(result.prediction, Some(Verdict::Normal));
    }

    #[tokio::test]
    async fn test_server_error_is_surfaced_and_state_retained() {
        let failing = Arc::new(AtomicBool::new(false));
        let flag = failing.clone();
        let base = serve(Router::new().route(
            PREDICTION_PATH,
            get(move || {
                let flag = flag.clone();
                async move {
                    if flag.load(Ordering::SeqCst) {
                        Err((StatusCode::INTERNAL_SERVER_ERROR, "model crashed"))
                    } else {
                        Ok(r#"{"latest_values": [20], "prediction": "Normal"}"#)
                    }
                }
            }),
        ))
        .await;

        let client = PredictionClient::new(&settings(base)).unwrap();
        let (mut poller, rx) = Poller::new(
            "prediction",
            PredictionPoll::new(Arc::new(client)),
            Duration::from_secs(5),
            true,
        );
        let cancel = CancellationToken::new();

        assert!(poller.poll_once(&cancel).await);
        let applied = rx.borrow().latest.clone().unwrap();

        failing.store(true, Ordering::SeqCst);
        assert!(poller.poll_once(&cancel).await);

        let state = rx.borrow().clone();
        assert!(Arc::ptr_eq(state.latest.as_ref().unwrap(), &applied));
        assert_eq!(state.latest.unwrap().latest_values[0], Some(Reading::Number(20.0)));
        let error = state.last_error.unwrap();
        assert!(error.contains("500"));
        assert!(error.contains("model crashed"));
    }
}
