// Indicator merger - Prediction values first, telemetry carry-forward second
use crate::domain::indicator::{INDICATOR_COUNT, Indicator, PredictionResult, Reading};

/// Merge per indicator, by fixed slot:
/// 1. the prediction's value at the indicator's index, when supplied
/// 2. otherwise the last telemetry value for that indicator
/// 3. otherwise unknown
pub fn merge_indicators(
    prediction: Option<&PredictionResult>,
    telemetry: Option<&[Option<Reading>; INDICATOR_COUNT]>,
) -> [(Indicator, Option<Reading>); INDICATOR_COUNT] {
    Indicator::ALL.map(|indicator| {
        let from_prediction = prediction.and_then(|p| p.value_for(indicator));
        let from_telemetry = telemetry.and_then(|t| t[indicator.index()].as_ref());
        (indicator, from_prediction.or(from_telemetry).cloned())
    })
}
