// Clinical indicator domain models
use serde::{Serialize, Serializer};

pub const INDICATOR_COUNT: usize = 6;

/// The fixed set of derived indicators. Declaration order is the order of
/// both the upstream indicator fields and the prediction `latest_values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    EyeRedness,
    TearFilm,
    BloodPerfusion,
    Oxygenation,
    Tissue,
    Hydration,
}

impl Indicator {
    pub const ALL: [Indicator; INDICATOR_COUNT] = [
        Indicator::EyeRedness,
        Indicator::TearFilm,
        Indicator::BloodPerfusion,
        Indicator::Oxygenation,
        Indicator::Tissue,
        Indicator::Hydration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::EyeRedness => "Eye Redness",
            Indicator::TearFilm => "Tear Film",
            Indicator::BloodPerfusion => "Blood Perfusion",
            Indicator::Oxygenation => "Oxygenation",
            Indicator::Tissue => "Tissue",
            Indicator::Hydration => "Hydration",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl Serialize for Indicator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One indicator reading as received from upstream. Numeric-looking input is
/// coerced to a number, anything else is carried through as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Parse a raw upstream token. Blank input means "absent".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Some(Reading::Number(v)),
            Err(_) => Some(Reading::Text(trimmed.to_string())),
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => n.as_f64().map(Reading::Number),
            serde_json::Value::String(s) => Self::parse(s),
            other => Some(Reading::Text(other.to_string())),
        }
    }

    /// Finite numeric value, if any. Text and NaN are not classifiable.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Reading::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Normal,
    Abnormal,
}

impl Verdict {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            l if l.eq_ignore_ascii_case("normal") => Some(Verdict::Normal),
            l if l.eq_ignore_ascii_case("abnormal") => Some(Verdict::Abnormal),
            _ => None,
        }
    }

    pub fn is_abnormal(&self) -> bool {
        matches!(self, Verdict::Abnormal)
    }
}

/// Inclusive normal range; `max == None` means open-ended (`>= min`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalRange {
    pub min: f64,
    pub max: Option<f64>,
    pub unit: String,
}

impl NormalRange {
    pub fn new(min: f64, max: Option<f64>, unit: impl Into<String>) -> Self {
        Self {
            min,
            max,
            unit: unit.into(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }
}

/// Latest externally computed prediction. `latest_values` is positional,
/// aligned to `Indicator::ALL`; `None` entries mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionResult {
    pub latest_values: Vec<Option<Reading>>,
    pub prediction: Option<Verdict>,
}

impl PredictionResult {
    pub fn value_for(&self, indicator: Indicator) -> Option<&Reading> {
        self.latest_values.get(indicator.index()).and_then(Option::as_ref)
    }
}
