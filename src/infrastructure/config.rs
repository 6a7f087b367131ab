use crate::application::dashboard_service::SeriesStyle;
use crate::application::range_classifier::NormalRangeTable;
use crate::domain::channel::{Band, Channel, ChannelLayout};
use crate::domain::indicator::{INDICATOR_COUNT, Indicator, NormalRange};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_CHANNEL_COUNT: usize = 18;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub telemetry: TelemetrySettings,
    pub prediction: PredictionSettings,
    #[serde(default)]
    pub channels: ChannelSettings,
    #[serde(default = "default_ranges")]
    pub ranges: Vec<RangeConfig>,
    #[serde(default)]
    pub series: SeriesSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub url: String,
    pub api_key: Option<String>,
    pub results: Option<u32>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub fields: FieldMapping,
}

impl TelemetrySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Names of the upstream feed fields that carry each part of a record.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldMapping {
    pub channels: String,
    pub aux: String,
    pub indicators: Vec<String>,
    /// Single field carrying all six indicators comma-joined in fixed
    /// order. When set, `indicators` is ignored.
    pub indicators_packed: Option<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            channels: "field1".to_string(),
            aux: "field2".to_string(),
            indicators: (3..3 + INDICATOR_COUNT).map(|i| format!("field{i}")).collect(),
            indicators_packed: None,
        }
    }
}

impl FieldMapping {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indicators_packed.is_none() && self.indicators.len() != INDICATOR_COUNT {
            return Err(ConfigError::IndicatorFieldCount {
                expected: INDICATOR_COUNT,
                got: self.indicators.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionSettings {
    pub base_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl PredictionSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChannelSettings {
    pub count: usize,
    pub bands: Vec<BandConfig>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_CHANNEL_COUNT,
            bands: default_bands(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BandConfig {
    pub id: String,
    pub title: String,
    pub channels: Vec<ChannelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    pub name: String,
    pub index: usize,
    pub color: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RangeConfig {
    pub indicator: String,
    pub min: f64,
    pub max: Option<f64>,
    pub unit: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeriesSettings {
    pub flattened_label: String,
    pub flattened_color: String,
    pub aux_label: String,
    pub aux_color: String,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            flattened_label: "CLEAR VALUE".to_string(),
            flattened_color: "blue".to_string(),
            aux_label: "NIR".to_string(),
            aux_color: "red".to_string(),
        }
    }
}

impl SeriesSettings {
    pub fn flattened_style(&self) -> SeriesStyle {
        SeriesStyle::new(&self.flattened_label, &self.flattened_color)
    }

    pub fn aux_style(&self) -> SeriesStyle {
        SeriesStyle::new(&self.aux_label, &self.aux_color)
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_bands() -> Vec<BandConfig> {
    let band = |id: &str, title: &str, channels: &[(&str, usize, &str)]| BandConfig {
        id: id.to_string(),
        title: title.to_string(),
        channels: channels
            .iter()
            .map(|(name, index, color)| ChannelConfig {
                name: name.to_string(),
                index: *index,
                color: color.to_string(),
            })
            .collect(),
    };

    vec![
        band(
            "blue",
            "Tear film / surface scatter",
            &[("A", 0, "#1d4ed8"), ("B", 1, "#7e22ce"), ("C", 2, "#701a75")],
        ),
        band(
            "green",
            "Blood perfusion",
            &[("D", 3, "#dc2626"), ("E", 4, "#ea580c"), ("F", 5, "#84cc16"), ("G", 6, "#10b981")],
        ),
        band(
            "red",
            "Eye redness / hemoglobin",
            &[("H", 7, "#0891b2"), ("R", 8, "#dc2626"), ("I", 9, "#db2777")],
        ),
        band("deep_red", "Blood volume", &[("S", 10, "#9333ea"), ("J", 11, "#dc2626")]),
        band(
            "nir1",
            "Tissue penetration",
            &[("T", 12, "#65a30d"), ("U", 13, "#059669"), ("V", 14, "#0d9488")],
        ),
        band(
            "nir2",
            "Water hydration",
            &[("W", 15, "#2563eb"), ("K", 16, "#e11d48"), ("L", 17, "#9333ea")],
        ),
    ]
}

fn default_ranges() -> Vec<RangeConfig> {
    let range = |indicator: Indicator, min: f64, max: Option<f64>, unit: &str| RangeConfig {
        indicator: indicator.name().to_string(),
        min,
        max,
        unit: unit.to_string(),
    };

    vec![
        range(Indicator::EyeRedness, 0.0, Some(30.0), "%"),
        range(Indicator::TearFilm, 10.0, None, "s"),
        range(Indicator::BloodPerfusion, 0.2, Some(20.0), "%"),
        range(Indicator::Oxygenation, 95.0, Some(100.0), "%"),
        range(Indicator::Tissue, 40.0, Some(80.0), "%"),
        range(Indicator::Hydration, 30.0, Some(60.0), "%"),
    ]
}

impl ChannelSettings {
    pub fn layout(&self) -> Result<ChannelLayout, ConfigError> {
        let bands = self
            .bands
            .iter()
            .map(|b| Band {
                id: b.id.clone(),
                title: b.title.clone(),
                channels: b
                    .channels
                    .iter()
                    .map(|c| Channel {
                        name: c.name.clone(),
                        index: c.index,
                        color: c.color.clone(),
                    })
                    .collect(),
            })
            .collect();

        ChannelLayout::new(self.count, bands)
    }
}

pub fn range_table(ranges: &[RangeConfig]) -> Result<NormalRangeTable, ConfigError> {
    let mut table = HashMap::new();

    for range in ranges {
        let indicator = Indicator::from_name(&range.indicator)
            .ok_or_else(|| ConfigError::UnknownIndicator(range.indicator.clone()))?;
        if let Some(max) = range.max {
            if range.min > max {
                return Err(ConfigError::InvertedRange {
                    indicator: range.indicator.clone(),
                    min: range.min,
                    max,
                });
            }
        }
        table.insert(indicator, NormalRange::new(range.min, range.max, range.unit.clone()));
    }

    Ok(NormalRangeTable::new(table))
}

/// Configuration after validation, ready for wiring.
#[derive(Debug)]
pub struct ValidatedConfig {
    pub raw: AppConfig,
    pub layout: ChannelLayout,
    pub ranges: NormalRangeTable,
}

impl AppConfig {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        self.telemetry.fields.validate()?;
        let layout = self.channels.layout()?;
        let ranges = range_table(&self.ranges)?;
        Ok(ValidatedConfig {
            raw: self,
            layout,
            ranges,
        })
    }
}

pub fn load_app_config() -> anyhow::Result<ValidatedConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    Ok(app_config.validate()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    const MINIMAL: &str = r#"
        [telemetry]
        url = "https://api.thingspeak.com/channels/1/feeds.json"

        [prediction]
        base_url = "http://127.0.0.1:5000"
    "#;

    #[test]
    fn test_defaults_validate() {
        let validated = parse(MINIMAL).validate().unwrap();
        assert_eq!(validated.layout.count(), 18);
        assert_eq!(validated.layout.bands().len(), 6);
        assert_eq!(validated.raw.telemetry.poll_interval(), Duration::from_secs(5));
        assert_eq!(validated.raw.telemetry.fields.indicators.len(), INDICATOR_COUNT);
        assert_eq!(validated.raw.telemetry.fields.indicators[0], "field3");
        assert_eq!(validated.raw.server.bind, "0.0.0.0:8080");
        for indicator in Indicator::ALL {
            assert!(validated.ranges.get(indicator).is_some());
        }
        assert!(validated.ranges.get(Indicator::TearFilm).unwrap().max.is_none());
    }

    #[test]
    fn test_channel_count_mismatch_is_rejected() {
        let toml = format!("{MINIMAL}\n[channels]\ncount = 17\nbands = []\n");
        let err = parse(&toml).validate().unwrap_err();
        assert_eq!(err, ConfigError::UnassignedChannel(0));

        let mut config = parse(MINIMAL);
        config.channels.count = 17;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ChannelOutOfRange { index: 17, .. }));
    }

    #[test]
    fn test_indicator_field_count_is_checked() {
        let mut config = parse(MINIMAL);
        config.telemetry.fields.indicators.pop();
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigError::IndicatorFieldCount { expected: 6, got: 5 }
        );
    }

    #[test]
    fn test_packed_indicator_field() {
        let toml = format!("{MINIMAL}\n[telemetry.fields]\nindicators_packed = \"field3\"\n");
        let mut config = parse(&toml);
        // The per-field list is ignored once a packed field is named.
        config.telemetry.fields.indicators.clear();
        let validated = config.validate().unwrap();
        assert_eq!(validated.raw.telemetry.fields.indicators_packed.as_deref(), Some("field3"));
        assert_eq!(validated.raw.telemetry.fields.channels, "field1");
        assert!(parse(MINIMAL).telemetry.fields.indicators_packed.is_none());
    }

    #[test]
    fn test_range_table_validation() {
        let bad_name = vec![RangeConfig {
            indicator: "Pressure".to_string(),
            min: 0.0,
            max: None,
            unit: "mmHg".to_string(),
        }];
        assert_eq!(
            range_table(&bad_name).unwrap_err(),
            ConfigError::UnknownIndicator("Pressure".to_string())
        );

        let inverted = vec![RangeConfig {
            indicator: "Hydration".to_string(),
            min: 60.0,
            max: Some(30.0),
            unit: "%".to_string(),
        }];
        assert!(matches!(
            range_table(&inverted).unwrap_err(),
            ConfigError::InvertedRange { .. }
        ));
    }
}
