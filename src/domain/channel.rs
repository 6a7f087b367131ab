// Channel layout: how the decoded channel vector maps to named channels and bands
use crate::error::ConfigError;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub name: String,
    pub index: usize,
    pub color: String,
}

/// Display grouping of channels. Has no effect on decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub id: String,
    pub title: String,
    pub channels: Vec<Channel>,
}

/// Validated channel layout. The decoder width and the extractor stride both
/// come from `count`, and every index in `[0, count)` belongs to exactly one
/// band.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelLayout {
    count: usize,
    bands: Vec<Band>,
}

impl ChannelLayout {
    pub fn new(count: usize, bands: Vec<Band>) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::EmptyLayout);
        }

        let mut indices = HashSet::new();
        let mut names = HashSet::new();
        for channel in bands.iter().flat_map(|b| &b.channels) {
            if channel.index >= count {
                return Err(ConfigError::ChannelOutOfRange {
                    name: channel.name.clone(),
                    index: channel.index,
                    count,
                });
            }
            if !indices.insert(channel.index) {
                return Err(ConfigError::DuplicateChannelIndex(channel.index));
            }
            if !names.insert(channel.name.as_str()) {
                return Err(ConfigError::DuplicateChannelName(channel.name.clone()));
            }
        }

        if let Some(missing) = (0..count).find(|i| !indices.contains(i)) {
            return Err(ConfigError::UnassignedChannel(missing));
        }

        Ok(Self { count, bands })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.bands.iter().flat_map(|b| b.channels.iter())
    }
}
