// Channel extractor - Fixed-stride de-interleave of the flattened channel series
use crate::domain::channel::{Channel, ChannelLayout};
use crate::domain::telemetry::{ChannelSeries, SeriesSnapshot};
use std::collections::BTreeMap;

/// Slice channel `index` out of a record-major flattened series:
/// `values[i] = flattened[i * stride + index]`.
///
/// Yields one value per timestamp. Positions past the end of `flattened`
/// read as NaN, and an `index` outside the stride reads as all NaN.
pub fn extract_channel(
    flattened: &[f64],
    timestamps: &[i64],
    stride: usize,
    index: usize,
    label: &str,
    color: &str,
) -> ChannelSeries {
    let values = (0..timestamps.len())
        .map(|i| {
            if index >= stride {
                return f64::NAN;
            }
            flattened.get(i * stride + index).copied().unwrap_or(f64::NAN)
        })
        .collect();

    ChannelSeries::new(
        timestamps.to_vec(),
        values,
        label.to_string(),
        color.to_string(),
    )
}

pub fn extract_named(snapshot: &SeriesSnapshot, channel: &Channel) -> ChannelSeries {
    extract_channel(
        &snapshot.flattened,
        &snapshot.timestamps,
        snapshot.stride,
        channel.index,
        &channel.name,
        &channel.color,
    )
}

/// Extract every channel of the layout, keyed by channel name.
pub fn extract_all(snapshot: &SeriesSnapshot, layout: &ChannelLayout) -> BTreeMap<String, ChannelSeries> {
    if snapshot.stride != layout.count() {
        tracing::error!(
            "Snapshot stride {} does not match channel layout width {}; skipping channel extraction",
            snapshot.stride,
            layout.count()
        );
        return BTreeMap::new();
    }

    layout
        .channels()
        .map(|channel| (channel.name.clone(), extract_named(snapshot, channel)))
        .collect()
}
