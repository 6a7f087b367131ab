// Series builder - Folds a feed history into aligned series and carried-forward indicators
use crate::application::band_decoder::decode_bands;
use crate::domain::indicator::{INDICATOR_COUNT, Reading};
use crate::domain::telemetry::{FeedRecord, SeriesSnapshot};

/// Build a snapshot from records ordered oldest to newest.
///
/// Returns `None` for an empty history so the caller keeps whatever it
/// applied last instead of blanking the dashboard.
pub fn build_series(records: &[FeedRecord], width: usize) -> Option<SeriesSnapshot> {
    if records.is_empty() {
        return None;
    }

    let mut timestamps = Vec::with_capacity(records.len());
    let mut flattened = Vec::with_capacity(records.len() * width);
    let mut aux = Vec::with_capacity(records.len());
    let mut last_indicator_values: [Option<Reading>; INDICATOR_COUNT] = Default::default();

    for record in records {
        timestamps.push(record.created_at.timestamp_millis());
        flattened.extend(decode_bands(record.channel_packed.as_deref(), width));
        aux.push(record.aux_scalar.filter(|v| v.is_finite()).unwrap_or(0.0));

        // Overwrite on presence: a later gap never erases an earlier capture.
        for (slot, raw) in last_indicator_values.iter_mut().zip(&record.indicator_raw) {
            if raw.is_some() {
                slot.clone_from(raw);
            }
        }
    }

    let latest_aux = records
        .last()
        .and_then(|r| r.aux_scalar)
        .filter(|v| v.is_finite());

    Some(SeriesSnapshot {
        stride: width,
        timestamps,
        flattened,
        aux,
        latest_aux,
        last_indicator_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(secs: i64, packed: Option<&str>) -> FeedRecord {
        let mut record = FeedRecord::new(Utc.timestamp_opt(secs, 0).unwrap());
        record.channel_packed = packed.map(str::to_string);
        record
    }

    #[test]
    fn test_empty_history_produces_no_update() {
        assert!(build_series(&[], 18).is_none());
    }

    #[test]
    fn test_flattened_length_ignores_malformed_records() {
        let records = vec![
            record(1, Some("1,2,3")),
            record(2, None),
            record(3, Some("garbage")),
            record(4, Some(&(0..30).map(|i| i.to_string()).collect::<Vec<_>>().join(","))),
        ];
        let snapshot = build_series(&records, 18).unwrap();
        assert_eq!(snapshot.flattened.len(), records.len() * 18);
        assert_eq!(snapshot.timestamps, vec![1000, 2000, 3000, 4000]);
        assert_eq!(snapshot.aux.len(), records.len());
        assert_eq!(snapshot.stride, 18);
    }

    #[test]
    fn test_aux_defaults_to_zero() {
        let mut first = record(1, None);
        first.aux_scalar = Some(36.6);
        let mut second = record(2, None);
        second.aux_scalar = Some(f64::NAN);
        let third = record(3, None);

        let snapshot = build_series(&[first, second, third], 18).unwrap();
        assert_eq!(snapshot.aux, vec![36.6, 0.0, 0.0]);
        assert_eq!(snapshot.latest_aux, None);
    }

    #[test]
    fn test_indicator_values_carry_forward() {
        let mut first = record(1, None);
        first.indicator_raw[0] = None;
        first.indicator_raw[1] = Some(Reading::Number(3.0));
        let mut second = record(2, None);
        second.indicator_raw[0] = Some(Reading::Number(5.0));
        let mut third = record(3, None);
        third.indicator_raw[1] = Some(Reading::Number(4.0));
        let fourth = record(4, None);

        let snapshot = build_series(&[first, second, third, fourth], 18).unwrap();
        assert_eq!(snapshot.last_indicator_values[0], Some(Reading::Number(5.0)));
        assert_eq!(snapshot.last_indicator_values[1], Some(Reading::Number(4.0)));
        assert_eq!(snapshot.last_indicator_values[2], None);
    }
}
