// Band decoder - Packed channel string to a fixed-width reading vector

pub const CHANNEL_DELIMITER: char = ',';

/// Decode one record's packed channel string into exactly `width` readings.
///
/// Short input is right-padded with NaN, long input is truncated, an absent
/// string yields all NaN and any token that does not parse becomes NaN.
/// Empty or blank tokens (`"1,,3"`) are missing readings and decode to NaN,
/// not 0. Never fails.
pub fn decode_bands(packed: Option<&str>, width: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(width);

    if let Some(packed) = packed {
        values.extend(
            packed
                .split(CHANNEL_DELIMITER)
                .take(width)
                .map(parse_token),
        );
    }

    values.resize(width, f64::NAN);
    values
}

fn parse_token(token: &str) -> f64 {
    token.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn test_short_input_is_padded() {
        let values = decode_bands(Some("1,2,3"), 18);
        assert_eq!(values.len(), 18);
        assert_eq!(&values[..3], &[1.0, 2.0, 3.0]);
        assert!(values[3..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_long_input_is_truncated() {
        let packed = (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let values = decode_bands(Some(&packed), 18);
        assert_eq!(values, (0..18).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_string_is_all_nan() {
        let values = decode_bands(None, 18);
        assert_eq!(values.len(), 18);
        assert!(values.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_bad_tokens_become_nan() {
        let values = decode_bands(Some("1, x ,,4.5"), 5);
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
        assert_eq!(values[3], 4.5);
        assert!(values[4].is_nan());
    }

    #[test]
    fn test_decoding_is_repeatable() {
        let packed = "0.5,abc,17,,3e2";
        assert!(same(&decode_bands(Some(packed), 18), &decode_bands(Some(packed), 18)));
    }
}
