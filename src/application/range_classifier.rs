// Range classifier - Per-indicator and overall normal/abnormal verdicts
use crate::domain::indicator::{INDICATOR_COUNT, Indicator, NormalRange, Reading, Verdict};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalRangeTable {
    ranges: HashMap<Indicator, NormalRange>,
}

impl NormalRangeTable {
    pub fn new(ranges: HashMap<Indicator, NormalRange>) -> Self {
        Self { ranges }
    }

    pub fn get(&self, indicator: Indicator) -> Option<&NormalRange> {
        self.ranges.get(&indicator)
    }

    /// Unknown values, non-numeric values and indicators without a range
    /// are neutral.
    pub fn classify(&self, indicator: Indicator, value: Option<&Reading>) -> Verdict {
        let (Some(range), Some(value)) = (self.get(indicator), value.and_then(Reading::as_number))
        else {
            return Verdict::Normal;
        };

        if range.contains(value) {
            Verdict::Normal
        } else {
            Verdict::Abnormal
        }
    }
}

/// Abnormal when any indicator is abnormal or the prediction says so.
/// A "Normal" prediction never clears a locally detected abnormal value.
pub fn overall_verdict(
    verdicts: &[Verdict; INDICATOR_COUNT],
    prediction: Option<Verdict>,
) -> Verdict {
    if verdicts.iter().any(Verdict::is_abnormal) || prediction == Some(Verdict::Abnormal) {
        Verdict::Abnormal
    } else {
        Verdict::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NormalRangeTable {
        NormalRangeTable::new(HashMap::from([
            (Indicator::Oxygenation, NormalRange::new(95.0, Some(100.0), "%")),
            (Indicator::TearFilm, NormalRange::new(10.0, None, "s")),
        ]))
    }

    #[test]
    fn test_boundaries_are_normal() {
        let table = table();
        let n = |v: f64| Some(Reading::Number(v));
        assert_eq!(table.classify(Indicator::Oxygenation, n(95.0).as_ref()), Verdict::Normal);
        assert_eq!(table.classify(Indicator::Oxygenation, n(100.0).as_ref()), Verdict::Normal);
        assert_eq!(table.classify(Indicator::Oxygenation, n(94.0).as_ref()), Verdict::Abnormal);
        assert_eq!(table.classify(Indicator::TearFilm, n(10.0).as_ref()), Verdict::Normal);
        assert_eq!(table.classify(Indicator::TearFilm, n(5000.0).as_ref()), Verdict::Normal);
        assert_eq!(table.classify(Indicator::TearFilm, n(9.0).as_ref()), Verdict::Abnormal);
    }

    #[test]
    fn test_unknown_is_neutral() {
        let table = table();
        assert_eq!(table.classify(Indicator::Oxygenation, None), Verdict::Normal);
        assert_eq!(
            table.classify(Indicator::Oxygenation, Some(&Reading::Text("low".to_string()))),
            Verdict::Normal
        );
        assert_eq!(
            table.classify(Indicator::Oxygenation, Some(&Reading::Number(f64::NAN))),
            Verdict::Normal
        );
        // No range configured for Hydration.
        assert_eq!(
            table.classify(Indicator::Hydration, Some(&Reading::Number(-1.0))),
            Verdict::Normal
        );
    }

    #[test]
    fn test_overall_verdict() {
        let all_normal = [Verdict::Normal; INDICATOR_COUNT];
        let mut one_abnormal = all_normal;
        one_abnormal[3] = Verdict::Abnormal;

        assert_eq!(overall_verdict(&all_normal, None), Verdict::Normal);
        assert_eq!(overall_verdict(&all_normal, Some(Verdict::Normal)), Verdict::Normal);
        assert_eq!(overall_verdict(&all_normal, Some(Verdict::Abnormal)), Verdict::Abnormal);
        assert_eq!(overall_verdict(&one_abnormal, Some(Verdict::Normal)), Verdict::Abnormal);
        assert_eq!(overall_verdict(&one_abnormal, None), Verdict::Abnormal);
    }
}
