//! Impression policies.
//!
//! `WorstBandPolicy` is the default: each side's band maps to a tier through
//! [`TIER_BY_FLOOR`], the worse side wins and plaque lifts a low result to
//! moderate. `LabelSetPolicy` is the alternative that compares the band
//! labels against named low and high sets.

use crate::domain::{Band, ClassificationResult, Impression, RiskTier};
use crate::ports::ImpressionPolicy;

/// Band → tier mapping by the band's lower percentile bound.
///
/// The first row whose minimum the floor reaches wins; bands below every
/// row (including the lowest band, which has no floor) are `Low`.
pub const TIER_BY_FLOOR: [(f64, RiskTier); 2] = [(75.0, RiskTier::High), (50.0, RiskTier::Moderate)];

/// Worst-band decision table.
#[derive(Debug, Clone)]
pub struct WorstBandPolicy {
    tiers: Vec<(f64, RiskTier)>,
}

impl Default for WorstBandPolicy {
    fn default() -> Self {
        Self {
            tiers: TIER_BY_FLOOR.to_vec(),
        }
    }
}

impl WorstBandPolicy {
    /// Tier of one band, `None` when the side has no reference data.
    #[must_use]
    pub fn tier_for(&self, band: &Band) -> Option<RiskTier> {
        match band {
            Band::NoReferenceData => None,
            Band::Ranked { floor, .. } => Some(
                floor
                    .and_then(|f| {
                        self.tiers
                            .iter()
                            .find(|(min, _)| f >= *min)
                            .map(|(_, tier)| *tier)
                    })
                    .unwrap_or(RiskTier::Low),
            ),
        }
    }
}

/// Impression for the worst CIMT tier across both sides.
fn decide(cimt_tier: Option<RiskTier>, has_plaque: bool) -> Impression {
    use RiskTier::{High, Low, Moderate};

    match (cimt_tier, has_plaque) {
        (Some(High), false) => Impression::new(
            Some(High),
            "High cardiovascular risk based on elevated CIMT (≥75th percentile) without plaque.",
        ),
        (Some(Moderate), false) => Impression::new(
            Some(Moderate),
            "Moderate cardiovascular risk based on CIMT in the 50th–75th percentile without plaque.",
        ),
        (Some(Low), false) => Impression::new(
            Some(Low),
            "Low cardiovascular risk based on CIMT (≤50th percentile) and absence of plaque.",
        ),
        (None, false) => Impression::new(
            None,
            "CIMT could not be graded: no reference data available for this group. No plaque detected.",
        ),
        (Some(High), true) => Impression::new(
            Some(High),
            "High cardiovascular risk due to plaque and CIMT ≥75th percentile.",
        ),
        (Some(Moderate), true) => Impression::new(
            Some(Moderate),
            "Moderate cardiovascular risk due to plaque with CIMT in the 50th–75th percentile.",
        ),
        (Some(Low), true) => Impression::new(
            Some(Moderate),
            "Moderate cardiovascular risk due to presence of plaque despite lower CIMT.",
        ),
        (None, true) => Impression::new(
            Some(Moderate),
            "Moderate cardiovascular risk due to presence of plaque; CIMT could not be graded against reference data.",
        ),
    }
}

impl ImpressionPolicy for WorstBandPolicy {
    fn impression(
        &self,
        right: &ClassificationResult,
        left: &ClassificationResult,
        has_plaque: bool,
    ) -> Impression {
        let worst = [self.tier_for(&right.band), self.tier_for(&left.band)]
            .into_iter()
            .flatten()
            .max();
        decide(worst, has_plaque)
    }

    fn name(&self) -> &'static str {
        "worst-band"
    }
}

/// Label-set membership decision table.
///
/// High if either label is in the high set; low only if both labels are in
/// the low set and there is no plaque; moderate otherwise. A label in
/// neither set (including the missing-data label) therefore reads as
/// moderate.
#[derive(Debug, Clone)]
pub struct LabelSetPolicy {
    low: Vec<String>,
    high: Vec<String>,
}

impl Default for LabelSetPolicy {
    fn default() -> Self {
        let low = [
            "≤25th percentile",
            "25th–50th percentile",
            "≤2.5th percentile",
            "Between 2.5th and 10th percentile",
            "Between 10th and 25th percentile",
            "Between 25th and 50th percentile",
        ];
        let high = [
            "Above 75th percentile",
            "Between 75th and 90th percentile",
            "Above 90th percentile",
        ];
        Self::new(low, high)
    }
}

impl LabelSetPolicy {
    pub fn new<L, H>(low: L, high: H) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        Self {
            low: low.into_iter().map(Into::into).collect(),
            high: high.into_iter().map(Into::into).collect(),
        }
    }

    fn is_low(&self, result: &ClassificationResult) -> bool {
        self.low.contains(&result.label)
    }

    fn is_high(&self, result: &ClassificationResult) -> bool {
        self.high.contains(&result.label)
    }
}

impl ImpressionPolicy for LabelSetPolicy {
    fn impression(
        &self,
        right: &ClassificationResult,
        left: &ClassificationResult,
        has_plaque: bool,
    ) -> Impression {
        let plaque = if has_plaque {
            "with plaque present"
        } else {
            "without plaque"
        };

        if self.is_high(right) || self.is_high(left) {
            Impression::new(
                Some(RiskTier::High),
                format!("High cardiovascular risk: CIMT in the upper percentile range {plaque}."),
            )
        } else if self.is_low(right) && self.is_low(left) && !has_plaque {
            Impression::new(
                Some(RiskTier::Low),
                "Low cardiovascular risk: CIMT at or below the 50th percentile without plaque.",
            )
        } else {
            Impression::new(
                Some(RiskTier::Moderate),
                format!("Moderate cardiovascular risk: CIMT not in the low percentile range or plaque present ({plaque})."),
            )
        }
    }

    fn name(&self) -> &'static str {
        "label-set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PercentileTable, Side};

    fn quartile() -> PercentileTable {
        PercentileTable::from_pairs(&[("25th", 0.534), ("50th", 0.617), ("75th", 0.714)])
            .expect("Valid table")
    }

    fn graded() -> PercentileTable {
        PercentileTable::from_pairs(&[
            ("2.5th", 0.297),
            ("10th", 0.351),
            ("25th", 0.400),
            ("50th", 0.453),
            ("75th", 0.507),
            ("90th", 0.556),
        ])
        .expect("Valid table")
    }

    fn classify(side: Side, table: &PercentileTable, value: f64) -> ClassificationResult {
        ClassificationResult::ranked(side, table, 50, value)
    }

    #[test]
    fn test_quartile_tiers() {
        let policy = WorstBandPolicy::default();
        let table = quartile();
        let tiers: Vec<Option<RiskTier>> = [0.5, 0.6, 0.65, 0.8]
            .iter()
            .map(|v| policy.tier_for(&classify(Side::Right, &table, *v).band))
            .collect();
        assert_eq!(
            tiers,
            vec![
                Some(RiskTier::Low),
                Some(RiskTier::Low),
                Some(RiskTier::Moderate),
                Some(RiskTier::High)
            ]
        );
    }

    #[test]
    fn test_graded_tiers() {
        let policy = WorstBandPolicy::default();
        let table = graded();
        let tier = |v: f64| policy.tier_for(&classify(Side::Right, &table, v).band);
        assert_eq!(tier(0.2), Some(RiskTier::Low));
        assert_eq!(tier(0.45), Some(RiskTier::Low));
        assert_eq!(tier(0.5), Some(RiskTier::Moderate));
        assert_eq!(tier(0.53), Some(RiskTier::High));
        assert_eq!(tier(0.9), Some(RiskTier::High));
        assert_eq!(policy.tier_for(&Band::NoReferenceData), None);
    }

    #[test]
    fn test_label_sets_cover_every_band() {
        let policy = LabelSetPolicy::default();
        let cases = [
            (graded(), 0.2, RiskTier::Low),
            (graded(), 0.32, RiskTier::Low),
            (graded(), 0.38, RiskTier::Low),
            (graded(), 0.42, RiskTier::Low),
            (graded(), 0.48, RiskTier::Moderate),
            (graded(), 0.53, RiskTier::High),
            (graded(), 0.6, RiskTier::High),
            (quartile(), 0.5, RiskTier::Low),
            (quartile(), 0.6, RiskTier::Low),
            (quartile(), 0.65, RiskTier::Moderate),
            (quartile(), 0.8, RiskTier::High),
        ];
        for (table, value, expected) in cases {
            let right = classify(Side::Right, &table, value);
            let left = classify(Side::Left, &table, value);
            assert_eq!(
                policy.impression(&right, &left, false).tier,
                Some(expected),
                "{} at {value}",
                right.label
            );
        }
    }

    #[test]
    fn test_worst_side_wins() {
        let policy = WorstBandPolicy::default();
        let table = quartile();
        let right = classify(Side::Right, &table, 0.5);
        let left = classify(Side::Left, &table, 0.8);
        let impression = policy.impression(&right, &left, false);
        assert_eq!(impression.tier, Some(RiskTier::High));
        assert_eq!(
            impression.text,
            "High cardiovascular risk based on elevated CIMT (≥75th percentile) without plaque."
        );
    }

    #[test]
    fn test_plaque_only_raises() {
        let policy = WorstBandPolicy::default();
        let table = quartile();
        for value in [0.5, 0.6, 0.65, 0.8] {
            let right = classify(Side::Right, &table, value);
            let left = classify(Side::Left, &table, 0.5);
            let without = policy.impression(&right, &left, false).tier;
            let with = policy.impression(&right, &left, true).tier;
            assert!(with >= without, "plaque lowered tier at {value}");
        }

        let low = classify(Side::Right, &table, 0.5);
        let impression = policy.impression(&low, &low, true);
        assert_eq!(impression.tier, Some(RiskTier::Moderate));
        assert_eq!(
            impression.text,
            "Moderate cardiovascular risk due to presence of plaque despite lower CIMT."
        );
    }

    #[test]
    fn test_missing_side_is_neither_low_nor_high() {
        let policy = WorstBandPolicy::default();
        let table = quartile();
        let missing = ClassificationResult::no_reference_data(Side::Left);
        let right = classify(Side::Right, &table, 0.65);

        assert_eq!(
            policy.impression(&right, &missing, false).tier,
            Some(RiskTier::Moderate)
        );
        assert_eq!(policy.impression(&missing, &missing, false).tier, None);
        assert_eq!(
            policy.impression(&missing, &missing, true).tier,
            Some(RiskTier::Moderate)
        );
    }

    #[test]
    fn test_label_set_policy() {
        let policy = LabelSetPolicy::default();
        let table = quartile();
        let low = classify(Side::Right, &table, 0.5);
        let mid = classify(Side::Left, &table, 0.65);
        let high = classify(Side::Left, &table, 0.8);
        let missing = ClassificationResult::no_reference_data(Side::Left);

        assert_eq!(policy.impression(&low, &low, false).tier, Some(RiskTier::Low));
        assert_eq!(policy.impression(&low, &low, true).tier, Some(RiskTier::Moderate));
        assert_eq!(policy.impression(&low, &mid, false).tier, Some(RiskTier::Moderate));
        assert_eq!(policy.impression(&low, &high, false).tier, Some(RiskTier::High));
        assert_eq!(policy.impression(&low, &missing, false).tier, Some(RiskTier::Moderate));
    }
}
