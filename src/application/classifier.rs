//! Percentile classifier: maps one CIMT value to its percentile band.

use std::sync::Arc;

use crate::domain::{ClassificationResult, Race, ReferenceTables, Sex, Side};

/// Classifies CIMT values against shared reference tables.
#[derive(Debug, Clone)]
pub struct PercentileClassifier {
    tables: Arc<ReferenceTables>,
}

impl PercentileClassifier {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// Classify one CIMT value.
    ///
    /// A missing table is reported as a labelled
    /// [`crate::domain::Band::NoReferenceData`] result, not an error.
    #[must_use]
    pub fn classify(
        &self,
        cimt: f64,
        age: u32,
        sex: Sex,
        race: Race,
        side: Side,
    ) -> ClassificationResult {
        match self.tables.lookup_table(side, race, sex, age) {
            Ok(matched) => {
                let result = ClassificationResult::ranked(side, matched.table, matched.age, cimt);
                tracing::debug!(
                    "{} side: {} table at age {} (patient age {}) -> {}",
                    side,
                    matched.group,
                    matched.age,
                    age,
                    result.label
                );
                result
            }
            Err(missing) => {
                tracing::warn!("{} side: {}", side, missing);
                ClassificationResult::no_reference_data(side)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::BuiltinReference;
    use crate::domain::{Band, RaceWindow};
    use crate::ports::ReferenceSource;

    fn classifier() -> PercentileClassifier {
        let tables = BuiltinReference::new()
            .load(RaceWindow::default())
            .expect("Built-in data is valid");
        PercentileClassifier::new(Arc::new(tables))
    }

    #[test]
    fn test_white_male_right_at_49() {
        let result = classifier().classify(0.632, 49, Sex::Male, Race::White, Side::Right);
        // Nearest of {45, 50, 55, 60, 65} is 50: 0.534 / 0.617 / 0.714
        assert_eq!(result.reference_age, Some(50));
        assert_eq!(result.band.position(), Some(2));
        assert_eq!(result.label, "Between 50th and 75th percentile");
    }

    #[test]
    fn test_sides_use_distinct_tables() {
        let classifier = classifier();
        let right = classifier.classify(0.60, 45, Sex::Male, Race::Black, Side::Right);
        let left = classifier.classify(0.60, 45, Sex::Male, Race::Black, Side::Left);
        // Right 50th is 0.604, left 50th is 0.614; left 25th is 0.530
        assert_eq!(right.label, "25th–50th percentile");
        assert_eq!(left.label, "25th–50th percentile");

        let right = classifier.classify(0.61, 45, Sex::Male, Race::Black, Side::Right);
        let left = classifier.classify(0.61, 45, Sex::Male, Race::Black, Side::Left);
        assert_eq!(right.band.position(), Some(2));
        assert_eq!(left.band.position(), Some(1));
    }

    #[test]
    fn test_outside_window_uses_general_table() {
        let result = classifier().classify(0.45, 30, Sex::Female, Race::White, Side::Right);
        assert_eq!(result.reference_age, Some(30));
        assert_eq!(result.label, "Between 25th and 50th percentile");
        assert_eq!(
            result.band,
            Band::Ranked {
                position: 3,
                floor: Some(25.0),
                ceiling: Some(50.0)
            }
        );
    }

    #[test]
    fn test_above_every_threshold() {
        let result = classifier().classify(1.2, 80, Sex::Male, Race::General, Side::Left);
        assert_eq!(result.band.position(), Some(6));
        assert_eq!(result.label, "Above 90th percentile");
    }

    #[test]
    fn test_band_monotonic_in_cimt() {
        let classifier = classifier();
        for (age, race) in [(30, Race::General), (50, Race::White), (60, Race::Black), (75, Race::White)] {
            for sex in [Sex::Male, Sex::Female] {
                for side in [Side::Right, Side::Left] {
                    let mut previous = 0;
                    for step in 0..=120 {
                        let cimt = 0.2 + f64::from(step) * 0.01;
                        let position = classifier
                            .classify(cimt, age, sex, race, side)
                            .band
                            .position()
                            .expect("Built-in tables cover every group");
                        assert!(position >= previous, "band fell at {cimt} mm");
                        previous = position;
                    }
                }
            }
        }
    }
}
