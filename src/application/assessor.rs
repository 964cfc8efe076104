//! Risk assessor: Builds the full report for one patient.
//!
//! This service coordinates:
//! - Input validation
//! - Percentile classification of both sides
//! - Plaque burden and vascular age
//! - The impression decision table

use std::sync::Arc;

use crate::config::CalculatorConfig;
use crate::domain::{
    ChartData, ClassificationResult, Impression, PatientInput, ReferenceTables, RiskReport, Sex,
    Side,
};
use crate::ports::ImpressionPolicy;
use crate::CimtError;

use super::classifier::PercentileClassifier;

/// Sum of plaque sizes at or above `threshold`.
///
/// Smaller plaques are left out of the sum entirely.
#[must_use]
pub fn plaque_burden(sizes: &[f64], threshold: f64) -> f64 {
    sizes
        .iter()
        .filter(|&&size| size >= threshold)
        .fold(0.0, |total, size| total + size)
}

/// Service producing risk reports.
pub struct RiskAssessor<P>
where
    P: ImpressionPolicy,
{
    classifier: PercentileClassifier,
    policy: P,
    plaque_threshold_mm: f64,
}

impl<P> RiskAssessor<P>
where
    P: ImpressionPolicy,
{
    /// Create a new assessor over shared reference tables.
    pub fn new(tables: Arc<ReferenceTables>, policy: P, config: &CalculatorConfig) -> Self {
        Self {
            classifier: PercentileClassifier::new(tables),
            policy,
            plaque_threshold_mm: config.plaque_threshold_mm,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &PercentileClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[must_use]
    pub fn plaque_burden(&self, sizes: &[f64]) -> f64 {
        plaque_burden(sizes, self.plaque_threshold_mm)
    }

    /// Age on the sex's reference curve whose CIMT is closest to `average_cimt`.
    #[must_use]
    pub fn vascular_age(&self, average_cimt: f64, sex: Sex) -> f64 {
        self.classifier
            .tables()
            .lookup_curve(sex)
            .nearest_age(average_cimt)
    }

    #[must_use]
    pub fn impression(
        &self,
        right: &ClassificationResult,
        left: &ClassificationResult,
        has_plaque: bool,
    ) -> Impression {
        self.policy.impression(right, left, has_plaque)
    }

    /// Reference curves with the patient's line and marker.
    #[must_use]
    pub fn chart_data(&self, average_cimt: f64, vascular_age: f64) -> ChartData {
        let tables = self.classifier.tables();
        ChartData {
            male_curve: tables.lookup_curve(Sex::Male).series(),
            female_curve: tables.lookup_curve(Sex::Female).series(),
            patient_cimt: average_cimt,
            marker: (vascular_age, average_cimt),
        }
    }

    /// Run the full calculation for one patient.
    ///
    /// # Errors
    /// Returns [`CimtError::InvalidInput`] if the input fails validation.
    pub fn assess(&self, patient: &PatientInput) -> Result<RiskReport, CimtError> {
        patient
            .validate()
            .map_err(|errors| CimtError::InvalidInput(errors.join("; ")))?;

        let reference_race = self
            .classifier
            .tables()
            .race_window()
            .effective_race(patient.race, patient.age);
        if reference_race != patient.race {
            tracing::debug!(
                "Age {} outside race window, using General instead of {}",
                patient.age,
                patient.race
            );
        }

        let right = self.classifier.classify(
            patient.right_cimt,
            patient.age,
            patient.sex,
            reference_race,
            Side::Right,
        );
        let left = self.classifier.classify(
            patient.left_cimt,
            patient.age,
            patient.sex,
            reference_race,
            Side::Left,
        );

        let average_cimt = patient.average_cimt();
        let vascular_age = self.vascular_age(average_cimt, patient.sex);
        let plaque_burden = self.plaque_burden(&patient.plaques);
        let has_plaque = plaque_burden > 0.0;
        let impression = self.impression(&right, &left, has_plaque);

        tracing::info!(
            "Report complete: avg_cimt={:.3}, vascular_age={}, plaque_burden={:.3}, tier={}, policy={}",
            average_cimt,
            vascular_age,
            plaque_burden,
            impression
                .tier
                .map_or_else(|| "UNGRADED".to_string(), |t| t.to_string()),
            self.policy.name()
        );

        Ok(RiskReport {
            right_cimt: patient.right_cimt,
            left_cimt: patient.left_cimt,
            average_cimt,
            sex: patient.sex,
            reference_race,
            vascular_age,
            plaque_burden,
            has_plaque,
            impression,
            right,
            left,
            chart: self.chart_data(average_cimt, vascular_age),
            created_at: chrono::Utc::now(),
        })
    }
}
