//! Risk report types.
//!
//! Represents the output of one CIMT risk calculation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::patient::{Race, Sex};
use super::percentile::ClassificationResult;

/// Advice printed beneath every report.
pub const CLINICAL_NOTE: &str = "There is a 95% correlation between carotid and coronary arteries for presence of plaque. \
Consider further testing such as coronary calcium scoring for high-risk patients.";

/// Cardiovascular risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    /// CIMT at or below the 50th percentile, no plaque
    Low,
    /// CIMT between the 50th and 75th percentile, or plaque present
    Moderate,
    /// CIMT above the 75th percentile
    High,
}

impl RiskTier {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Moderate => "Moderate risk - Follow-up recommended",
            Self::High => "High risk - Further testing advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Risk impression combining both sides and plaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impression {
    /// `None` when neither side could be graded and no plaque was found
    pub tier: Option<RiskTier>,
    pub text: String,
}

impl Impression {
    #[must_use]
    pub fn new(tier: Option<RiskTier>, text: impl Into<String>) -> Self {
        Self {
            tier,
            text: text.into(),
        }
    }
}

/// Series for the vascular age chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Average male reference curve as `(age, cimt)`
    pub male_curve: Vec<(f64, f64)>,
    /// Average female reference curve as `(age, cimt)`
    pub female_curve: Vec<(f64, f64)>,
    /// Height of the horizontal patient line
    pub patient_cimt: f64,
    /// Marker at `(vascular_age, patient_cimt)`
    pub marker: (f64, f64),
}

/// Complete CIMT risk report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub right_cimt: f64,
    pub left_cimt: f64,
    pub average_cimt: f64,

    pub sex: Sex,

    /// Race the tables were selected with (General outside the race window)
    pub reference_race: Race,

    /// Curve sample age closest to the average CIMT, never interpolated.
    /// Fractional only where the curve itself is (25.5, 41.5 on the female curve).
    pub vascular_age: f64,

    /// Sum of plaque sizes at or above the significance threshold, in mm
    pub plaque_burden: f64,
    pub has_plaque: bool,

    pub impression: Impression,

    pub right: ClassificationResult,
    pub left: ClassificationResult,

    pub chart: ChartData,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CIMT Risk Summary")?;
        writeln!(f, "Right CIMT: {:.3} mm -> {}", self.right_cimt, self.right.label)?;
        writeln!(f, "Left CIMT: {:.3} mm -> {}", self.left_cimt, self.left.label)?;
        writeln!(f, "Average CIMT: {:.3} mm", self.average_cimt)?;
        writeln!(f, "Vascular Age Estimate: {} years", self.vascular_age)?;
        writeln!(f, "Plaque Burden: {:.3} mm", self.plaque_burden)?;
        match self.impression.tier {
            Some(tier) => writeln!(f, "Impression [{tier}]: {}", self.impression.text)?,
            None => writeln!(f, "Impression: {}", self.impression.text)?,
        }
        write!(f, "Note: {CLINICAL_NOTE}")
    }
}
