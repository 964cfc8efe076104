//! Percentile tables and classification results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::patient::Side;
use super::reference::ReferenceError;

/// Label shown when no table exists for the patient's group.
pub const NO_REFERENCE_DATA_LABEL: &str = "No reference data available for this group";

/// A percentile label such as `"25th"` or `"2.5th"` with its numeric rank.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileLabel {
    text: String,
    rank: f64,
}

impl PercentileLabel {
    /// Parse a label of the form `<number><st|nd|rd|th>`.
    ///
    /// # Errors
    /// Returns [`ReferenceError::InvalidLabel`] if the text has no ordinal
    /// suffix or the number is outside (0, 100).
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let text = text.trim();
        let number = ["st", "nd", "rd", "th"]
            .iter()
            .find_map(|suffix| text.strip_suffix(suffix))
            .ok_or_else(|| ReferenceError::InvalidLabel(text.to_string()))?;

        let rank: f64 = number
            .parse()
            .map_err(|_| ReferenceError::InvalidLabel(text.to_string()))?;
        if !(rank > 0.0 && rank < 100.0) {
            return Err(ReferenceError::InvalidLabel(text.to_string()));
        }

        Ok(Self {
            text: text.to_string(),
            rank,
        })
    }

    /// Numeric percentile implied by the label (`"2.5th"` → 2.5).
    #[must_use]
    pub fn rank(&self) -> f64 {
        self.rank
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PercentileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Granularity of a percentile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// Exactly {25th, 50th, 75th}, described with fixed quartile strings
    Quartile,
    /// Any other set of percentiles, described per threshold
    Graded,
}

/// Thresholds (mm) keyed by percentile, sorted by rank.
///
/// Thresholds are non-decreasing in rank order; construction rejects
/// anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileTable {
    entries: Vec<(PercentileLabel, f64)>,
}

impl PercentileTable {
    /// Build a table, sorting entries by percentile rank.
    ///
    /// # Errors
    /// Returns an error for an empty table, a repeated percentile, a negative
    /// or non-finite threshold, or thresholds that decrease with rank.
    pub fn new(
        entries: impl IntoIterator<Item = (PercentileLabel, f64)>,
    ) -> Result<Self, ReferenceError> {
        let mut entries: Vec<(PercentileLabel, f64)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(ReferenceError::EmptyTable);
        }
        entries.sort_by(|a, b| a.0.rank.total_cmp(&b.0.rank));

        for (label, value) in &entries {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(ReferenceError::InvalidThreshold {
                    label: label.to_string(),
                    value: *value,
                });
            }
        }
        for pair in entries.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.0.rank == upper.0.rank {
                return Err(ReferenceError::DuplicateLabel(upper.0.to_string()));
            }
            if upper.1 < lower.1 {
                return Err(ReferenceError::NonMonotonic {
                    lower: lower.0.to_string(),
                    upper: upper.0.to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Build a table from `(label, threshold)` pairs.
    ///
    /// # Errors
    /// Returns an error if a label does not parse or the table is invalid.
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Result<Self, ReferenceError> {
        let entries = pairs
            .iter()
            .map(|(label, value)| PercentileLabel::parse(label).map(|l| (l, *value)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(entries)
    }

    /// Entries in ascending percentile order.
    #[must_use]
    pub fn entries(&self) -> &[(PercentileLabel, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Threshold stored for a label, if any.
    #[must_use]
    pub fn threshold(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, v)| *v)
    }

    #[must_use]
    pub fn shape(&self) -> TableShape {
        let ranks: Vec<f64> = self.entries.iter().map(|(l, _)| l.rank).collect();
        if ranks == [25.0, 50.0, 75.0] {
            TableShape::Quartile
        } else {
            TableShape::Graded
        }
    }

    /// Position of `value` among the thresholds.
    ///
    /// The result is the index of the first threshold at or above `value`,
    /// or `len()` when `value` exceeds every threshold.
    #[must_use]
    pub fn band_of(&self, value: f64) -> usize {
        self.entries
            .iter()
            .position(|(_, threshold)| value <= *threshold)
            .unwrap_or(self.entries.len())
    }

    /// Labels bounding a band from below and above.
    #[must_use]
    pub fn band_bounds(&self, band: usize) -> (Option<&PercentileLabel>, Option<&PercentileLabel>) {
        let lower = band
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|(l, _)| l);
        let upper = self.entries.get(band).map(|(l, _)| l);
        (lower, upper)
    }

    /// Human-readable description of a band.
    #[must_use]
    pub fn describe_band(&self, band: usize) -> String {
        if self.shape() == TableShape::Quartile {
            return match band {
                0 => "≤25th percentile",
                1 => "25th–50th percentile",
                2 => "Between 50th and 75th percentile",
                _ => "Above 75th percentile",
            }
            .to_string();
        }

        match self.band_bounds(band) {
            (None, Some(upper)) => format!("≤{upper} percentile"),
            (Some(lower), Some(upper)) => format!("Between {lower} and {upper} percentile"),
            (Some(lower), None) => format!("Above {lower} percentile"),
            (None, None) => NO_REFERENCE_DATA_LABEL.to_string(),
        }
    }
}

/// Where a CIMT value falls relative to its reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Band {
    /// `position` 0 is at or below the lowest threshold; `floor` and
    /// `ceiling` are the percentile ranks bounding the band.
    Ranked {
        position: usize,
        floor: Option<f64>,
        ceiling: Option<f64>,
    },
    /// No table exists for the patient's group
    NoReferenceData,
}

impl Band {
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Ranked { position, .. } => Some(*position),
            Self::NoReferenceData => None,
        }
    }

    /// Lower percentile bound, `None` for the lowest band or missing data.
    #[must_use]
    pub fn floor(&self) -> Option<f64> {
        match self {
            Self::Ranked { floor, .. } => *floor,
            Self::NoReferenceData => None,
        }
    }
}

/// Classification of one side's CIMT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub side: Side,

    pub band: Band,

    /// Descriptive label, e.g. "Between 50th and 75th percentile"
    pub label: String,

    /// Tabulated age the thresholds were taken from
    pub reference_age: Option<u32>,
}

impl ClassificationResult {
    /// Classify `value` against a table matched at `reference_age`.
    #[must_use]
    pub fn ranked(side: Side, table: &PercentileTable, reference_age: u32, value: f64) -> Self {
        let position = table.band_of(value);
        let (floor, ceiling) = table.band_bounds(position);
        Self {
            side,
            band: Band::Ranked {
                position,
                floor: floor.map(PercentileLabel::rank),
                ceiling: ceiling.map(PercentileLabel::rank),
            },
            label: table.describe_band(position),
            reference_age: Some(reference_age),
        }
    }

    #[must_use]
    pub fn no_reference_data(side: Side) -> Self {
        Self {
            side,
            band: Band::NoReferenceData,
            label: NO_REFERENCE_DATA_LABEL.to_string(),
            reference_age: None,
        }
    }

    #[must_use]
    pub fn has_reference_data(&self) -> bool {
        !matches!(self.band, Band::NoReferenceData)
    }
}
