//! Age–CIMT reference curves for vascular age estimation.

use serde::{Deserialize, Serialize};

use super::reference::ReferenceError;

/// One sample of a reference curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Age in years (may be fractional, e.g. 25.5)
    pub age: f64,
    /// Mean CIMT in mm at that age
    pub cimt: f64,
}

/// Ordered age–CIMT samples for one sex.
///
/// Ages are strictly increasing. CIMT values are not monotonic in the
/// published curves, so lookups scan every point.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeCimtCurve {
    points: Vec<CurvePoint>,
}

impl AgeCimtCurve {
    /// # Errors
    /// Returns an error for an empty curve, non-finite samples or ages that
    /// do not strictly increase.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, ReferenceError> {
        if points.is_empty() {
            return Err(ReferenceError::EmptyCurve);
        }
        if let Some(p) = points
            .iter()
            .find(|p| !(p.age.is_finite() && p.cimt.is_finite()))
        {
            return Err(ReferenceError::UnorderedCurve { age: p.age });
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].age <= w[0].age) {
            return Err(ReferenceError::UnorderedCurve { age: pair[1].age });
        }
        Ok(Self { points })
    }

    /// # Errors
    /// See [`AgeCimtCurve::new`].
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ReferenceError> {
        Self::new(
            pairs
                .iter()
                .map(|&(age, cimt)| CurvePoint { age, cimt })
                .collect(),
        )
    }

    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// `(age, cimt)` pairs for plotting.
    #[must_use]
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.age, p.cimt)).collect()
    }

    /// Age of the sample whose CIMT is closest to `cimt`.
    ///
    /// Nearest-neighbour, not interpolation: the result is always one of the
    /// sample ages. On ties the earliest sample wins.
    #[must_use]
    pub fn nearest_age(&self, cimt: f64) -> f64 {
        let mut best = self.points[0];
        let mut best_diff = (best.cimt - cimt).abs();

        for point in &self.points[1..] {
            let diff = (point.cimt - cimt).abs();
            if diff < best_diff {
                best = *point;
                best_diff = diff;
            }
        }

        best.age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dipping_curve() -> AgeCimtCurve {
        AgeCimtCurve::from_pairs(&[(6.0, 0.38), (10.0, 0.405), (15.0, 0.40), (21.0, 0.449), (25.5, 0.449)])
            .expect("Valid curve")
    }

    #[test]
    fn test_nearest_age_exact_and_between() {
        let curve = dipping_curve();
        assert_eq!(curve.nearest_age(0.38), 6.0);
        assert_eq!(curve.nearest_age(0.385), 6.0);
        assert_eq!(curve.nearest_age(0.43), 21.0);
    }

    #[test]
    fn test_non_monotonic_curve_scans_all_points() {
        let curve = dipping_curve();
        // 15 comes after 10 but has the lower CIMT
        assert_eq!(curve.nearest_age(0.399), 15.0);
        assert_eq!(curve.nearest_age(0.406), 10.0);
    }

    #[test]
    fn test_ties_take_earliest_sample() {
        let curve = dipping_curve();
        assert_eq!(curve.nearest_age(0.449), 21.0);
        assert_eq!(curve.nearest_age(0.6), 21.0);
    }

    #[test]
    fn test_rejects_bad_curves() {
        assert!(matches!(
            AgeCimtCurve::from_pairs(&[]),
            Err(ReferenceError::EmptyCurve)
        ));
        assert!(matches!(
            AgeCimtCurve::from_pairs(&[(10.0, 0.4), (10.0, 0.5)]),
            Err(ReferenceError::UnorderedCurve { .. })
        ));
    }
}
