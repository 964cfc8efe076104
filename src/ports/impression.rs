//! Impression port: Trait for risk decision policies.
//!
//! The decision table that turns two classifications and a plaque flag into
//! an impression is swappable without touching the classifier.

use crate::domain::{ClassificationResult, Impression};

/// Trait for impression decision policies.
///
/// Implementations must be pure and satisfy:
/// - the result is never less severe than either side's own tier
/// - plaque can only raise the result, never lower it
/// - a side without reference data is treated as neither low nor high
pub trait ImpressionPolicy: Send + Sync {
    /// Combine both sides and the plaque flag into an impression.
    fn impression(
        &self,
        right: &ClassificationResult,
        left: &ClassificationResult,
        has_plaque: bool,
    ) -> Impression;

    /// Policy name for logging.
    fn name(&self) -> &'static str;
}
