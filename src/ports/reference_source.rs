//! Reference source port: Trait for loading reference tables.
//!
//! Abstracts where the percentile tables and curves come from (compiled-in
//! constants or a JSON file) from the classifier.

use crate::domain::{RaceWindow, ReferenceTables};

/// Trait for reference data providers.
///
/// Sources are read once at start-up; the returned tables are immutable.
pub trait ReferenceSource: Send + Sync {
    /// Error type for loading operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the reference tables.
    ///
    /// # Arguments
    /// * `race_window` - Ages at which race-specific tables apply
    ///
    /// # Errors
    /// Returns error if the data cannot be read or fails validation.
    fn load(&self, race_window: RaceWindow) -> Result<ReferenceTables, Self::Error>;

    /// Short description for logging.
    fn describe(&self) -> String;
}
