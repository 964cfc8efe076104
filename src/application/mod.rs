//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! classification and report generation.

mod assessor;
mod classifier;

use std::sync::Arc;

pub use assessor::{plaque_burden, RiskAssessor};
pub use classifier::PercentileClassifier;

use crate::adapters::{BuiltinReference, JsonReferenceFile};
use crate::config::CalculatorConfig;
use crate::domain::ReferenceTables;
use crate::ports::ReferenceSource;
use crate::CimtError;

/// Load the reference tables selected by `config`.
///
/// Uses the JSON file at `reference_path` when set, the built-in tables
/// otherwise.
///
/// # Errors
/// Returns error if the data cannot be read or fails validation.
pub fn load_reference_tables(config: &CalculatorConfig) -> Result<Arc<ReferenceTables>, CimtError> {
    let tables = match &config.reference_path {
        Some(path) => load_from(&JsonReferenceFile::new(path), config)?,
        None => load_from(&BuiltinReference::new(), config)?,
    };
    Ok(Arc::new(tables))
}

fn load_from<S>(source: &S, config: &CalculatorConfig) -> Result<ReferenceTables, CimtError>
where
    S: ReferenceSource,
    S::Error: Into<CimtError>,
{
    tracing::info!("Loading {} (race window {})", source.describe(), config.race_window);
    let tables = source.load(config.race_window).map_err(Into::into)?;
    tracing::debug!("Loaded {} reference groups", tables.groups().count());
    Ok(tables)
}
