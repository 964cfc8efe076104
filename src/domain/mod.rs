//! Domain layer: Core types and logic.
//!
//! Pure Rust types for patient input, reference data and reports.
//! Reference data is validated when it is built and never mutated after.

mod curve;
mod patient;
mod percentile;
mod reference;
mod report;

pub use curve::{AgeCimtCurve, CurvePoint};
pub use patient::{
    parse_plaque_sizes, PatientInput, Race, RaceWindow, Sex, Side, MAX_AGE, MIN_AGE,
};
pub use percentile::{
    Band, ClassificationResult, PercentileLabel, PercentileTable, TableShape,
    NO_REFERENCE_DATA_LABEL,
};
pub use reference::{
    MissingReferenceData, ReferenceError, ReferenceTables, ReferenceTablesBuilder, TableGroup,
    TableMatch,
};
pub use report::{ChartData, Impression, RiskReport, RiskTier, CLINICAL_NOTE};
