//! Adapters layer: Concrete implementations of ports.
//!
//! - `builtin`: compiled-in reference tables and curves
//! - `json`: reference tables loaded from a JSON file
//! - `policy`: impression decision tables

pub mod builtin;
pub mod json;
pub mod policy;

pub use builtin::BuiltinReference;
pub use json::JsonReferenceFile;
pub use policy::{LabelSetPolicy, WorstBandPolicy, TIER_BY_FLOOR};
