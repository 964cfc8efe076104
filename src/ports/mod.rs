//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and its data sources and decision policies.

mod impression;
mod reference_source;

pub use impression::ImpressionPolicy;
pub use reference_source::ReferenceSource;
