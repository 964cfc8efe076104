//! # cimt-report
//!
//! Cardiovascular risk reporting from carotid intima-media thickness (CIMT).
//!
//! This crate provides:
//! - Percentile classification of CIMT against age/sex/race reference tables
//! - Vascular age estimation from age–CIMT reference curves
//! - Plaque burden and a risk impression for the combined report
//! - Terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (patient input, percentile tables, curves, reports)
//! - `ports`: Trait definitions for reference data and impression policies
//! - `adapters`: Concrete implementations (built-in tables, JSON file, policies)
//! - `application`: Classifier and assessor orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::CalculatorConfig;
pub use domain::{
    ClassificationResult, PatientInput, Race, ReferenceTables, RiskReport, RiskTier, Sex, Side,
};

/// Result type for CIMT report operations
pub type Result<T> = std::result::Result<T, CimtError>;

/// Main error type for CIMT report operations
#[derive(Debug, thiserror::Error)]
pub enum CimtError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reference data rejected: {0}")]
    Reference(#[from] domain::ReferenceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
