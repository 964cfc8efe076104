//! Calculator configuration.
//!
//! Defaults reproduce the published calculator. Each value can be
//! overridden through an environment variable:
//!
//! | Variable                   | Default | Meaning                                  |
//! |----------------------------|---------|------------------------------------------|
//! | `CIMT_RACE_WINDOW_MIN`     | 43      | Youngest age using race-specific tables  |
//! | `CIMT_RACE_WINDOW_MAX`     | 66      | Oldest age using race-specific tables    |
//! | `CIMT_PLAQUE_THRESHOLD_MM` | 1.2     | Smallest plaque counted in the burden    |
//! | `CIMT_REFERENCE_PATH`      | unset   | JSON file replacing the built-in tables  |

use std::path::PathBuf;

use crate::domain::RaceWindow;
use crate::CimtError;

/// Smallest plaque size (mm) counted as clinically significant.
pub const DEFAULT_PLAQUE_THRESHOLD_MM: f64 = 1.2;

/// Settings shared by the classifier and assessor.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    /// Ages at which race-specific tables apply
    pub race_window: RaceWindow,

    /// Plaques below this size (mm) are left out of the burden
    pub plaque_threshold_mm: f64,

    /// Optional JSON reference file replacing the built-in tables
    pub reference_path: Option<PathBuf>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            race_window: RaceWindow::default(),
            plaque_threshold_mm: DEFAULT_PLAQUE_THRESHOLD_MM,
            reference_path: None,
        }
    }
}

impl CalculatorConfig {
    /// Read overrides from the process environment.
    ///
    /// # Errors
    /// Returns [`CimtError::Config`] if a variable does not parse or the
    /// resulting configuration is inconsistent.
    pub fn from_env() -> Result<Self, CimtError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// See [`CalculatorConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CimtError> {
        let defaults = Self::default();

        let config = Self {
            race_window: RaceWindow::new(
                parse_var(&lookup, "CIMT_RACE_WINDOW_MIN")?.unwrap_or(defaults.race_window.min_age),
                parse_var(&lookup, "CIMT_RACE_WINDOW_MAX")?.unwrap_or(defaults.race_window.max_age),
            ),
            plaque_threshold_mm: parse_var(&lookup, "CIMT_PLAQUE_THRESHOLD_MM")?
                .unwrap_or(defaults.plaque_threshold_mm),
            reference_path: lookup("CIMT_REFERENCE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`CimtError::Config`] for an empty race window or a negative
    /// plaque threshold.
    pub fn validate(&self) -> Result<(), CimtError> {
        if self.race_window.min_age > self.race_window.max_age {
            return Err(CimtError::Config(format!(
                "Race window {} is empty",
                self.race_window
            )));
        }
        if !(self.plaque_threshold_mm.is_finite() && self.plaque_threshold_mm >= 0.0) {
            return Err(CimtError::Config(format!(
                "Plaque threshold {} must be a non-negative number",
                self.plaque_threshold_mm
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, CimtError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CimtError::Config(format!("{key}={raw} is not a valid value"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::from_lookup(lookup(&[])).expect("Defaults are valid");
        assert_eq!(config, CalculatorConfig::default());
        assert_eq!(config.race_window, RaceWindow::new(43, 66));
        assert!((config.plaque_threshold_mm - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = CalculatorConfig::from_lookup(lookup(&[
            ("CIMT_RACE_WINDOW_MIN", "42"),
            ("CIMT_RACE_WINDOW_MAX", " 67 "),
            ("CIMT_PLAQUE_THRESHOLD_MM", "1.5"),
            ("CIMT_REFERENCE_PATH", "/etc/cimt/reference.json"),
        ]))
        .expect("Valid overrides");
        assert_eq!(config.race_window, RaceWindow::new(42, 67));
        assert!((config.plaque_threshold_mm - 1.5).abs() < f64::EPSILON);
        assert_eq!(
            config.reference_path,
            Some(PathBuf::from("/etc/cimt/reference.json"))
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            CalculatorConfig::from_lookup(lookup(&[("CIMT_RACE_WINDOW_MIN", "abc")])),
            Err(CimtError::Config(_))
        ));
        assert!(matches!(
            CalculatorConfig::from_lookup(lookup(&[("CIMT_RACE_WINDOW_MIN", "70")])),
            Err(CimtError::Config(_))
        ));
        assert!(matches!(
            CalculatorConfig::from_lookup(lookup(&[("CIMT_PLAQUE_THRESHOLD_MM", "-1")])),
            Err(CimtError::Config(_))
        ));
    }
}
