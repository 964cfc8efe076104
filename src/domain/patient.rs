//! Patient input types for CIMT risk reporting.
//!
//! Values arrive from the input layer (TUI form or command line) and are
//! validated here before they reach the classifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Youngest age covered by the reference tables.
pub const MIN_AGE: u32 = 15;

/// Oldest accepted age.
pub const MAX_AGE: u32 = 100;

/// Biological sex used to select reference tables and curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// The other sex, used by the form toggle.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(format!("Unknown sex '{other}' (expected Male or Female)")),
        }
    }
}

/// Race group of the reference population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Race {
    /// General population (no race-specific table)
    General,
    White,
    Black,
}

impl Race {
    /// Cycle to the next race-specific option; `General` enters the cycle at `White`.
    #[must_use]
    pub fn next_specific(self) -> Self {
        match self {
            Self::General | Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "General"),
            Self::White => write!(f, "White"),
            Self::Black => write!(f, "Black"),
        }
    }
}

impl FromStr for Race {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(format!(
                "Unknown race '{other}' (expected General, White or Black)"
            )),
        }
    }
}

/// Carotid side of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Right,
    Left,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => write!(f, "Right"),
            Self::Left => write!(f, "Left"),
        }
    }
}

/// Inclusive age window in which race-specific reference tables apply.
///
/// Outside the window the race is forced to [`Race::General`], both when the
/// form asks for a race and when a table is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceWindow {
    pub min_age: u32,
    pub max_age: u32,
}

impl RaceWindow {
    #[must_use]
    pub const fn new(min_age: u32, max_age: u32) -> Self {
        Self { min_age, max_age }
    }

    /// Whether race-specific tables apply at `age`.
    #[must_use]
    pub fn contains(&self, age: u32) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }

    /// The race actually used for table selection at `age`.
    #[must_use]
    pub fn effective_race(&self, race: Race, age: u32) -> Race {
        if self.contains(age) {
            race
        } else {
            Race::General
        }
    }
}

impl Default for RaceWindow {
    fn default() -> Self {
        Self::new(43, 66)
    }
}

impl fmt::Display for RaceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min_age, self.max_age)
    }
}

/// One patient's measurements for a single report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Right CIMT in mm
    pub right_cimt: f64,

    /// Left CIMT in mm
    pub left_cimt: f64,

    /// Age in years
    pub age: u32,

    pub sex: Sex,

    /// Requested race; forced to General outside the race window
    pub race: Race,

    /// Plaque sizes in mm
    pub plaques: Vec<f64>,
}

impl PatientInput {
    /// Create an input with General race and no plaques.
    #[must_use]
    pub fn new(right_cimt: f64, left_cimt: f64, age: u32, sex: Sex) -> Self {
        Self {
            right_cimt,
            left_cimt,
            age,
            sex,
            race: Race::General,
            plaques: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_race(mut self, race: Race) -> Self {
        self.race = race;
        self
    }

    #[must_use]
    pub fn with_plaques(mut self, plaques: Vec<f64>) -> Self {
        self.plaques = plaques;
        self
    }

    /// Mean of right and left CIMT.
    #[must_use]
    pub fn average_cimt(&self) -> f64 {
        (self.right_cimt + self.left_cimt) / 2.0
    }

    /// Validate that all values are within the supported domain.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(self.right_cimt.is_finite() && self.right_cimt > 0.0) {
            errors.push(format!("Right CIMT {} must be greater than 0", self.right_cimt));
        }
        if !(self.left_cimt.is_finite() && self.left_cimt > 0.0) {
            errors.push(format!("Left CIMT {} must be greater than 0", self.left_cimt));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{MIN_AGE}, {MAX_AGE}]",
                self.age
            ));
        }
        if let Some(bad) = self
            .plaques
            .iter()
            .find(|p| !(p.is_finite() && **p >= 0.0))
        {
            errors.push(format!("Plaque size {bad} must be a non-negative number"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parse a comma-separated list of plaque sizes.
///
/// Blank entries are skipped, so `""` and `"1.5, ,2"` are accepted.
///
/// # Errors
/// Returns an error naming the first entry that is not a non-negative number.
pub fn parse_plaque_sizes(text: &str) -> Result<Vec<f64>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(format!("Plaque size '{s}' is not a non-negative number")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_window_forces_general() {
        let window = RaceWindow::default();
        assert_eq!(window.effective_race(Race::White, 30), Race::General);
        assert_eq!(window.effective_race(Race::Black, 42), Race::General);
        assert_eq!(window.effective_race(Race::Black, 43), Race::Black);
        assert_eq!(window.effective_race(Race::White, 66), Race::White);
        assert_eq!(window.effective_race(Race::White, 67), Race::General);
    }

    #[test]
    fn test_validation() {
        let valid = PatientInput::new(0.632, 0.670, 49, Sex::Male)
            .with_race(Race::White)
            .with_plaques(vec![2.0, 1.5]);
        assert!(valid.validate().is_ok());

        let invalid = PatientInput::new(0.0, -0.1, 10, Sex::Female).with_plaques(vec![-1.0]);
        let errors = invalid.validate().expect_err("Should reject");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_parse_plaque_sizes() {
        assert_eq!(parse_plaque_sizes("").expect("Empty is fine"), Vec::<f64>::new());
        assert_eq!(
            parse_plaque_sizes(" 2.0, 1.5 ,, ").expect("Should parse"),
            vec![2.0, 1.5]
        );
        assert!(parse_plaque_sizes("1.2, abc").is_err());
        assert!(parse_plaque_sizes("-0.5").is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("female".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!(" M ".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!("Black".parse::<Race>(), Ok(Race::Black));
        assert!("other".parse::<Race>().is_err());
    }

    #[test]
    fn test_average_cimt() {
        let input = PatientInput::new(0.632, 0.670, 49, Sex::Male);
        assert!((input.average_cimt() - 0.651).abs() < 1e-9);
    }
}
