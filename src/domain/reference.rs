//! Reference table store.
//!
//! Holds the percentile tables and age–CIMT curves as one immutable object.
//! It is built once at start-up through [`ReferenceTablesBuilder`], which
//! validates the data, and then shared by reference.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::curve::AgeCimtCurve;
use super::patient::{Race, RaceWindow, Sex, Side};
use super::percentile::PercentileTable;

/// Errors raised while building reference data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Invalid percentile label '{0}'")]
    InvalidLabel(String),

    #[error("Percentile {0} appears twice in one table")]
    DuplicateLabel(String),

    #[error("Threshold {value} for percentile {label} must be a non-negative number")]
    InvalidThreshold { label: String, value: f64 },

    #[error("Threshold for {upper} is below threshold for {lower}")]
    NonMonotonic { lower: String, upper: String },

    #[error("Percentile table has no entries")]
    EmptyTable,

    #[error("Age {age} appears twice for {group}")]
    DuplicateAge { group: TableGroup, age: u32 },

    #[error("Reference curve has no points")]
    EmptyCurve,

    #[error("Reference curve ages must strictly increase (at age {age})")]
    UnorderedCurve { age: f64 },

    #[error("Reference curve for {0} defined twice")]
    DuplicateCurve(Sex),

    #[error("Reference curve for {0} is missing")]
    MissingCurve(Sex),
}

/// Key of a group of percentile tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableGroup {
    /// General population table, shared by both sides
    General { sex: Sex },
    /// Race-specific table for one carotid side
    Race { side: Side, race: Race, sex: Sex },
}

impl fmt::Display for TableGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General { sex } => write!(f, "General {sex}"),
            Self::Race { side, race, sex } => write!(f, "{race} {sex} ({side})"),
        }
    }
}

/// No table exists for the selected group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No reference data available for {group}")]
pub struct MissingReferenceData {
    pub group: TableGroup,
}

/// A table selected for a patient, with the tabulated age it was found at.
#[derive(Debug, Clone, Copy)]
pub struct TableMatch<'a> {
    pub group: TableGroup,
    pub age: u32,
    pub table: &'a PercentileTable,
}

/// Immutable percentile tables and reference curves.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    /// Rows per group, sorted by age
    groups: BTreeMap<TableGroup, Vec<(u32, PercentileTable)>>,
    male_curve: AgeCimtCurve,
    female_curve: AgeCimtCurve,
    race_window: RaceWindow,
}

impl ReferenceTables {
    #[must_use]
    pub fn builder() -> ReferenceTablesBuilder {
        ReferenceTablesBuilder::default()
    }

    #[must_use]
    pub fn race_window(&self) -> RaceWindow {
        self.race_window
    }

    /// Group consulted for a patient, after forcing General race outside the
    /// race window.
    #[must_use]
    pub fn group_for(&self, side: Side, race: Race, sex: Sex, age: u32) -> TableGroup {
        match self.race_window.effective_race(race, age) {
            Race::General => TableGroup::General { sex },
            race => TableGroup::Race { side, race, sex },
        }
    }

    /// Select the table for a patient.
    ///
    /// Picks the tabulated age closest to `age`; on a tie the lower age wins.
    ///
    /// # Errors
    /// Returns [`MissingReferenceData`] when the group has no tables.
    pub fn lookup_table(
        &self,
        side: Side,
        race: Race,
        sex: Sex,
        age: u32,
    ) -> Result<TableMatch<'_>, MissingReferenceData> {
        let group = self.group_for(side, race, sex, age);
        let (matched_age, table) = self
            .groups
            .get(&group)
            .and_then(|rows| rows.iter().min_by_key(|(row_age, _)| row_age.abs_diff(age)))
            .ok_or(MissingReferenceData { group })?;

        Ok(TableMatch {
            group,
            age: *matched_age,
            table,
        })
    }

    #[must_use]
    pub fn lookup_curve(&self, sex: Sex) -> &AgeCimtCurve {
        match sex {
            Sex::Male => &self.male_curve,
            Sex::Female => &self.female_curve,
        }
    }

    /// Tabulated ages of a group, ascending.
    #[must_use]
    pub fn ages(&self, group: TableGroup) -> Vec<u32> {
        self.groups
            .get(&group)
            .map(|rows| rows.iter().map(|(age, _)| *age).collect())
            .unwrap_or_default()
    }

    /// All groups with their rows, in key order.
    pub fn groups(&self) -> impl Iterator<Item = (TableGroup, &[(u32, PercentileTable)])> {
        self.groups.iter().map(|(group, rows)| (*group, rows.as_slice()))
    }
}

/// Validating builder for [`ReferenceTables`].
#[derive(Debug, Default)]
pub struct ReferenceTablesBuilder {
    groups: BTreeMap<TableGroup, BTreeMap<u32, PercentileTable>>,
    male_curve: Option<AgeCimtCurve>,
    female_curve: Option<AgeCimtCurve>,
    race_window: RaceWindow,
}

impl ReferenceTablesBuilder {
    #[must_use]
    pub fn race_window(mut self, window: RaceWindow) -> Self {
        self.race_window = window;
        self
    }

    /// Add the table for one group at one age.
    ///
    /// # Errors
    /// Returns [`ReferenceError::DuplicateAge`] if the age is already present.
    pub fn table(
        mut self,
        group: TableGroup,
        age: u32,
        table: PercentileTable,
    ) -> Result<Self, ReferenceError> {
        let rows = self.groups.entry(group).or_default();
        if rows.contains_key(&age) {
            return Err(ReferenceError::DuplicateAge { group, age });
        }
        rows.insert(age, table);
        Ok(self)
    }

    /// Set the curve for one sex.
    ///
    /// # Errors
    /// Returns [`ReferenceError::DuplicateCurve`] if it was already set.
    pub fn curve(mut self, sex: Sex, curve: AgeCimtCurve) -> Result<Self, ReferenceError> {
        let slot = match sex {
            Sex::Male => &mut self.male_curve,
            Sex::Female => &mut self.female_curve,
        };
        if slot.is_some() {
            return Err(ReferenceError::DuplicateCurve(sex));
        }
        *slot = Some(curve);
        Ok(self)
    }

    /// # Errors
    /// Returns [`ReferenceError::MissingCurve`] unless both curves are set.
    pub fn build(self) -> Result<ReferenceTables, ReferenceError> {
        let male_curve = self
            .male_curve
            .ok_or(ReferenceError::MissingCurve(Sex::Male))?;
        let female_curve = self
            .female_curve
            .ok_or(ReferenceError::MissingCurve(Sex::Female))?;

        let groups = self
            .groups
            .into_iter()
            .map(|(group, rows)| (group, rows.into_iter().collect()))
            .collect();

        Ok(ReferenceTables {
            groups,
            male_curve,
            female_curve,
            race_window: self.race_window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(v25: f64) -> PercentileTable {
        PercentileTable::from_pairs(&[("25th", v25), ("50th", v25 + 0.1), ("75th", v25 + 0.2)])
            .expect("Valid table")
    }

    fn curve() -> AgeCimtCurve {
        AgeCimtCurve::from_pairs(&[(20.0, 0.45), (60.0, 0.75)]).expect("Valid curve")
    }

    fn sample() -> ReferenceTables {
        let general = TableGroup::General { sex: Sex::Male };
        let white = TableGroup::Race {
            side: Side::Right,
            race: Race::White,
            sex: Sex::Male,
        };
        ReferenceTables::builder()
            .table(general, 70, table(0.6))
            .and_then(|b| b.table(general, 40, table(0.45)))
            .and_then(|b| b.table(white, 45, table(0.5)))
            .and_then(|b| b.table(white, 55, table(0.55)))
            .and_then(|b| b.curve(Sex::Male, curve()))
            .and_then(|b| b.curve(Sex::Female, curve()))
            .and_then(ReferenceTablesBuilder::build)
            .expect("Valid reference data")
    }

    #[test]
    fn test_rows_sorted_by_age() {
        let tables = sample();
        assert_eq!(tables.ages(TableGroup::General { sex: Sex::Male }), vec![40, 70]);
    }

    #[test]
    fn test_nearest_age_tie_takes_lower() {
        let tables = sample();
        let matched = tables
            .lookup_table(Side::Right, Race::White, Sex::Male, 50)
            .expect("Group exists");
        assert_eq!(matched.age, 45);

        let matched = tables
            .lookup_table(Side::Right, Race::General, Sex::Male, 55)
            .expect("Group exists");
        assert_eq!(matched.age, 40);
    }

    #[test]
    fn test_general_forced_outside_window() {
        let tables = sample();
        let matched = tables
            .lookup_table(Side::Right, Race::White, Sex::Male, 30)
            .expect("General table exists");
        assert_eq!(matched.group, TableGroup::General { sex: Sex::Male });
        assert_eq!(matched.age, 40);
    }

    #[test]
    fn test_missing_group() {
        let tables = sample();
        let err = tables
            .lookup_table(Side::Left, Race::White, Sex::Male, 50)
            .expect_err("Left side has no tables");
        assert_eq!(
            err.group,
            TableGroup::Race {
                side: Side::Left,
                race: Race::White,
                sex: Sex::Male
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_age() {
        let group = TableGroup::General { sex: Sex::Female };
        let err = ReferenceTables::builder()
            .table(group, 30, table(0.4))
            .and_then(|b| b.table(group, 30, table(0.5)))
            .expect_err("Duplicate age");
        assert_eq!(err, ReferenceError::DuplicateAge { group, age: 30 });
    }

    #[test]
    fn test_requires_both_curves() {
        let err = ReferenceTables::builder()
            .curve(Sex::Male, curve())
            .and_then(ReferenceTablesBuilder::build)
            .expect_err("Female curve missing");
        assert_eq!(err, ReferenceError::MissingCurve(Sex::Female));

        let err = ReferenceTables::builder()
            .curve(Sex::Male, curve())
            .and_then(|b| b.curve(Sex::Male, curve()))
            .expect_err("Duplicate curve");
        assert_eq!(err, ReferenceError::DuplicateCurve(Sex::Male));
    }
}
