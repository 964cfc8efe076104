//! JSON reference file adapter.
//!
//! Lets a deployment replace the built-in tables with its own. The file is
//! read once at start-up and goes through the same validating builder, so a
//! repeated age or a decreasing threshold is rejected rather than silently
//! overwriting an earlier row. Groups and rows are lists, not maps, for the
//! same reason.
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "group": { "kind": "race", "side": "Right", "race": "White", "sex": "Male" },
//!       "rows": [ { "age": 45, "percentiles": [["25th", 0.496], ["50th", 0.570], ["75th", 0.654]] } ]
//!     }
//!   ],
//!   "curves": [ { "sex": "Male", "points": [[6.0, 0.38], [10.0, 0.395]] } ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{AgeCimtCurve, PercentileTable, RaceWindow, ReferenceTables, Sex, TableGroup};
use crate::ports::ReferenceSource;
use crate::CimtError;

#[derive(Debug, Serialize, Deserialize)]
struct ReferenceFile {
    groups: Vec<GroupRecord>,
    curves: Vec<CurveRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GroupRecord {
    group: TableGroup,
    rows: Vec<RowRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RowRecord {
    age: u32,
    percentiles: Vec<(String, f64)>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CurveRecord {
    sex: Sex,
    points: Vec<(f64, f64)>,
}

/// Reference source backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonReferenceFile {
    path: PathBuf,
}

impl JsonReferenceFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse and validate reference data from JSON text.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the data fails validation.
    pub fn parse(text: &str, race_window: RaceWindow) -> Result<ReferenceTables, CimtError> {
        let file: ReferenceFile = serde_json::from_str(text)?;

        let mut builder = ReferenceTables::builder().race_window(race_window);
        for record in file.groups {
            for row in record.rows {
                let pairs: Vec<(&str, f64)> = row
                    .percentiles
                    .iter()
                    .map(|(label, value)| (label.as_str(), *value))
                    .collect();
                builder = builder.table(record.group, row.age, PercentileTable::from_pairs(&pairs)?)?;
            }
        }
        for curve in file.curves {
            builder = builder.curve(curve.sex, AgeCimtCurve::from_pairs(&curve.points)?)?;
        }

        Ok(builder.build()?)
    }

    /// Render reference tables in the file format accepted by [`JsonReferenceFile::parse`].
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn render(tables: &ReferenceTables) -> Result<String, CimtError> {
        let groups = tables
            .groups()
            .map(|(group, rows)| GroupRecord {
                group,
                rows: rows
                    .iter()
                    .map(|(age, table)| RowRecord {
                        age: *age,
                        percentiles: table
                            .entries()
                            .iter()
                            .map(|(label, value)| (label.to_string(), *value))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let curves = [Sex::Male, Sex::Female]
            .into_iter()
            .map(|sex| CurveRecord {
                sex,
                points: tables.lookup_curve(sex).series(),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&ReferenceFile { groups, curves })?)
    }
}

impl ReferenceSource for JsonReferenceFile {
    type Error = CimtError;

    fn load(&self, race_window: RaceWindow) -> Result<ReferenceTables, Self::Error> {
        let text = std::fs::read_to_string(self.path())?;
        Self::parse(&text, race_window)
    }

    fn describe(&self) -> String {
        format!("reference file {}", self.path().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::builtin::BuiltinReference;
    use crate::domain::{Race, ReferenceError, Side};

    const MINIMAL: &str = r#"{
        "groups": [
            {
                "group": { "kind": "general", "sex": "Female" },
                "rows": [
                    { "age": 30, "percentiles": [["25th", 0.417], ["50th", 0.471], ["75th", 0.524]] }
                ]
            }
        ],
        "curves": [
            { "sex": "Male", "points": [[20.0, 0.475], [50.0, 0.65]] },
            { "sex": "Female", "points": [[21.0, 0.449], [50.0, 0.59]] }
        ]
    }"#;

    #[test]
    fn test_parse_minimal() {
        let tables = JsonReferenceFile::parse(MINIMAL, RaceWindow::default()).expect("Valid file");
        let matched = tables
            .lookup_table(Side::Left, Race::General, Sex::Female, 33)
            .expect("General female table");
        assert_eq!(matched.age, 30);
        assert_eq!(matched.table.threshold("50th"), Some(0.471));
        assert!(tables
            .lookup_table(Side::Left, Race::General, Sex::Male, 33)
            .is_err());
    }

    #[test]
    fn test_rejects_duplicate_rows() {
        let text = MINIMAL.replace(
            r#"{ "age": 30, "percentiles": [["25th", 0.417], ["50th", 0.471], ["75th", 0.524]] }"#,
            r#"{ "age": 30, "percentiles": [["25th", 0.417]] }, { "age": 30, "percentiles": [["25th", 0.5]] }"#,
        );
        let err = JsonReferenceFile::parse(&text, RaceWindow::default()).expect_err("Duplicate age");
        assert!(matches!(
            err,
            CimtError::Reference(ReferenceError::DuplicateAge { age: 30, .. })
        ));
    }

    #[test]
    fn test_describe_names_path() {
        let source = JsonReferenceFile::new("/srv/cimt/reference.json");
        assert_eq!(source.path(), Path::new("/srv/cimt/reference.json"));
        assert_eq!(source.describe(), "reference file /srv/cimt/reference.json");
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = JsonReferenceFile::parse("{ not json", RaceWindow::default()).expect_err("Bad JSON");
        assert!(matches!(err, CimtError::Serialization(_)));
    }

    #[test]
    fn test_render_builtin_reloads() {
        let builtin = BuiltinReference::new()
            .load(RaceWindow::default())
            .expect("Built-in data is valid");
        let text = JsonReferenceFile::render(&builtin).expect("Should render");
        let reloaded = JsonReferenceFile::parse(&text, RaceWindow::default()).expect("Should reload");

        let original = builtin
            .lookup_table(Side::Right, Race::Black, Sex::Female, 58)
            .expect("Group exists");
        let copy = reloaded
            .lookup_table(Side::Right, Race::Black, Sex::Female, 58)
            .expect("Group exists");
        assert_eq!(original.age, copy.age);
        assert_eq!(original.table, copy.table);
        assert_eq!(builtin.lookup_curve(Sex::Female), reloaded.lookup_curve(Sex::Female));
    }
}
