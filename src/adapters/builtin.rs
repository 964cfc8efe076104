//! Built-in reference data.
//!
//! Percentile tables for right and left CIMT by race and sex (ages 45–65),
//! the general population table by sex (ages 15–40 and 70–85) and the
//! average male/female age–CIMT curves.

use crate::domain::{
    AgeCimtCurve, PercentileTable, Race, RaceWindow, ReferenceError, ReferenceTables,
    ReferenceTablesBuilder, Sex, Side, TableGroup,
};
use crate::ports::ReferenceSource;

type Row<const N: usize> = (u32, [(&'static str, f64); N]);

const RIGHT_WHITE_MALE: &[Row<3>] = &[
    (45, [("25th", 0.496), ("50th", 0.570), ("75th", 0.654)]),
    (50, [("25th", 0.534), ("50th", 0.617), ("75th", 0.714)]),
    (55, [("25th", 0.572), ("50th", 0.664), ("75th", 0.774)]),
    (60, [("25th", 0.610), ("50th", 0.711), ("75th", 0.834)]),
    (65, [("25th", 0.648), ("50th", 0.758), ("75th", 0.894)]),
];

const RIGHT_WHITE_FEMALE: &[Row<3>] = &[
    (45, [("25th", 0.476), ("50th", 0.536), ("75th", 0.610)]),
    (50, [("25th", 0.509), ("50th", 0.576), ("75th", 0.660)]),
    (55, [("25th", 0.542), ("50th", 0.616), ("75th", 0.710)]),
    (60, [("25th", 0.575), ("50th", 0.676), ("75th", 0.760)]),
    (65, [("25th", 0.608), ("50th", 0.608), ("75th", 0.810)]),
];

const RIGHT_BLACK_MALE: &[Row<3>] = &[
    (45, [("25th", 0.514), ("50th", 0.604), ("75th", 0.700)]),
    (55, [("25th", 0.614), ("50th", 0.724), ("75th", 0.824)]),
    (65, [("25th", 0.714), ("50th", 0.844), ("75th", 1.000)]),
];

const RIGHT_BLACK_FEMALE: &[Row<3>] = &[
    (45, [("25th", 0.518), ("50th", 0.588), ("75th", 0.664)]),
    (55, [("25th", 0.578), ("50th", 0.668), ("75th", 0.764)]),
    (65, [("25th", 0.638), ("50th", 0.748), ("75th", 0.864)]),
];

const LEFT_WHITE_MALE: &[Row<3>] = &[
    (45, [("25th", 0.524), ("50th", 0.598), ("75th", 0.690)]),
    (50, [("25th", 0.556), ("50th", 0.641), ("75th", 0.748)]),
    (55, [("25th", 0.588), ("50th", 0.684), ("75th", 0.806)]),
    (60, [("25th", 0.620), ("50th", 0.727), ("75th", 0.864)]),
    (65, [("25th", 0.652), ("50th", 0.770), ("75th", 0.922)]),
];

const LEFT_WHITE_FEMALE: &[Row<3>] = &[
    (45, [("25th", 0.472), ("50th", 0.538), ("75th", 0.610)]),
    (50, [("25th", 0.506), ("50th", 0.580), ("75th", 0.660)]),
    (55, [("25th", 0.540), ("50th", 0.622), ("75th", 0.710)]),
    (60, [("25th", 0.574), ("50th", 0.664), ("75th", 0.760)]),
    (65, [("25th", 0.608), ("50th", 0.706), ("75th", 0.810)]),
];

const LEFT_BLACK_MALE: &[Row<3>] = &[
    (45, [("25th", 0.530), ("50th", 0.614), ("75th", 0.704)]),
    (55, [("25th", 0.610), ("50th", 0.714), ("75th", 0.840)]),
    (65, [("25th", 0.690), ("50th", 0.814), ("75th", 0.976)]),
];

const LEFT_BLACK_FEMALE: &[Row<3>] = &[
    (45, [("25th", 0.494), ("50th", 0.566), ("75th", 0.644)]),
    (55, [("25th", 0.558), ("50th", 0.646), ("75th", 0.748)]),
    (65, [("25th", 0.622), ("50th", 0.726), ("75th", 0.852)]),
];

#[rustfmt::skip]
const GENERAL_MALE: &[Row<6>] = &[
    (15, [("2.5th", 0.263), ("10th", 0.311), ("25th", 0.354), ("50th", 0.401), ("75th", 0.449), ("90th", 0.492)]),
    (20, [("2.5th", 0.280), ("10th", 0.331), ("25th", 0.377), ("50th", 0.427), ("75th", 0.478), ("90th", 0.524)]),
    (25, [("2.5th", 0.297), ("10th", 0.351), ("25th", 0.400), ("50th", 0.453), ("75th", 0.507), ("90th", 0.556)]),
    (30, [("2.5th", 0.314), ("10th", 0.372), ("25th", 0.423), ("50th", 0.479), ("75th", 0.536), ("90th", 0.587)]),
    (35, [("2.5th", 0.331), ("10th", 0.392), ("25th", 0.446), ("50th", 0.505), ("75th", 0.565), ("90th", 0.619)]),
    (40, [("2.5th", 0.349), ("10th", 0.412), ("25th", 0.468), ("50th", 0.531), ("75th", 0.594), ("90th", 0.651)]),
    (70, [("2.5th", 0.451), ("10th", 0.533), ("25th", 0.606), ("50th", 0.688), ("75th", 0.769), ("90th", 0.842)]),
    (75, [("2.5th", 0.469), ("10th", 0.554), ("25th", 0.629), ("50th", 0.714), ("75th", 0.798), ("90th", 0.873)]),
    (80, [("2.5th", 0.486), ("10th", 0.574), ("25th", 0.652), ("50th", 0.740), ("75th", 0.827), ("90th", 0.905)]),
    (85, [("2.5th", 0.503), ("10th", 0.594), ("25th", 0.675), ("50th", 0.766), ("75th", 0.856), ("90th", 0.937)]),
];

#[rustfmt::skip]
const GENERAL_FEMALE: &[Row<6>] = &[
    (15, [("2.5th", 0.265), ("10th", 0.311), ("25th", 0.351), ("50th", 0.396), ("75th", 0.441), ("90th", 0.482)]),
    (20, [("2.5th", 0.282), ("10th", 0.330), ("25th", 0.373), ("50th", 0.421), ("75th", 0.469), ("90th", 0.512)]),
    (25, [("2.5th", 0.299), ("10th", 0.350), ("25th", 0.395), ("50th", 0.446), ("75th", 0.497), ("90th", 0.542)]),
    (30, [("2.5th", 0.315), ("10th", 0.369), ("25th", 0.417), ("50th", 0.471), ("75th", 0.524), ("90th", 0.572)]),
    (35, [("2.5th", 0.332), ("10th", 0.389), ("25th", 0.439), ("50th", 0.496), ("75th", 0.552), ("90th", 0.602)]),
    (40, [("2.5th", 0.349), ("10th", 0.408), ("25th", 0.461), ("50th", 0.521), ("75th", 0.580), ("90th", 0.633)]),
    (70, [("2.5th", 0.450), ("10th", 0.526), ("25th", 0.594), ("50th", 0.670), ("75th", 0.745), ("90th", 0.813)]),
    (75, [("2.5th", 0.466), ("10th", 0.545), ("25th", 0.616), ("50th", 0.694), ("75th", 0.773), ("90th", 0.843)]),
    (80, [("2.5th", 0.483), ("10th", 0.565), ("25th", 0.638), ("50th", 0.719), ("75th", 0.801), ("90th", 0.874)]),
    (85, [("2.5th", 0.500), ("10th", 0.585), ("25th", 0.660), ("50th", 0.744), ("75th", 0.828), ("90th", 0.904)]),
];

/// Mean distal 1 cm CCA IMT, general male population without coronary history.
#[rustfmt::skip]
const MALE_CURVE: &[(f64, f64)] = &[
    (6.0, 0.38), (10.0, 0.395), (15.0, 0.43), (20.0, 0.475), (22.0, 0.50), (25.0, 0.50),
    (28.0, 0.50), (30.0, 0.51), (35.0, 0.545), (37.0, 0.55), (40.0, 0.58), (41.0, 0.595),
    (45.0, 0.61), (47.0, 0.605), (50.0, 0.65), (55.0, 0.70), (60.0, 0.75), (65.0, 0.80),
    (70.0, 0.85), (75.0, 0.90), (80.0, 0.95), (90.0, 1.00),
];

/// Mean distal 1 cm CCA IMT, general female population without coronary history.
#[rustfmt::skip]
const FEMALE_CURVE: &[(f64, f64)] = &[
    (6.0, 0.38), (10.0, 0.405), (15.0, 0.40), (21.0, 0.449), (25.5, 0.449), (30.0, 0.48),
    (35.0, 0.50), (36.0, 0.515), (41.5, 0.53), (45.0, 0.55), (50.0, 0.59), (55.0, 0.635),
    (60.0, 0.68), (65.0, 0.715), (70.0, 0.765), (75.0, 0.81), (80.0, 0.86), (85.0, 0.91),
];

/// Reference source backed by the compiled-in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinReference;

impl BuiltinReference {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn add_rows<const N: usize>(
    mut builder: ReferenceTablesBuilder,
    group: TableGroup,
    rows: &[Row<N>],
) -> Result<ReferenceTablesBuilder, ReferenceError> {
    for (age, pairs) in rows {
        builder = builder.table(group, *age, PercentileTable::from_pairs(pairs)?)?;
    }
    Ok(builder)
}

impl ReferenceSource for BuiltinReference {
    type Error = ReferenceError;

    fn load(&self, race_window: RaceWindow) -> Result<ReferenceTables, Self::Error> {
        let race_tables: [(Side, Race, Sex, &[Row<3>]); 8] = [
            (Side::Right, Race::White, Sex::Male, RIGHT_WHITE_MALE),
            (Side::Right, Race::White, Sex::Female, RIGHT_WHITE_FEMALE),
            (Side::Right, Race::Black, Sex::Male, RIGHT_BLACK_MALE),
            (Side::Right, Race::Black, Sex::Female, RIGHT_BLACK_FEMALE),
            (Side::Left, Race::White, Sex::Male, LEFT_WHITE_MALE),
            (Side::Left, Race::White, Sex::Female, LEFT_WHITE_FEMALE),
            (Side::Left, Race::Black, Sex::Male, LEFT_BLACK_MALE),
            (Side::Left, Race::Black, Sex::Female, LEFT_BLACK_FEMALE),
        ];

        let mut builder = ReferenceTables::builder().race_window(race_window);
        for (side, race, sex, rows) in race_tables {
            builder = add_rows(builder, TableGroup::Race { side, race, sex }, rows)?;
        }
        builder = add_rows(builder, TableGroup::General { sex: Sex::Male }, GENERAL_MALE)?;
        builder = add_rows(builder, TableGroup::General { sex: Sex::Female }, GENERAL_FEMALE)?;

        builder
            .curve(Sex::Male, AgeCimtCurve::from_pairs(MALE_CURVE)?)?
            .curve(Sex::Female, AgeCimtCurve::from_pairs(FEMALE_CURVE)?)?
            .build()
    }

    fn describe(&self) -> String {
        "built-in reference tables".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> ReferenceTables {
        BuiltinReference::new()
            .load(RaceWindow::default())
            .expect("Built-in data is valid")
    }

    #[test]
    fn test_builtin_loads() {
        let tables = tables();
        assert_eq!(tables.groups().count(), 10);
        assert_eq!(
            tables.ages(TableGroup::General { sex: Sex::Female }),
            vec![15, 20, 25, 30, 35, 40, 70, 75, 80, 85]
        );
        assert_eq!(
            tables.ages(TableGroup::Race {
                side: Side::Left,
                race: Race::Black,
                sex: Sex::Male
            }),
            vec![45, 55, 65]
        );
    }

    #[test]
    fn test_curve_sample_counts() {
        let tables = tables();
        assert_eq!(tables.lookup_curve(Sex::Male).points().len(), 22);
        assert_eq!(tables.lookup_curve(Sex::Female).points().len(), 18);
    }

    #[test]
    fn test_general_tables_are_graded() {
        let tables = tables();
        let matched = tables
            .lookup_table(Side::Right, Race::General, Sex::Male, 20)
            .expect("General table");
        assert_eq!(matched.table.len(), 6);
        assert_eq!(matched.table.threshold("2.5th"), Some(0.280));
    }
}
