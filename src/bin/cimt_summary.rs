//! One-shot CIMT risk summary for scripts and batch use.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin cimt_summary -- --right 0.632 --left 0.670 --age 49 --sex male \
//!     [--race white] [--plaques "2.0,1.5"] [--json]
//! cargo run --bin cimt_summary -- --dump-reference
//! ```
//!
//! Configuration is read from the same `CIMT_*` environment variables as the
//! TUI. Logs go to stderr so stdout stays machine-readable.
//!
//! Inside the race window `--race` must be white or black and defaults to
//! white; outside it the general tables are used whatever is passed.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cimt_report::adapters::{JsonReferenceFile, WorstBandPolicy};
use cimt_report::application::{load_reference_tables, RiskAssessor};
use cimt_report::domain::{parse_plaque_sizes, PatientInput, Race, RaceWindow, Sex};
use cimt_report::CalculatorConfig;

const USAGE: &str = "Usage: cimt_summary --right <mm> --left <mm> --age <years> --sex <male|female> \
[--race <white|black>] [--plaques <mm,mm,...>] [--json]\n       cimt_summary --dump-reference";

#[derive(Debug, Default)]
struct Args {
    right: Option<f64>,
    left: Option<f64>,
    age: Option<u32>,
    sex: Option<Sex>,
    race: Option<Race>,
    plaques: Vec<f64>,
    json: bool,
    dump_reference: bool,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}\n{USAGE}");
    std::process::exit(2);
}

fn value_of(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    match args.next() {
        Some(v) if !v.is_empty() => v,
        _ => usage_error(&format!("Missing value for {flag}")),
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str, flag: &str) -> T {
    raw.trim()
        .parse()
        .unwrap_or_else(|_| usage_error(&format!("Invalid value for {flag}: {raw}")))
}

/// Race submitted for `age`: White unless chosen inside the window.
fn resolve_race(requested: Option<Race>, age: u32, window: RaceWindow) -> Result<Race, String> {
    if !window.contains(age) {
        return Ok(Race::General);
    }
    match requested {
        None => Ok(Race::White),
        Some(Race::General) => Err(format!(
            "--race must be white or black for ages {window}"
        )),
        Some(race) => Ok(race),
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Args {
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--right" => parsed.right = Some(parse_value(&value_of(&mut args, &arg), &arg)),
            "--left" => parsed.left = Some(parse_value(&value_of(&mut args, &arg), &arg)),
            "--age" => parsed.age = Some(parse_value(&value_of(&mut args, &arg), &arg)),
            "--sex" => {
                let raw = value_of(&mut args, &arg);
                parsed.sex = Some(raw.parse().unwrap_or_else(|e: String| usage_error(&e)));
            }
            "--race" => {
                let raw = value_of(&mut args, &arg);
                parsed.race = Some(raw.parse().unwrap_or_else(|e: String| usage_error(&e)));
            }
            "--plaques" => {
                let raw = value_of(&mut args, &arg);
                parsed.plaques = parse_plaque_sizes(&raw).unwrap_or_else(|e| usage_error(&e));
            }
            "--json" => parsed.json = true,
            "--dump-reference" => parsed.dump_reference = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => usage_error(&format!("Unknown arg: {arg}")),
        }
    }

    parsed
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = parse_args(std::env::args().skip(1));
    let config = CalculatorConfig::from_env()?;
    let tables = load_reference_tables(&config)?;

    if args.dump_reference {
        println!("{}", JsonReferenceFile::render(&tables)?);
        return Ok(());
    }

    let (Some(right), Some(left), Some(age), Some(sex)) = (args.right, args.left, args.age, args.sex)
    else {
        usage_error("--right, --left, --age and --sex are required");
    };

    let race = resolve_race(args.race, age, tables.race_window())
        .unwrap_or_else(|e| usage_error(&e));
    let patient = PatientInput::new(right, left, age, sex)
        .with_race(race)
        .with_plaques(args.plaques);

    let assessor = RiskAssessor::new(tables, WorstBandPolicy::default(), &config);
    let report = assessor
        .assess(&patient)
        .context("Could not build report")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Args {
        parse_args(line.split_whitespace().map(str::to_string))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args("--right 0.632 --left 0.670 --age 55 --sex male --plaques 2.0,1.5 --json");
        assert_eq!(parsed.right, Some(0.632));
        assert_eq!(parsed.age, Some(55));
        assert_eq!(parsed.sex, Some(Sex::Male));
        assert_eq!(parsed.race, None);
        assert_eq!(parsed.plaques, vec![2.0, 1.5]);
        assert!(parsed.json);
    }

    #[test]
    fn test_missing_race_inside_window_is_white() {
        let parsed = args("--right 0.632 --left 0.670 --age 55 --sex male");
        let window = RaceWindow::default();
        assert_eq!(resolve_race(parsed.race, 55, window), Ok(Race::White));
    }

    #[test]
    fn test_explicit_race_inside_window() {
        let parsed = args("--age 50 --race black");
        let window = RaceWindow::default();
        assert_eq!(resolve_race(parsed.race, 50, window), Ok(Race::Black));
        assert!(resolve_race(Some(Race::General), 50, window).is_err());
    }

    #[test]
    fn test_outside_window_is_general() {
        let window = RaceWindow::default();
        assert_eq!(resolve_race(None, 30, window), Ok(Race::General));
        assert_eq!(resolve_race(Some(Race::Black), 70, window), Ok(Race::General));
    }
}
