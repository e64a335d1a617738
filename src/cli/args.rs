use std::path::PathBuf;

use clap::Parser;

use crate::output::report::DEFAULT_REPORT_PATH;

pub const DEFAULT_CATALOG: &str = "methods.csv";

const LONG_ABOUT: &str = "\
Check two duplicate measurements against a method's repeatability (r) and
reproducibility (R) limits.

1. Pick a method from the catalog (--list shows them).
2. Enter the two observed values.
3. Read the PASS/FAIL verdict and the 0.75R tolerance range.
4. Use --save to write the report to a file (results.txt by default).";

/// CLI argument parsing & validation.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rrcheck",
    version,
    about = "Check duplicate measurements against a method's r and R limits.",
    long_about = LONG_ABOUT,
    override_usage = "rrcheck [--catalog <CSV>] --method <NAME> <VALUE1> <VALUE2> [--json] [--save[=<PATH>]] [--show-formulas]\n       rrcheck [--catalog <CSV>] --list [--json]"
)]
pub struct Args {
    /// Method catalog CSV.
    #[arg(
        long,
        value_name = "CSV",
        env = "RRCHECK_CATALOG",
        default_value = DEFAULT_CATALOG
    )]
    pub catalog: PathBuf,

    /// Method name, exactly as listed in the catalog.
    #[arg(long, short = 'm', value_name = "NAME", required_unless_present = "list")]
    pub method: Option<String>,

    /// First observed value.
    #[arg(
        value_name = "VALUE1",
        allow_negative_numbers = true,
        value_parser = parse_value,
        required_unless_present = "list"
    )]
    pub value1: Option<f64>,

    /// Second observed value.
    #[arg(
        value_name = "VALUE2",
        allow_negative_numbers = true,
        value_parser = parse_value,
        required_unless_present = "list"
    )]
    pub value2: Option<f64>,

    /// List the catalog's methods instead of calculating.
    #[arg(long, conflicts_with_all = ["method", "value1", "value2", "save", "show_formulas"])]
    pub list: bool,

    /// Emit JSON output (single object).
    #[arg(long)]
    pub json: bool,

    /// Save the report (overwrites; default path: results.txt).
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_REPORT_PATH
    )]
    pub save: Option<PathBuf>,

    /// Also show the method's formulas and display precision.
    #[arg(long)]
    pub show_formulas: bool,
}

impl Args {
    pub fn parse() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Arguments for a single calculation with every optional flag off.
    pub fn for_calculation(
        catalog: impl Into<PathBuf>,
        method: impl Into<String>,
        value1: f64,
        value2: f64,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            method: Some(method.into()),
            value1: Some(value1),
            value2: Some(value2),
            list: false,
            json: false,
            save: None,
            show_formulas: false,
        }
    }
}

fn parse_value(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a valid number"))?;
    if !value.is_finite() {
        return Err(format!("'{raw}' is not a finite number"));
    }
    Ok(value)
}
