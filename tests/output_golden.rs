mod helpers;

use rrcheck::cli::args::Args;
use rrcheck::cli::exit::Outcome;
use rrcheck::orchestrator::run;
use rrcheck::{calculate, format_result};

fn fixture_args(method: &str, value1: f64, value2: f64) -> Args {
    Args::for_calculation(helpers::fixture_path("methods.csv"), method, value1, value2)
}

fn list_args(catalog: &str) -> Args {
    Args {
        list: true,
        method: None,
        value1: None,
        value2: None,
        ..Args::for_calculation(helpers::fixture_path(catalog), "", 0.0, 0.0)
    }
}

#[test]
fn golden_pass_human_output() {
    let result = run(&fixture_args("MethodA", 10.0, 11.0)).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Pass);
    let expected = "\
RRCHECK

PASS

Method: MethodA
Unit: mg/L
Average (X): 10.50 mg/L
Absolute Difference: 1.00 mg/L

Repeatability (r): 2.00 mg/L - PASS
Reproducibility (R): 5.00 mg/L - PASS

0.75R: 3.75 mg/L
Tolerance Range: 6.75 to 14.25 mg/L

r: PASS, R: PASS
";
    assert_eq!(result.output, expected);
}

#[test]
fn golden_fail_human_output_with_formulas() {
    let mut args = fixture_args("MethodB", 10.0, 12.0);
    args.show_formulas = true;
    let result = run(&args).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Fail);
    let expected = "\
RRCHECK

FAIL

Method: MethodB
Unit: %
Average (X): 11.0000 %
Absolute Difference: 2.0000 %

Repeatability (r): 1.1000 % - FAIL
Reproducibility (R): 3.3000 % - PASS

0.75R: 2.4750 %
Tolerance Range: 8.5250 to 13.4750 %

r: FAIL, R: PASS

Formula r: avg * 0.1
Formula R: avg * 0.3
Decimals: 4
";
    assert_eq!(result.output, expected);
}

#[test]
fn golden_bounds_refusal() {
    let result = run(&fixture_args("MethodA", -5.0, 10.0)).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Refusal);
    let expected = "\
RRCHECK

REFUSAL

Reason (E_BOUNDS): value outside the method's accepted range.
Detail: value -5 is out of range: values must be between 0 and 1000 mg/L
";
    assert_eq!(result.output, expected);
}

#[test]
fn golden_unknown_method_refusal() {
    let result = run(&fixture_args("Nope", 1.0, 2.0)).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Refusal);
    assert!(
        result
            .output
            .contains("Reason (E_NO_METHOD): no valid method selected.")
    );
}

#[test]
fn golden_formula_refusal() {
    let mut args = fixture_args("Broken", 1.0, 2.0);
    args.catalog = helpers::fixture_path("methods_bad_formula.csv");
    let result = run(&args).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Refusal);
    assert!(result.output.contains("Reason (E_FORMULA)"));
    assert!(result.output.contains("unknown identifier 'unknown_var'"));
}

#[test]
fn golden_catalog_refusal() {
    let mut args = fixture_args("MethodA", 1.0, 2.0);
    args.catalog = helpers::fixture_path("methods_missing_column.csv");
    let result = run(&args).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Refusal);
    assert!(result.output.contains("Reason (E_HEADERS)"));
    assert!(
        result
            .output
            .contains("Detail: catalog is missing required column \"Formula_R\"")
    );
}

#[test]
fn golden_method_list() {
    let result = run(&list_args("methods.csv")).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Listed);
    let expected = "\
MethodA (mg/L) [0 .. 1000]
MethodB (%) [0 .. 10000000]
Sulfur D5453 (mg/kg) [1 .. 1000]
Density (g/mL) [0.6 .. 1.1]
Bare (units) [0 .. 10000000]
Flash Point (\u{b0}C) [-40 .. 400]
";
    assert_eq!(result.output, expected);
}

#[test]
fn empty_catalog_lists_nothing() {
    let result = run(&list_args("methods_header_only.csv")).expect("pipeline");
    assert_eq!(result.output, "No methods available.\n");
}

#[test]
fn json_verdict_document() {
    let mut args = fixture_args("MethodA", 10.0, 11.0);
    args.json = true;
    let result = run(&args).expect("pipeline");
    let value: serde_json::Value = serde_json::from_str(&result.output).expect("json");
    assert_eq!(value["version"], "rrcheck.v0");
    assert_eq!(value["outcome"], "PASS");
    assert_eq!(value["method"], "MethodA");
    assert_eq!(value["result"]["average"], 10.5);
    assert_eq!(value["result"]["absolute_difference"], 1.0);
    assert_eq!(value["result"]["r"], 2.0);
    assert_eq!(value["result"]["R"], 5.0);
    assert_eq!(value["result"]["tolerance_075R"], 3.75);
    assert_eq!(value["result"]["tolerance_min"], 6.75);
    assert_eq!(value["result"]["tolerance_max"], 14.25);
    assert_eq!(value["result"]["decimals"], 2);
    assert!(value["refusal"].is_null());
}

#[test]
fn json_refusal_document() {
    let mut args = fixture_args("MethodA", -5.0, 10.0);
    args.json = true;
    let result = run(&args).expect("pipeline");
    let value: serde_json::Value = serde_json::from_str(&result.output).expect("json");
    assert_eq!(value["outcome"], "REFUSAL");
    assert_eq!(value["method"], "MethodA");
    assert_eq!(value["refusal"]["code"], "E_BOUNDS");
    assert!(value["result"].is_null());
}

#[test]
fn json_method_list() {
    let mut args = list_args("methods.csv");
    args.json = true;
    let result = run(&args).expect("pipeline");
    let value: serde_json::Value = serde_json::from_str(&result.output).expect("json");
    let methods = value["methods"].as_array().expect("array");
    assert_eq!(methods.len(), 6);
    assert_eq!(methods[1]["formula_r"], "avg * 0.1");
}

#[test]
fn save_writes_the_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("results.txt");
    let mut args = fixture_args("MethodA", 10.0, 11.0);
    args.save = Some(path.clone());
    let result = run(&args).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Pass);

    let catalog = helpers::fixture_catalog("methods.csv");
    let method = catalog.get("MethodA").expect("MethodA");
    let expected = format_result(&calculate(method, 10.0, 11.0).expect("result"));
    let saved = std::fs::read_to_string(&path).expect("saved report");
    assert_eq!(saved, format!("{expected}\n"));
}

#[test]
fn save_failure_is_refusal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut args = fixture_args("MethodA", 10.0, 11.0);
    args.save = Some(dir.path().join("missing").join("results.txt"));
    let result = run(&args).expect("pipeline");
    assert_eq!(result.outcome, Outcome::Refusal);
    assert!(result.output.contains("Reason (E_SAVE)"));
}
