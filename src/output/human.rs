// Human output formatting

use crate::catalog::method::{Catalog, MethodDefinition};
use crate::engine::calculate::CalculationResult;
use crate::format::numbers::{format_fixed, format_plain, pass_fail};
use crate::refusal::domain::DomainRefusal;

pub const BANNER: &str = "RRCHECK";

/// The fixed-order report for one result. This is also what gets saved.
pub fn format_result(result: &CalculationResult) -> String {
    render_result(result).join("\n")
}

pub fn render_result(result: &CalculationResult) -> Vec<String> {
    let unit = &result.unit;
    let num = |value: f64| format_fixed(value, result.decimals);
    vec![
        format!("Method: {}", result.method),
        format!("Unit: {unit}"),
        format!("Average (X): {} {unit}", num(result.average)),
        format!(
            "Absolute Difference: {} {unit}",
            num(result.absolute_difference)
        ),
        String::new(),
        format!(
            "Repeatability (r): {} {unit} - {}",
            num(result.repeatability),
            pass_fail(result.repeatability_pass)
        ),
        format!(
            "Reproducibility (R): {} {unit} - {}",
            num(result.reproducibility),
            pass_fail(result.reproducibility_pass)
        ),
        String::new(),
        format!("0.75R: {} {unit}", num(result.tolerance_075r)),
        format!(
            "Tolerance Range: {} to {} {unit}",
            num(result.tolerance_min),
            num(result.tolerance_max)
        ),
    ]
}

/// `r: PASS, R: FAIL`
pub fn render_summary(result: &CalculationResult) -> String {
    format!(
        "r: {}, R: {}",
        pass_fail(result.repeatability_pass),
        pass_fail(result.reproducibility_pass)
    )
}

pub fn render_formulas(method: &MethodDefinition) -> Vec<String> {
    vec![
        format!("Formula r: {}", method.formula_r.as_deref().unwrap_or("N/A")),
        format!(
            "Formula R: {}",
            method.formula_big_r.as_deref().unwrap_or("N/A")
        ),
        format!("Decimals: {}", method.decimals),
    ]
}

/// Full PASS/FAIL document: banner, verdict, report, summary.
pub fn render_verdict(result: &CalculationResult, formulas: Option<&MethodDefinition>) -> String {
    let mut lines = vec![
        BANNER.to_string(),
        String::new(),
        pass_fail(result.passed()).to_string(),
        String::new(),
    ];
    lines.extend(render_result(result));
    lines.push(String::new());
    lines.push(render_summary(result));
    if let Some(method) = formulas {
        lines.push(String::new());
        lines.extend(render_formulas(method));
    }
    finish(lines)
}

pub fn render_refusal(refusal: &DomainRefusal) -> String {
    finish(vec![
        BANNER.to_string(),
        String::new(),
        "REFUSAL".to_string(),
        String::new(),
        format!("Reason ({}): {}.", refusal.code, refusal.code.reason()),
        format!("Detail: {}", refusal.message),
    ])
}

/// One line per method, catalog order.
pub fn render_method_list(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return finish(vec!["No methods available.".to_string()]);
    }
    let lines = catalog
        .iter()
        .map(|method| {
            format!(
                "{} ({}) [{} .. {}]",
                method.name,
                method.unit,
                format_plain(method.lower_limit),
                format_plain(method.upper_limit)
            )
        })
        .collect();
    finish(lines)
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refusal::codes::RefusalCode;

    fn sample() -> CalculationResult {
        CalculationResult {
            method: "MethodA".to_string(),
            unit: "mg/L".to_string(),
            decimals: 2,
            average: 10.5,
            absolute_difference: 3.0,
            repeatability: 2.0,
            reproducibility: 5.0,
            repeatability_pass: false,
            reproducibility_pass: true,
            tolerance_075r: 3.75,
            tolerance_min: 6.75,
            tolerance_max: 14.25,
        }
    }

    #[test]
    fn summary_line() {
        assert_eq!(render_summary(&sample()), "r: FAIL, R: PASS");
    }

    #[test]
    fn report_rounds_to_decimals() {
        let mut result = sample();
        result.decimals = 0;
        let lines = render_result(&result);
        assert_eq!(lines[3], "Absolute Difference: 3 mg/L");
        assert_eq!(lines[8], "0.75R: 4 mg/L");
        assert_eq!(lines[9], "Tolerance Range: 7 to 14 mg/L");
    }

    #[test]
    fn formulas_default_to_na() {
        let method = MethodDefinition::new("A", "g").with_formulas(Some("avg * 0.1"), None);
        assert_eq!(
            render_formulas(&method),
            vec!["Formula r: avg * 0.1", "Formula R: N/A", "Decimals: 4"]
        );
    }

    #[test]
    fn refusal_lines() {
        let refusal = DomainRefusal::new(RefusalCode::NoMethod, "no valid method selected");
        assert_eq!(
            render_refusal(&refusal),
            "RRCHECK\n\nREFUSAL\n\nReason (E_NO_METHOD): no valid method selected.\nDetail: no valid method selected\n"
        );
    }

    #[test]
    fn method_list_in_catalog_order() {
        let catalog = Catalog::from_methods([
            MethodDefinition::new("Zinc", "mg/kg").with_bounds(0.0, 500.0),
            MethodDefinition::new("Ash", "%"),
        ]);
        assert_eq!(
            render_method_list(&catalog),
            "Zinc (mg/kg) [0 .. 500]\nAsh (%) [0 .. 10000000]\n"
        );
        assert_eq!(
            render_method_list(&Catalog::empty()),
            "No methods available.\n"
        );
    }
}
