//! Dual-result acceptance check against a method's r and R limits.

use std::fmt;

use serde::Serialize;

use crate::catalog::method::MethodDefinition;
use crate::engine::bounds::{ValidationError, validate_with_unit};
use crate::engine::formula::{FormulaError, evaluate_formula};

/// Share of R that defines the tolerance band around the average.
pub const TOLERANCE_FACTOR: f64 = 0.75;

/// Which precision limit a formula was resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Limit {
    /// r
    Repeatability,
    /// R
    Reproducibility,
}

impl Limit {
    pub fn symbol(self) -> &'static str {
        match self {
            Limit::Repeatability => "r",
            Limit::Reproducibility => "R",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalculationError {
    Validation(ValidationError),
    Formula { limit: Limit, source: FormulaError },
}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationError::Validation(err) => write!(f, "{err}"),
            CalculationError::Formula { limit, source } => {
                write!(f, "cannot resolve {}: {source}", limit.symbol())
            }
        }
    }
}

impl std::error::Error for CalculationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalculationError::Validation(err) => Some(err),
            CalculationError::Formula { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for CalculationError {
    fn from(err: ValidationError) -> Self {
        CalculationError::Validation(err)
    }
}

/// Two observed values checked against one method.
#[derive(Debug, Clone, Copy)]
pub struct CalculationRequest<'a> {
    pub method: &'a MethodDefinition,
    pub value1: f64,
    pub value2: f64,
}

impl<'a> CalculationRequest<'a> {
    pub fn new(method: &'a MethodDefinition, value1: f64, value2: f64) -> Self {
        Self {
            method,
            value1,
            value2,
        }
    }

    pub fn calculate(&self) -> Result<CalculationResult, CalculationError> {
        calculate(self.method, self.value1, self.value2)
    }
}

/// Outcome of one check. Values are unrounded; `decimals` is for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub method: String,
    pub unit: String,
    pub decimals: u32,
    pub average: f64,
    pub absolute_difference: f64,
    #[serde(rename = "r")]
    pub repeatability: f64,
    #[serde(rename = "R")]
    pub reproducibility: f64,
    #[serde(rename = "r_pass")]
    pub repeatability_pass: bool,
    #[serde(rename = "R_pass")]
    pub reproducibility_pass: bool,
    #[serde(rename = "tolerance_075R")]
    pub tolerance_075r: f64,
    pub tolerance_min: f64,
    pub tolerance_max: f64,
}

impl CalculationResult {
    pub fn passed(&self) -> bool {
        self.repeatability_pass && self.reproducibility_pass
    }
}

/// Validate both values, then resolve r and R and derive the tolerance band.
pub fn calculate(
    method: &MethodDefinition,
    value1: f64,
    value2: f64,
) -> Result<CalculationResult, CalculationError> {
    for value in [value1, value2] {
        validate_with_unit(value, method.lower_limit, method.upper_limit, &method.unit)?;
    }

    let average = (value1 + value2) / 2.0;
    let absolute_difference = (value1 - value2).abs();

    let repeatability = resolve_limit(
        Limit::Repeatability,
        method.formula_r.as_deref(),
        method.static_r,
        average,
    )?;
    let reproducibility = resolve_limit(
        Limit::Reproducibility,
        method.formula_big_r.as_deref(),
        method.static_big_r,
        average,
    )?;

    let tolerance_075r = TOLERANCE_FACTOR * reproducibility;
    let result = CalculationResult {
        method: method.name.clone(),
        unit: method.unit.clone(),
        decimals: method.decimals,
        average,
        absolute_difference,
        repeatability,
        reproducibility,
        repeatability_pass: absolute_difference <= repeatability,
        reproducibility_pass: absolute_difference <= reproducibility,
        tolerance_075r,
        tolerance_min: average - tolerance_075r,
        tolerance_max: average + tolerance_075r,
    };
    tracing::debug!(
        method = %result.method,
        average,
        absolute_difference,
        r = repeatability,
        big_r = reproducibility,
        passed = result.passed(),
        "calculated"
    );
    Ok(result)
}

/// Formula when present, else the static limit, else zero.
pub fn resolve_limit(
    limit: Limit,
    formula: Option<&str>,
    fallback: Option<f64>,
    average: f64,
) -> Result<f64, CalculationError> {
    match formula.filter(|text| !text.trim().is_empty()) {
        Some(text) => evaluate_formula(text, average)
            .map_err(|source| CalculationError::Formula { limit, source }),
        None => Ok(fallback.unwrap_or(0.0)),
    }
}
