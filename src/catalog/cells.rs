//! Cell coercion & default substitution for catalog rows.
//!
//! All cells are ASCII-trimmed first. Empty means "absent":
//! - `r` / `R` => `None`
//! - `Lower_Limit` => 0.0, `Upper_Limit` => 10,000,000.0
//! - `Number_of_Decimals` => 4
//! - `Formula_r` / `Formula_R` => `None`

use crate::catalog::method::{
    DEFAULT_DECIMALS, DEFAULT_LOWER_LIMIT, DEFAULT_UPPER_LIMIT, MAX_DECIMALS,
};
use crate::normalize::trim::ascii_trim;

/// A cell that could not be coerced; names what was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellError {
    pub expected: &'static str,
}

pub fn parse_optional_float(raw: &str) -> Result<Option<f64>, CellError> {
    let cell = ascii_trim(raw);
    if cell.is_empty() {
        return Ok(None);
    }
    parse_float(cell).map(Some)
}

pub fn parse_lower_limit(raw: &str) -> Result<f64, CellError> {
    Ok(parse_optional_float(raw)?.unwrap_or(DEFAULT_LOWER_LIMIT))
}

pub fn parse_upper_limit(raw: &str) -> Result<f64, CellError> {
    Ok(parse_optional_float(raw)?.unwrap_or(DEFAULT_UPPER_LIMIT))
}

pub fn parse_decimals(raw: &str) -> Result<u32, CellError> {
    let cell = ascii_trim(raw);
    if cell.is_empty() {
        return Ok(DEFAULT_DECIMALS);
    }
    let expected = CellError {
        expected: "an integer from 0 to 17",
    };
    match cell.parse::<u32>() {
        Ok(decimals) if decimals <= MAX_DECIMALS => Ok(decimals),
        _ => Err(expected),
    }
}

pub fn parse_formula(raw: &str) -> Option<String> {
    let cell = ascii_trim(raw);
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

fn parse_float(cell: &str) -> Result<f64, CellError> {
    match cell.parse::<f64>() {
        Ok(value) if !value.is_nan() => Ok(value),
        _ => Err(CellError {
            expected: "a number",
        }),
    }
}
