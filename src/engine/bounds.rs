//! Input bounds validation.

use std::fmt;

/// A request the engine refuses to compute.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A value lies outside `[lower, upper]`.
    OutOfBounds {
        value: f64,
        lower: f64,
        upper: f64,
        unit: String,
    },
    /// No method, or one the catalog does not know.
    NoMethod { requested: Option<String> },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfBounds {
                value,
                lower,
                upper,
                unit,
            } => {
                write!(f, "value {value} is out of range: values must be between {lower} and {upper}")?;
                if !unit.is_empty() {
                    write!(f, " {unit}")?;
                }
                Ok(())
            }
            ValidationError::NoMethod { requested: Some(name) } => {
                write!(f, "no valid method selected: unknown method \"{name}\"")
            }
            ValidationError::NoMethod { requested: None } => {
                f.write_str("no valid method selected")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Inclusive bounds check: `lower <= value <= upper`.
///
/// NaN never validates.
pub fn validate(value: f64, lower: f64, upper: f64) -> Result<(), ValidationError> {
    if lower <= value && value <= upper {
        Ok(())
    } else {
        Err(ValidationError::OutOfBounds {
            value,
            lower,
            upper,
            unit: String::new(),
        })
    }
}

/// `validate` with the method's unit attached to the error.
pub fn validate_with_unit(
    value: f64,
    lower: f64,
    upper: f64,
    unit: &str,
) -> Result<(), ValidationError> {
    validate(value, lower, upper).map_err(|err| match err {
        ValidationError::OutOfBounds {
            value,
            lower,
            upper,
            ..
        } => ValidationError::OutOfBounds {
            value,
            lower,
            upper,
            unit: unit.to_string(),
        },
        other => other,
    })
}
