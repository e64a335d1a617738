//! Domain refusals: every error the tool reports, reduced to a code and a
//! human-readable message.

use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::catalog::load::CatalogLoadError;
use crate::engine::bounds::ValidationError;
use crate::engine::calculate::CalculationError;
use crate::refusal::codes::RefusalCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRefusal {
    pub code: RefusalCode,
    pub message: String,
}

impl DomainRefusal {
    pub fn new(code: RefusalCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn save_failed(path: &Path, err: &std::io::Error) -> Self {
        Self::new(
            RefusalCode::Save,
            format!("could not save results to {}: {err}", path.display()),
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomainRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for DomainRefusal {}

impl From<&CatalogLoadError> for DomainRefusal {
    fn from(err: &CatalogLoadError) -> Self {
        let code = match err {
            CatalogLoadError::Io { .. } => RefusalCode::Io,
            CatalogLoadError::Encoding(_) => RefusalCode::Encoding,
            CatalogLoadError::Csv { .. } => RefusalCode::CsvParse,
            CatalogLoadError::MissingHeader
            | CatalogLoadError::DuplicateHeader { .. }
            | CatalogLoadError::MissingColumn { .. }
            | CatalogLoadError::ExtraFields { .. } => RefusalCode::Headers,
            CatalogLoadError::EmptyMethod { .. } | CatalogLoadError::InvalidCell { .. } => {
                RefusalCode::Cell
            }
        };
        Self::new(code, err.to_string())
    }
}

impl From<CatalogLoadError> for DomainRefusal {
    fn from(err: CatalogLoadError) -> Self {
        Self::from(&err)
    }
}

impl From<ValidationError> for DomainRefusal {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::OutOfBounds { .. } => RefusalCode::Bounds,
            ValidationError::NoMethod { .. } => RefusalCode::NoMethod,
        };
        Self::new(code, err.to_string())
    }
}

impl From<CalculationError> for DomainRefusal {
    fn from(err: CalculationError) -> Self {
        match err {
            CalculationError::Validation(err) => Self::from(err),
            err @ CalculationError::Formula { .. } => {
                Self::new(RefusalCode::Formula, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::input::EncodingIssue;
    use crate::engine::formula::evaluate_formula;
    use crate::engine::calculate::Limit;

    #[test]
    fn catalog_errors_map_to_codes() {
        let refusal = DomainRefusal::from(CatalogLoadError::Encoding(EncodingIssue::NulByte));
        assert_eq!(refusal.code, RefusalCode::Encoding);
        let refusal = DomainRefusal::from(CatalogLoadError::MissingColumn { column: "Unit" });
        assert_eq!(refusal.code, RefusalCode::Headers);
        assert!(refusal.message().contains("\"Unit\""));
    }

    #[test]
    fn calculation_errors_map_to_codes() {
        let bounds = CalculationError::Validation(ValidationError::OutOfBounds {
            value: -1.0,
            lower: 0.0,
            upper: 10.0,
            unit: String::new(),
        });
        assert_eq!(DomainRefusal::from(bounds).code, RefusalCode::Bounds);

        let source = evaluate_formula("avg * x", 1.0).expect_err("unknown identifier");
        let formula = CalculationError::Formula {
            limit: Limit::Repeatability,
            source,
        };
        let refusal = DomainRefusal::from(formula);
        assert_eq!(refusal.code, RefusalCode::Formula);
        assert!(refusal.message().contains("'x'"));
    }

    #[test]
    fn display_prefixes_code() {
        let refusal = DomainRefusal::from(ValidationError::NoMethod { requested: None });
        assert_eq!(refusal.to_string(), "E_NO_METHOD: no valid method selected");
    }
}
