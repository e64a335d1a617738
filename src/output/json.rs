// JSON output schema assembly

use serde::Serialize;

use crate::catalog::method::{Catalog, MethodDefinition};
use crate::engine::calculate::CalculationResult;
use crate::refusal::domain::DomainRefusal;

pub const VERSION: &str = "rrcheck.v0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Pass,
    Fail,
    Refusal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Formulas {
    pub r: Option<String>,
    #[serde(rename = "R")]
    pub big_r: Option<String>,
}

impl Formulas {
    pub fn of(method: &MethodDefinition) -> Self {
        Self {
            r: method.formula_r.clone(),
            big_r: method.formula_big_r.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Refusal {
    pub code: String,
    pub message: String,
}

impl From<&DomainRefusal> for Refusal {
    fn from(refusal: &DomainRefusal) -> Self {
        Self {
            code: refusal.code.as_str().to_string(),
            message: refusal.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub outcome: Outcome,
    pub method: Option<String>,
    pub result: Option<CalculationResult>,
    pub formulas: Option<Formulas>,
    pub refusal: Option<Refusal>,
}

impl JsonOutput {
    pub fn verdict(result: CalculationResult, formulas: Option<Formulas>) -> Self {
        let outcome = if result.passed() {
            Outcome::Pass
        } else {
            Outcome::Fail
        };
        Self {
            version: VERSION,
            outcome,
            method: Some(result.method.clone()),
            result: Some(result),
            formulas,
            refusal: None,
        }
    }

    pub fn refusal(method: Option<String>, refusal: &DomainRefusal) -> Self {
        Self {
            version: VERSION,
            outcome: Outcome::Refusal,
            method,
            result: None,
            formulas: None,
            refusal: Some(Refusal::from(refusal)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodList<'a> {
    pub version: &'static str,
    pub methods: Vec<&'a MethodDefinition>,
}

impl<'a> MethodList<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            version: VERSION,
            methods: catalog.iter().collect(),
        }
    }
}

pub fn render_json<T: Serialize>(output: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string(output)?;
    out.push('\n');
    Ok(out)
}
