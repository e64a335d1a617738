//! Pipeline orchestration: load catalog -> look up method -> calculate -> output

use std::error::Error;

use crate::catalog::load::load_catalog;
use crate::catalog::method::{Catalog, MethodDefinition};
use crate::cli::args::Args;
use crate::cli::exit::Outcome;
use crate::engine::bounds::ValidationError;
use crate::engine::calculate::{CalculationResult, calculate};
use crate::normalize::trim::ascii_trim;
use crate::output::human::{render_method_list, render_refusal, render_verdict};
use crate::output::json::{Formulas, JsonOutput, MethodList, render_json};
use crate::output::report::save_report;
use crate::refusal::domain::DomainRefusal;

pub struct PipelineResult {
    pub outcome: Outcome,
    pub output: String,
}

/// A method resolved from the catalog and its calculation.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    pub method: &'a MethodDefinition,
    pub result: CalculationResult,
}

impl Evaluation<'_> {
    pub fn outcome(&self) -> Outcome {
        if self.result.passed() {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }
}

/// Look up `method` and run the engine. A missing or blank name is "no
/// valid method selected".
pub fn evaluate<'a>(
    catalog: &'a Catalog,
    method: Option<&str>,
    value1: f64,
    value2: f64,
) -> Result<Evaluation<'a>, DomainRefusal> {
    let name = method
        .map(ascii_trim)
        .filter(|name| !name.is_empty())
        .ok_or(ValidationError::NoMethod { requested: None })?;
    let method = catalog.lookup(name)?;
    let result = calculate(method, value1, value2)?;
    Ok(Evaluation { method, result })
}

pub fn run(args: &Args) -> Result<PipelineResult, Box<dyn Error>> {
    let catalog = match load_catalog(&args.catalog) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::error!(catalog = %args.catalog.display(), error = %err, "catalog unavailable");
            return refusal(args, DomainRefusal::from(&err));
        }
    };

    if args.list {
        return list_methods(args, &catalog);
    }

    let (Some(value1), Some(value2)) = (args.value1, args.value2) else {
        return Err("two values are required".into());
    };

    let evaluation = match evaluate(&catalog, args.method.as_deref(), value1, value2) {
        Ok(evaluation) => evaluation,
        Err(refusal_payload) => return refusal(args, refusal_payload),
    };

    if let Some(path) = args.save.as_deref() {
        if let Err(err) = save_report(path, &evaluation.result) {
            return refusal(args, DomainRefusal::save_failed(path, &err));
        }
    }

    let outcome = evaluation.outcome();
    let formulas = args.show_formulas.then_some(evaluation.method);
    let output = if args.json {
        let formulas = formulas.map(Formulas::of);
        render_json(&JsonOutput::verdict(evaluation.result, formulas))?
    } else {
        render_verdict(&evaluation.result, formulas)
    };
    Ok(PipelineResult { outcome, output })
}

fn list_methods(args: &Args, catalog: &Catalog) -> Result<PipelineResult, Box<dyn Error>> {
    let output = if args.json {
        render_json(&MethodList::new(catalog))?
    } else {
        render_method_list(catalog)
    };
    Ok(PipelineResult {
        outcome: Outcome::Listed,
        output,
    })
}

fn refusal(args: &Args, refusal: DomainRefusal) -> Result<PipelineResult, Box<dyn Error>> {
    tracing::debug!(code = %refusal.code, message = %refusal.message, "refusal");
    let output = if args.json {
        render_json(&JsonOutput::refusal(args.method.clone(), &refusal))?
    } else {
        render_refusal(&refusal)
    };
    Ok(PipelineResult {
        outcome: Outcome::Refusal,
        output,
    })
}
