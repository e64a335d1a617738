#![forbid(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod engine;
pub mod format;
pub mod normalize;
pub mod orchestrator;
pub mod output;
pub mod refusal;

pub use catalog::load::{CatalogLoadError, load_catalog, parse_catalog};
pub use catalog::method::{Catalog, MethodDefinition};
pub use engine::bounds::{ValidationError, validate};
pub use engine::calculate::{
    CalculationError, CalculationRequest, CalculationResult, Limit, calculate,
};
pub use engine::formula::{Formula, FormulaError, evaluate_formula};
pub use output::human::format_result;

/// Env var holding the CLI's tracing filter (default: `warn`).
pub const LOG_ENV: &str = "RRCHECK_LOG";

/// Run the rrcheck CLI. Returns exit code (0, 1, or 2).
pub fn run() -> Result<u8, Box<dyn std::error::Error>> {
    use std::io::{self, Write};

    init_tracing();

    let args = match cli::args::Args::parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            err.print()?;
            return Ok(code);
        }
    };

    let result = orchestrator::run(&args)?;
    let mode = if args.json {
        cli::exit::OutputMode::Json
    } else {
        cli::exit::OutputMode::Human
    };
    let stream = cli::exit::output_stream(result.outcome, mode);

    match stream {
        cli::exit::OutputStream::Stdout => {
            let mut stdout = io::stdout();
            stdout.write_all(result.output.as_bytes())?;
            stdout.flush()?;
        }
        cli::exit::OutputStream::Stderr => {
            let mut stderr = io::stderr();
            stderr.write_all(result.output.as_bytes())?;
            stderr.flush()?;
        }
    }

    Ok(cli::exit::exit_code(result.outcome))
}

/// Diagnostics go to stderr so stdout carries only the verdict.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
