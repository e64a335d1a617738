//! Plain-text report persistence.

use std::io;
use std::path::Path;

use crate::engine::calculate::CalculationResult;
use crate::output::human::format_result;

/// Default report file name when `--save` is given without a path.
pub const DEFAULT_REPORT_PATH: &str = "results.txt";

/// Write the report for `result`, replacing any existing file.
pub fn save_report(path: &Path, result: &CalculationResult) -> io::Result<()> {
    let mut text = format_result(result);
    text.push('\n');
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), method = %result.method, "report saved");
    Ok(())
}
