// Number formatting utilities

/// Format with exactly `decimals` fraction digits.
///
/// A value that rounds to zero prints without a sign (`-0.001` at two
/// decimals is `0.00`, not `-0.00`).
pub fn format_fixed(value: f64, decimals: u32) -> String {
    let precision = decimals as usize;
    let out = format!("{value:.precision$}");
    match out.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => out,
    }
}

/// Format a bound or raw input the way it was written: `0`, `1000`, `2.5`.
pub fn format_plain(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// PASS / FAIL label.
pub fn pass_fail(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}
