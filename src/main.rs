#![forbid(unsafe_code)]

use std::process::ExitCode;

fn main() -> ExitCode {
    match rrcheck::run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("rrcheck: {e}");
            ExitCode::from(2)
        }
    }
}
