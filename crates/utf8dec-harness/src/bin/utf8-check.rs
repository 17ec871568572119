//! Runs every decoder check and prints one `PASS`/`FAIL` line per check.
//!
//! Usage: `utf8-check [--stride N] [--strategy NAME]...`

use std::process::ExitCode;

use utf8dec_harness::{CheckOptions, HarnessError, check, init_tracing};

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), HarnessError> {
    let options = CheckOptions::from_args(std::env::args().skip(1))?;
    let summary = check::run(&options, std::io::stdout().lock())?;
    if summary.is_success() {
        Ok(())
    } else {
        Err(HarnessError::Failed { failed: summary.fail })
    }
}
