//! Measures decoding throughput on a random fixture.
//!
//! Usage: `utf8-bench [--buffer-mib N] [--seconds S] [--seed N] [--strategy NAME]...`

use std::process::ExitCode;

use utf8dec_harness::{BenchOptions, bench, init_tracing};

fn main() -> ExitCode {
    init_tracing();
    let result = BenchOptions::from_args(std::env::args().skip(1))
        .and_then(|options| bench::run(&options, std::io::stdout().lock()));
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
