//! Drivers behind the `utf8-check` and `utf8-bench` binaries.
//!
//! Both write their report to any [`std::io::Write`] so they can be run
//! against an in-memory buffer in tests. Diagnostics go through `tracing`;
//! set `RUST_LOG` to see them.

pub mod bench;
pub mod check;
mod error;
mod options;

use std::sync::Once;

pub use error::HarnessError;
pub use options::{BenchOptions, CheckOptions};

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`, if it is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
