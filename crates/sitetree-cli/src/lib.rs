#![forbid(unsafe_code)]

//! The `sitetree` admin command line.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Commands, run, run_from_env, run_with_output};
pub use error::{CliError, Result};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. The filter comes from `SITETREE_LOG`
/// and defaults to `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("SITETREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
