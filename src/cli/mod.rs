//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Delegate to the changelog command
//!
//! The CLI layer is thin. Everything past argument parsing lives in
//! [`commands`], which only talks to the forge through its traits.

pub mod args;
pub mod commands;

pub use args::Cli;

use anyhow::Result;
use std::ffi::OsString;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ui::output::Verbosity;

/// Run the CLI application with the process arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments.
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::parse_or_usage(args) {
        Ok(cli) => cli,
        Err(text) => {
            print!("{}", text);
            return Ok(());
        }
    };

    init_tracing(cli.verbosity());

    let config = cli.into_config();
    commands::changelog(&config)
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the verbosity flags. Logs go to stderr so stdout
/// carries only the changelog.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    // Already installed when called twice in one process (tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}
