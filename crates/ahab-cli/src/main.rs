//! # ahab: container workspace CLI
//!
//! Short subcommands for working inside one configured container, each
//! translated into a full invocation of a Docker-compatible runtime.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

mod commands;
mod host;

use std::process::ExitCode;

use ahab_common::constants::{DEFAULT_RUNTIME, RUNTIME_ENV};
use ahab_common::error::AhabError;
use clap::FromArgMatches;
use tracing_subscriber::EnvFilter;

use crate::commands::GlobalArgs;
use crate::host::HostEnvironment;

fn main() -> ExitCode {
    let line = commands::split_command_line(std::env::args_os());
    let runtime = line
        .runtime
        .clone()
        .or_else(|| std::env::var(RUNTIME_ENV).ok())
        .unwrap_or_else(|| DEFAULT_RUNTIME.to_owned());
    let matches = commands::cli(&runtime).get_matches_from(line.head.iter().cloned());
    let globals = GlobalArgs::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_tracing(globals.verbose);

    let host = HostEnvironment::new(globals.config, globals.runtime);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match commands::execute(&matches, line.raw.as_deref(), &host, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("error: {err:#}");
            }
            let code = err.downcast_ref::<AhabError>().map_or(1, AhabError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
