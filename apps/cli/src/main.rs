#![allow(clippy::print_stdout)]

pub mod handlers;
pub mod models;
pub mod services;

use crate::handlers::{check, explain, get, show};
use crate::models::args::{Cli, Commands, LogArgs};
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use strata_logger::{ConsoleFormat, LevelFilter, Logger, parse_level};
use tracing::warn;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = init_logger(&cli.logging)?;
    let resolved = services::loader::resolve(&cli.sources, cli.command.validates())?;

    if cli.logging.log_level.is_none() {
        match parse_level(&resolved.effective_log_level()) {
            Ok(level) => logger.set_level(level)?,
            Err(e) => warn!(error = %e, "Keeping the start-up log level"),
        }
    }

    match cli.command {
        Commands::Show { reveal, format } => show::show(&resolved, reveal, format)?,
        Commands::Get { key } => get::get(&resolved, &key)?,
        Commands::Explain { key } => explain::explain(&resolved, key.as_deref())?,
        Commands::Check {} => check::check(&resolved)?,
    }

    Ok(())
}

/// Starts at the requested level, or at `warn` until the settings name one.
fn init_logger(args: &LogArgs) -> Result<Logger> {
    let level = match &args.log_level {
        Some(level) => parse_level(level)?,
        None => LevelFilter::WARN,
    };
    let console = if args.log_json { ConsoleFormat::Json } else { ConsoleFormat::Compact };

    let builder = Logger::builder()
        .name(env!("CARGO_BIN_NAME"))
        .level(level)
        .console(Some(console))
        .ansi(std::io::stderr().is_terminal());
    let logger = match &args.log_dir {
        Some(dir) => builder.path(dir).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
