//! Command implementations for the NREL processor CLI
//!
//! Each command lives in its own module and returns the statistics it
//! gathered so `main` can decide the exit status.

pub mod inspect;
pub mod parse;
pub mod schema;
pub mod shared;

pub use shared::ProcessingStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Dispatch to the subcommand handler
pub async fn run(args: Args) -> Result<ProcessingStats> {
    match args.command {
        Some(Commands::Parse(parse_args)) => parse::run_parse(parse_args).await,
        Some(Commands::Inspect(inspect_args)) => inspect::run_inspect(inspect_args).await,
        Some(Commands::Schema(schema_args)) => schema::run_schema(schema_args).await,
        None => Err(Error::configuration("No command given")),
    }
}
