//! Command-line argument definitions for the NREL processor
//!
//! The CLI is defined with the clap derive API. Each subcommand carries its
//! own verbosity flags and a `validate()` step run before any work starts.

use crate::constants::MAX_PARALLEL_WORKERS;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the NREL measurement processor
///
/// Parses NREL JV-sweep and stability exports into notebook entry archives
/// and optional Parquet tables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nrel-processor",
    version,
    about = "Parse NREL solar-cell JV and stability measurement files",
    long_about = "Recognises NREL JV-sweep and stability-test exports, extracts their header \
                  metadata and curves, and writes one JSON entry archive per file with an \
                  optional Parquet table of the curve points."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse measurement files and write entry archives
    Parse(ParseArgs),
    /// Parse a single file and print what was extracted
    Inspect(InspectArgs),
    /// Print the notebook entity catalogue
    Schema(SchemaArgs),
}

/// Arguments for the parse command
#[derive(Debug, Clone, Parser)]
pub struct ParseArgs {
    /// Files or directories to process
    ///
    /// Directories are searched for files with a measurement extension
    /// (txt, dat, csv); files that match no known format are skipped.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for archives and Parquet files
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Output directory for generated archives"
    )]
    pub output_path: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/nrel-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of files processed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of parallel workers"
    )]
    pub workers: Option<usize>,

    /// Also write a Parquet table of curve points per file
    #[arg(long = "parquet", help = "Write Parquet tables alongside the archives")]
    pub parquet: bool,

    /// Only process files directly inside the given directories
    #[arg(long = "no-recursive", help = "Do not descend into subdirectories")]
    pub no_recursive: bool,

    /// Perform a dry run without writing output
    #[arg(
        long = "dry-run",
        help = "Show what would be processed without creating output files"
    )]
    pub dry_run: bool,

    /// Force overwrite of existing output files
    #[arg(long = "force", help = "Force overwrite of existing output files")]
    pub force_overwrite: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for the summary report
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Arguments for the inspect command
#[derive(Debug, Clone, Parser)]
pub struct InspectArgs {
    /// Measurement file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path to configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format
    ///
    /// `human` prints a summary, `json` the full entry archive and `csv` one
    /// row per curve point.
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    /// Include the parsed header fields in human output
    #[arg(long = "header", help = "Print header fields")]
    pub show_header: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

/// Arguments for the schema command
#[derive(Debug, Clone, Parser)]
pub struct SchemaArgs {
    /// Only show this entity (section name, e.g. NREL_JVmeasurement)
    #[arg(value_name = "SECTION")]
    pub section: Option<String>,

    /// Output format (csv is not supported)
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
    /// CSV format for data analysis
    Csv,
}

impl ParseArgs {
    /// Validate the parse command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        for input in &self.inputs {
            if !input.exists() {
                return Err(Error::configuration(format!(
                    "Input path does not exist: {}",
                    input.display()
                )));
            }
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(Error::configuration(
                    "Number of workers must be greater than 0",
                ));
            }
            if workers > MAX_PARALLEL_WORKERS {
                return Err(Error::configuration(format!(
                    "Number of workers cannot exceed {}",
                    MAX_PARALLEL_WORKERS
                )));
            }
        }

        validate_config_file(self.config_file.as_ref())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            level_for(self.verbose)
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}

impl InspectArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.file.is_file() {
            return Err(Error::configuration(format!(
                "Not a file: {}",
                self.file.display()
            )));
        }
        validate_config_file(self.config_file.as_ref())
    }

    pub fn get_log_level(&self) -> &'static str {
        level_for(self.verbose)
    }
}

impl SchemaArgs {
    pub fn validate(&self) -> Result<()> {
        if self.output_format == OutputFormat::Csv {
            return Err(Error::configuration(
                "The schema command supports human or json output",
            ));
        }
        Ok(())
    }
}

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn validate_config_file(config_file: Option<&PathBuf>) -> Result<()> {
    if let Some(config_file) = config_file {
        if !config_file.exists() {
            return Err(Error::configuration(format!(
                "Config file does not exist: {}",
                config_file.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse_args(inputs: Vec<PathBuf>) -> ParseArgs {
        ParseArgs {
            inputs,
            output_path: None,
            config_file: None,
            workers: None,
            parquet: false,
            no_recursive: false,
            dry_run: false,
            force_overwrite: false,
            verbose: 0,
            quiet: false,
            output_format: OutputFormat::Human,
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "nrel-processor",
            "parse",
            "data",
            "more",
            "-o",
            "out",
            "-j",
            "2",
            "--parquet",
            "-vv",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Parse(parse)) => {
                assert_eq!(parse.inputs.len(), 2);
                assert_eq!(parse.output_path, Some(PathBuf::from("out")));
                assert_eq!(parse.workers, Some(2));
                assert!(parse.parquet);
                assert_eq!(parse.get_log_level(), "debug");
            }
            other => panic!("expected parse command, got {:?}", other),
        }

        let args = Args::try_parse_from(["nrel-processor", "inspect", "f.txt", "--format", "json"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Inspect(InspectArgs { output_format: OutputFormat::Json, .. }))
        ));
    }

    #[test]
    fn test_parse_requires_input() {
        assert!(Args::try_parse_from(["nrel-processor", "parse"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["nrel-processor", "parse", "x", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_parse_args_validation() {
        let temp_dir = TempDir::new().unwrap();
        let args = parse_args(vec![temp_dir.path().to_path_buf()]);
        assert!(args.validate().is_ok());

        let mut invalid = args.clone();
        invalid.workers = Some(0);
        assert!(invalid.validate().is_err());

        invalid.workers = Some(MAX_PARALLEL_WORKERS + 1);
        assert!(invalid.validate().is_err());

        let missing = parse_args(vec![PathBuf::from("/nonexistent/path")]);
        assert!(missing.validate().is_err());

        let mut bad_config = args.clone();
        bad_config.config_file = Some(temp_dir.path().join("missing.toml"));
        assert!(bad_config.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = parse_args(vec![PathBuf::from(".")]);
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.verbose = 0;
        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_schema_rejects_csv() {
        let args = SchemaArgs {
            section: None,
            output_format: OutputFormat::Csv,
        };
        assert!(args.validate().is_err());
    }
}
