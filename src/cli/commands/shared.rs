//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, input discovery and the
//! statistics every command reports.

use crate::cli::args::ParseArgs;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Processing statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    /// Candidate files found during discovery
    pub files_discovered: usize,
    /// Files parsed and written
    pub files_processed: usize,
    /// Files that matched no known measurement format
    pub files_skipped: usize,
    /// Files that failed to parse or write
    pub files_failed: usize,
    /// JV curves extracted
    pub jv_curves: usize,
    /// Stability segments extracted
    pub stability_segments: usize,
    /// Sample points across all curves and segments
    pub points_extracted: usize,
    /// Total processing time
    pub processing_time: std::time::Duration,
    /// Output file sizes in bytes
    pub output_sizes: Vec<(String, u64)>,
}

impl ProcessingStats {
    /// Calculate total output size in bytes
    pub fn total_output_size(&self) -> u64 {
        self.output_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Format output size in human-readable format
    pub fn format_size(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", bytes, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over `log_level`. Compact lines without a
/// timer are used when `compact` is set.
pub fn setup_logging(log_level: &str, compact: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nrel_processor={}", log_level)));

    let result = if compact {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| Error::configuration(format!("Failed to initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using the layered approach (file -> env)
///
/// Without an explicit file the default config location is used when it
/// exists.
pub fn load_configuration(config_file: Option<&Path>) -> Result<Config> {
    let default_config_path = match config_file {
        Some(_) => None,
        None => Config::default_config_path().ok(),
    };

    let config_file = config_file.or_else(|| {
        default_config_path
            .as_deref()
            .filter(|path| path.exists())
    });

    match config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    Config::load_layered(config_file)
}

/// Apply parse command overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &ParseArgs) {
    if let Some(output_path) = &args.output_path {
        config.processing.output_path = output_path.clone();
    }
    if let Some(workers) = args.workers {
        config.performance.parallel_workers = workers;
    }
    if args.parquet {
        config.processing.write_parquet = true;
    }
    if args.no_recursive {
        config.processing.recursive = false;
    }
    config.processing.dry_run = args.dry_run;
    config.processing.force_overwrite |= args.force_overwrite;

    config.logging.level = args.get_log_level().to_string();
    config.logging.structured = !args.quiet;
}

/// Collect candidate measurement files from files and directories
///
/// Explicit files are always kept; directory entries are filtered by
/// extension (case-insensitive). Output is sorted and de-duplicated.
pub fn discover_measurement_files(
    inputs: &[PathBuf],
    recursive: bool,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }

        let walker = WalkDir::new(input).follow_links(false);
        let walker = if recursive { walker } else { walker.max_depth(1) };

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().is_file() && has_extension(path, extensions) {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();

    if files.is_empty() {
        warn!("No candidate measurement files found");
    } else {
        debug!("Discovered {} candidate files", files.len());
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Check if an error is critical enough to stop processing
pub fn is_critical_error(error: &Error) -> bool {
    matches!(
        error,
        Error::Configuration { .. } | Error::ProcessingInterrupted { .. }
    )
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
