//! Parse command implementation
//!
//! Discovers measurement files, parses them concurrently and writes one entry
//! archive (plus an optional Parquet table) per recognised file. A failing
//! file is reported and counted; the run continues with the rest.

use super::shared::{
    ProcessingStats, apply_cli_overrides, create_progress_bar, discover_measurement_files,
    is_critical_error, load_configuration, setup_logging,
};
use crate::app::schema::fresh_lab_id;
use crate::app::services::entry_builder::{build_entries, write_archive};
use crate::app::services::file_registry::{FileKind, FileRegistry, MeasurementData};
use crate::app::services::jv_parser::file_name::base_name;
use crate::app::services::parquet_writer::{
    CompressionAlgorithm, measurement_to_dataframe, write_parquet,
};
use crate::cli::args::{OutputFormat, ParseArgs};
use crate::config::Config;
use crate::{Error, Result};
use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Output settings shared by the file workers
#[derive(Debug, Clone)]
struct OutputSettings {
    output_dir: PathBuf,
    write_parquet: bool,
    compression: CompressionAlgorithm,
    overwrite: bool,
}

impl OutputSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.processing.output_path.clone(),
            write_parquet: config.processing.write_parquet,
            compression: config.processing.compression,
            overwrite: config.processing.force_overwrite,
        }
    }
}

/// Result of handling one file
#[derive(Debug)]
enum FileOutcome {
    Processed {
        kind: FileKind,
        curves: usize,
        points: usize,
        outputs: Vec<(String, u64)>,
    },
    Skipped,
}

/// Parse command runner
///
/// 1. Set up logging and configuration
/// 2. Discover candidate files
/// 3. Parse and write them with bounded concurrency
/// 4. Report summary statistics
pub async fn run_parse(args: ParseArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;
    info!("Starting NREL processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let mut config = load_configuration(args.config_file.as_deref())?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;
    debug!("Loaded configuration: {:?}", config);

    let registry = Arc::new(FileRegistry::new(&config.patterns)?);
    let files = discover_measurement_files(
        &args.inputs,
        config.processing.recursive,
        &config.processing.extensions,
    )?;
    info!("Discovered {} candidate files", files.len());

    let mut stats = if config.processing.dry_run {
        run_dry_run(&registry, &files)
    } else {
        config.ensure_output_directory()?;
        process_files(&config, registry, files.clone(), args.show_progress()).await?
    };

    stats.files_discovered = files.len();
    stats.processing_time = start_time.elapsed();

    generate_final_report(args.output_format, &stats)?;
    Ok(stats)
}

/// Recognise files without writing anything
fn run_dry_run(registry: &FileRegistry, files: &[PathBuf]) -> ProcessingStats {
    info!("Performing dry run - no files will be created");
    let mut stats = ProcessingStats::default();

    for path in files {
        match registry.identify_file(path) {
            Ok(Some(kind)) => {
                info!("Would process {} file: {}", kind.label(), path.display());
                stats.files_processed += 1;
            }
            Ok(None) => stats.files_skipped += 1,
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                stats.files_failed += 1;
            }
        }
    }

    stats
}

async fn process_files(
    config: &Config,
    registry: Arc<FileRegistry>,
    files: Vec<PathBuf>,
    show_progress: bool,
) -> Result<ProcessingStats> {
    let workers = config.performance.parallel_workers;
    info!(
        "Processing {} files with {} workers",
        files.len(),
        workers
    );

    let settings = Arc::new(OutputSettings::from_config(config));
    let progress_bar = show_progress
        .then(|| create_progress_bar(files.len() as u64, "Parsing measurement files..."));

    let results: Vec<(PathBuf, Result<FileOutcome>)> = stream::iter(files)
        .map(|path| {
            let registry = Arc::clone(&registry);
            let settings = Arc::clone(&settings);
            let pb = progress_bar.clone();
            async move {
                let worker_path = path.clone();
                let result = tokio::task::spawn_blocking(move || {
                    process_file(&registry, &worker_path, &settings)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(Error::processing_interrupted(format!(
                        "Worker for {} failed: {}",
                        path.display(),
                        e
                    )))
                });

                if let Some(pb) = &pb {
                    pb.set_message(base_name(&path));
                    pb.inc(1);
                }
                (path, result)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    if let Some(pb) = &progress_bar {
        pb.finish_with_message("Parsing complete");
    }

    let mut stats = ProcessingStats::default();
    for (path, result) in results {
        match result {
            Ok(FileOutcome::Processed {
                kind,
                curves,
                points,
                outputs,
            }) => {
                stats.files_processed += 1;
                match kind {
                    FileKind::JvCurve => stats.jv_curves += curves,
                    FileKind::Stability => stats.stability_segments += curves,
                }
                stats.points_extracted += points;
                stats.output_sizes.extend(outputs);
            }
            Ok(FileOutcome::Skipped) => {
                debug!("Skipped unrecognised file: {}", path.display());
                stats.files_skipped += 1;
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                if is_critical_error(&e) {
                    return Err(e);
                }
                stats.files_failed += 1;
            }
        }
    }

    stats.output_sizes.sort();
    Ok(stats)
}

/// Parse one file and write its outputs
fn process_file(registry: &FileRegistry, path: &Path, settings: &OutputSettings) -> Result<FileOutcome> {
    let parsed = match registry.parse_file(path) {
        Ok(parsed) => parsed,
        Err(Error::UnrecognisedFile { .. }) => return Ok(FileOutcome::Skipped),
        Err(e) => return Err(e),
    };

    let now = chrono::Local::now().naive_local();
    let built = build_entries(&parsed, now, fresh_lab_id());
    let mut outputs = Vec::new();

    let archive_path = settings.output_dir.join(&built.archive_file);
    let parquet_name = format!("{}.parquet", built.raw.metadata.entry_name);
    let parquet_path = settings.output_dir.join(&parquet_name);

    // Nothing is written unless every output can be
    if !settings.overwrite {
        let targets = std::iter::once(&archive_path)
            .chain(settings.write_parquet.then_some(&parquet_path));
        for target in targets {
            if target.exists() {
                return Err(Error::io(
                    format!("Output {} already exists", target.display()),
                    std::io::Error::from(std::io::ErrorKind::AlreadyExists),
                ));
            }
        }
    }

    let mut frame = settings
        .write_parquet
        .then(|| measurement_to_dataframe(&parsed.data))
        .transpose()?;

    write_archive(&built.processed, &archive_path, settings.overwrite)?;
    outputs.push((built.archive_file.clone(), file_size(&archive_path)));

    if let Some(df) = frame.as_mut() {
        write_parquet(df, &parquet_path, settings.compression)?;
        outputs.push((parquet_name, file_size(&parquet_path)));
    }

    let curves = match &parsed.data {
        MeasurementData::Jv(jv) => jv.curves.len(),
        MeasurementData::Stability(st) => st.curves.len(),
    };

    Ok(FileOutcome::Processed {
        kind: parsed.kind(),
        curves,
        points: parsed.point_count(),
        outputs,
    })
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn generate_final_report(format: OutputFormat, stats: &ProcessingStats) -> Result<()> {
    match format {
        OutputFormat::Human => generate_human_report(stats),
        OutputFormat::Json => generate_json_report(stats),
        OutputFormat::Csv => generate_csv_report(stats),
    }
}

fn generate_human_report(stats: &ProcessingStats) -> Result<()> {
    let duration = HumanDuration(stats.processing_time);
    let total_size = ProcessingStats::format_size(stats.total_output_size());

    println!("\n{}", "NREL Processing Complete".green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Files discovered: {}", stats.files_discovered);
    println!("   • Files processed: {}", stats.files_processed);
    println!("   • Files skipped: {}", stats.files_skipped);
    println!("   • JV curves: {}", stats.jv_curves);
    println!("   • Stability segments: {}", stats.stability_segments);
    println!("   • Points extracted: {}", stats.points_extracted);
    println!("   • Total output size: {}", total_size);
    println!("   • Processing time: {}", duration);

    if stats.files_failed > 0 {
        println!(
            "{}",
            format!("   Files failed: {}", stats.files_failed).yellow()
        );
    }

    if !stats.output_sizes.is_empty() {
        println!("\n{}", "Output Files:".bold());
        for (filename, size) in &stats.output_sizes {
            println!("   • {}: {}", filename, ProcessingStats::format_size(*size));
        }
    }

    println!();
    Ok(())
}

fn generate_json_report(stats: &ProcessingStats) -> Result<()> {
    let json_stats = serde_json::json!({
        "files_discovered": stats.files_discovered,
        "files_processed": stats.files_processed,
        "files_skipped": stats.files_skipped,
        "files_failed": stats.files_failed,
        "jv_curves": stats.jv_curves,
        "stability_segments": stats.stability_segments,
        "points_extracted": stats.points_extracted,
        "processing_time_seconds": stats.processing_time.as_secs_f64(),
        "total_output_size_bytes": stats.total_output_size(),
        "output_files": stats.output_sizes.iter().map(|(name, size)| {
            serde_json::json!({
                "filename": name,
                "size_bytes": size
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&json_stats)?);
    Ok(())
}

fn generate_csv_report(stats: &ProcessingStats) -> Result<()> {
    println!("metric,value");
    println!("files_discovered,{}", stats.files_discovered);
    println!("files_processed,{}", stats.files_processed);
    println!("files_skipped,{}", stats.files_skipped);
    println!("files_failed,{}", stats.files_failed);
    println!("jv_curves,{}", stats.jv_curves);
    println!("stability_segments,{}", stats.stability_segments);
    println!("points_extracted,{}", stats.points_extracted);
    println!(
        "processing_time_seconds,{}",
        stats.processing_time.as_secs_f64()
    );
    println!("total_output_size_bytes,{}", stats.total_output_size());
    Ok(())
}
