//! Inspect command implementation
//!
//! Parses one file and prints what was extracted without writing anything.

use super::shared::{ProcessingStats, load_configuration, setup_logging};
use crate::app::models::HeaderRecord;
use crate::app::schema::{EntryData, fresh_lab_id};
use crate::app::services::entry_builder::{BuiltEntries, build_entries};
use crate::app::services::file_registry::{FileRegistry, MeasurementData, ParsedMeasurement};
use crate::app::services::parquet_writer::measurement_to_dataframe;
use crate::cli::args::{InspectArgs, OutputFormat};
use crate::Result;
use colored::*;
use polars::prelude::{CsvWriter, SerWriter};
use std::time::Instant;
use tracing::{debug, info};

pub async fn run_inspect(args: InspectArgs) -> Result<ProcessingStats> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), false)?;
    args.validate()?;

    let config = load_configuration(args.config_file.as_deref())?;
    config.validate()?;

    let registry = FileRegistry::new(&config.patterns)?;
    let parsed = registry.parse_file(&args.file)?;
    let built = build_entries(&parsed, chrono::Local::now().naive_local(), fresh_lab_id());
    debug!("Inspecting {}", args.file.display());

    match args.output_format {
        OutputFormat::Human => print_human(&parsed, &built, args.show_header),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&built)?),
        OutputFormat::Csv => {
            let mut df = measurement_to_dataframe(&parsed.data)?;
            CsvWriter::new(std::io::stdout())
                .include_header(true)
                .finish(&mut df)?;
        }
    }

    info!("Inspected {} ({} points)", args.file.display(), parsed.point_count());

    let (jv_curves, stability_segments) = match &parsed.data {
        MeasurementData::Jv(jv) => (jv.curves.len(), 0),
        MeasurementData::Stability(st) => (0, st.curves.len()),
    };

    Ok(ProcessingStats {
        files_discovered: 1,
        files_processed: 1,
        jv_curves,
        stability_segments,
        points_extracted: parsed.point_count(),
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

fn print_human(parsed: &ParsedMeasurement, built: &BuiltEntries, show_header: bool) {
    let entry = &built.processed.data;

    println!("{}", entry.entry_name().bold());
    println!("   • Section: {}", entry.entity_kind().section_name());
    println!("   • Source: {}", parsed.path.display());
    println!("   • Archive: {}", built.archive_file);

    match &parsed.data {
        MeasurementData::Jv(jv) => {
            println!("   • Active area: {} cm^2", jv.active_area);
            println!("   • Intensity: {} mW/cm^2", jv.intensity);
            for curve in &jv.curves {
                println!(
                    "   • Curve '{}': {} points, V {}",
                    curve.name.cyan(),
                    curve.len(),
                    value_range(&curve.voltage)
                );
            }
            if show_header {
                print_header(&jv.header);
            }
        }
        MeasurementData::Stability(st) => {
            println!("   • Segments: {}", st.curves.len());
            for (index, segment) in st.curves.iter().enumerate() {
                println!(
                    "   • [{}] {} light={} px={}: {} points, t {}",
                    index,
                    segment.timestamp.cyan(),
                    segment.light,
                    segment.pixel_size,
                    segment.len(),
                    value_range(&segment.time)
                );
            }
            if show_header {
                print_header(&st.header);
            }
        }
    }
}

fn print_header(header: &HeaderRecord) {
    println!("\n{}", "Header:".bold());
    for (label, value) in header.iter() {
        println!("   {}: {}", label, value.unwrap_or("-"));
    }
}

/// `min..max` over the finite values, or `-` when there are none
fn value_range(values: &[f64]) -> String {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        "-".to_string()
    } else {
        format!("{}..{}", min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[0.5, -0.1, f64::NAN, 1.1]), "-0.1..1.1");
        assert_eq!(value_range(&[]), "-");
        assert_eq!(value_range(&[f64::NAN]), "-");
    }
}
