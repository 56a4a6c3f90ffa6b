//! Core JV extraction
//!
//! Orchestrates encoding cleanup, header extraction, table reading and the
//! derivation of active area, intensity and curve name. Failures propagate
//! to the caller unchanged; nothing is retried or recovered here.

use tracing::debug;

use super::file_name::curve_name;
use super::header::{active_area, extract_header_block, intensity};
use super::table::CurveTable;
use crate::Result;
use crate::app::models::{CurveRecord, JvExtractionResult};
use crate::app::services::field_parsers::normalize_encoding;
use crate::constants::{JV_CURRENT_COLUMN, JV_TABLE_HEADER_LINE, JV_VOLTAGE_COLUMN};

/// Extract header scalars and the JV curve from raw file text
///
/// `file_name` is the base name of the source file; `_`-tokens 3 to 6 name
/// the curve.
pub fn extract_jv(text: &str, file_name: &str) -> Result<JvExtractionResult> {
    let text = normalize_encoding(text);
    let lines: Vec<&str> = text.lines().collect();

    let mut header = extract_header_block(&lines)?;
    let replaced = header.sanitize_non_finite();
    if replaced > 0 {
        debug!("{}: replaced {} missing/non-finite header values", file_name, replaced);
    }

    let mut table = CurveTable::read(lines.iter().skip(JV_TABLE_HEADER_LINE).copied())?;
    table.drop_empty_columns();

    let active_area = active_area(&header)?;
    let intensity = intensity(&header)?;

    let curve = CurveRecord::new(
        curve_name(file_name),
        table.numeric_column(JV_VOLTAGE_COLUMN)?,
        table.numeric_column(JV_CURRENT_COLUMN)?,
    )?;

    debug!(
        "{}: active_area={}, intensity={}, {} curve points",
        file_name,
        active_area,
        intensity,
        curve.len()
    );

    Ok(JvExtractionResult {
        active_area,
        intensity,
        header,
        curves: vec![curve],
    })
}
