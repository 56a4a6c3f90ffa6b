//! JV header block extraction
//!
//! Reads the fixed-position `label: value` lines of a JV curve file and
//! derives the scalar quantities the measurement entry needs.

use crate::app::models::HeaderRecord;
use crate::app::services::field_parsers::{parse_leading_number, parse_number};
use crate::constants::{
    JV_ACTIVE_AREA_ROW, JV_HEADER_LINES, JV_HEADER_SKIP_LINES, JV_INTENSITY_ROW,
    JV_INTENSITY_SCALE,
};
use crate::{Error, Result};

/// Extract the 15-line header block following the two ignored lines
///
/// Values are kept as raw strings; missing and non-finite values are not yet
/// replaced.
pub fn extract_header_block(lines: &[&str]) -> Result<HeaderRecord> {
    let end = JV_HEADER_SKIP_LINES + JV_HEADER_LINES;
    if lines.len() < end {
        return Err(Error::layout(format!(
            "expected at least {} lines for the header block, found {}",
            end,
            lines.len()
        )));
    }

    Ok(HeaderRecord::from_lines(
        lines[JV_HEADER_SKIP_LINES..end].iter().copied(),
        0,
    ))
}

/// Active area from the numeric prefix of header row 7
pub fn active_area(header: &HeaderRecord) -> Result<f64> {
    let value = header.value_at(JV_ACTIVE_AREA_ROW)?;
    parse_leading_number(value, "active area")
}

/// Intensity from header row 1, scaled by 100
pub fn intensity(header: &HeaderRecord) -> Result<f64> {
    let value = header.value_at(JV_INTENSITY_ROW)?;
    Ok(parse_number(value, "intensity")? * JV_INTENSITY_SCALE)
}
