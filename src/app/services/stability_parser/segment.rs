//! Stability segment parsing
//!
//! A segment is the mini-header between the test-header markers plus the
//! three-column time series that follows it.

use tracing::debug;

use crate::app::models::HeaderRecord;
use crate::app::services::field_parsers::{parse_leading_number, parse_number};
use crate::constants::{STABILITY_COLUMNS, TEST_HEADER_PREFIX_WIDTH, stability_fields};
use crate::{Error, Result};

/// Parse a segment's header lines and its required scalar fields
///
/// Returns the header together with `Timestamp`, `Light` and `PxSize`.
pub fn parse_segment_header(body: &str) -> Result<(HeaderRecord, String, f64, f64)> {
    let header = HeaderRecord::from_lines(
        body.lines().filter(|line| !line.trim().is_empty()),
        TEST_HEADER_PREFIX_WIDTH,
    );

    let timestamp = header.require(stability_fields::TIMESTAMP)?.trim().to_string();
    let light = parse_leading_number(
        header.require(stability_fields::LIGHT)?,
        stability_fields::LIGHT,
    )?;
    let pixel_size = parse_leading_number(
        header.require(stability_fields::PIXEL_SIZE)?,
        stability_fields::PIXEL_SIZE,
    )?;

    Ok((header, timestamp, light, pixel_size))
}

/// Parse the tab-separated rows following a segment header
///
/// Returns the `current`, `voltage` and `time` columns. Lines before the first
/// numeric row (column labels) are skipped. Once data has started, every
/// non-blank line up to the end of the region must be a numeric row: a line
/// with a different field count is a layout error and a non-numeric value is a
/// number format error.
pub fn parse_data_rows(data: &str, segment: usize) -> Result<[Vec<f64>; 3]> {
    let mut columns: [Vec<f64>; 3] = Default::default();
    let mut started = false;

    for (line_index, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if fields.len() != STABILITY_COLUMNS.len() {
            if started {
                return Err(Error::layout(format!(
                    "segment {} row {} has {} fields, expected {}",
                    segment,
                    line_index,
                    fields.len(),
                    STABILITY_COLUMNS.len()
                )));
            }
            continue;
        }

        let parsed: Result<Vec<f64>> = fields
            .iter()
            .zip(STABILITY_COLUMNS)
            .map(|(value, column)| {
                parse_number(value, &format!("segment {} {} row {}", segment, column, line_index))
            })
            .collect();

        match parsed {
            Ok(values) => {
                started = true;
                for (column, value) in columns.iter_mut().zip(values) {
                    column.push(value);
                }
            }
            Err(e) if started => return Err(e),
            Err(_) => {
                debug!("Segment {}: skipping label line '{}'", segment, line.trim());
            }
        }
    }

    Ok(columns)
}

/// Split a row on tabs, ignoring trailing empty fields
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}
