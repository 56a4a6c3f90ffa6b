//! Core stability extraction
//!
//! Locates the global header and test-header blocks with regular expressions
//! and hands each block's text to the segment parser. Segments keep document
//! order.

use regex::Regex;
use tracing::{debug, warn};

use super::segment::{parse_data_rows, parse_segment_header};
use crate::app::models::{HeaderRecord, StabilityExtractionResult, StabilitySegment};
use crate::app::services::field_parsers::normalize_encoding;
use crate::constants::{
    GLOBAL_HEADER_PREFIX_WIDTH, HEADER_END_MARKER, HEADER_START_MARKER, TEST_HEADER_END_MARKER,
    TEST_HEADER_START_MARKER,
};
use crate::{Error, Result};

/// Stability file parser holding the compiled marker expressions
#[derive(Debug, Clone)]
pub struct StabilityParser {
    global_header: Regex,
    test_header: Regex,
}

impl StabilityParser {
    /// Compile the marker expressions
    pub fn new() -> Result<Self> {
        // Marker lines may carry decoration (e.g. `// ****`) on either side.
        let global_header = Regex::new(&format!(
            r"(?ms){}[^\n]*\n(?P<body>.*?)^[^\n]*{}",
            regex::escape(HEADER_START_MARKER),
            regex::escape(HEADER_END_MARKER)
        ))?;

        let test_header = Regex::new(&format!(
            r"(?ms)^[^\n]*{}[^\n]*\n(?P<body>.*?)^[^\n]*{}[^\n]*$",
            regex::escape(TEST_HEADER_START_MARKER),
            regex::escape(TEST_HEADER_END_MARKER)
        ))?;

        Ok(Self {
            global_header,
            test_header,
        })
    }

    /// Extract the global header and all segments from raw file text
    pub fn extract(&self, text: &str) -> Result<StabilityExtractionResult> {
        let text = normalize_encoding(text);

        let header = self.parse_global_header(&text)?;
        debug!("Parsed global header with {} fields", header.len());

        let matches: Vec<_> = self.test_header.captures_iter(&text).collect();
        let mut curves = Vec::with_capacity(matches.len());

        for (index, captures) in matches.iter().enumerate() {
            let whole = captures.get(0).ok_or_else(|| Error::layout("empty segment match"))?;
            let body = captures.name("body").map_or("", |m| m.as_str());

            // Data rows run until the next test header or end of file
            let data_end = matches
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            let data = &text[whole.end()..data_end];

            curves.push(self.parse_segment(index, body, data)?);
        }

        if curves.is_empty() {
            warn!(
                "No '{}' segments found; returning an empty segment list",
                TEST_HEADER_START_MARKER
            );
        } else {
            debug!("Parsed {} stability segments", curves.len());
        }

        Ok(StabilityExtractionResult { header, curves })
    }

    /// Parse the global header block; its absence is a hard failure
    fn parse_global_header(&self, text: &str) -> Result<HeaderRecord> {
        let captures = self
            .global_header
            .captures(text)
            .ok_or_else(|| Error::missing_marker(HEADER_START_MARKER))?;
        let body = captures.name("body").map_or("", |m| m.as_str());

        Ok(HeaderRecord::from_lines(
            body.lines().filter(|line| !line.trim().is_empty()),
            GLOBAL_HEADER_PREFIX_WIDTH,
        ))
    }

    fn parse_segment(&self, index: usize, body: &str, data: &str) -> Result<StabilitySegment> {
        let (header, timestamp, light, pixel_size) = parse_segment_header(body)?;
        let [current, voltage, time] = parse_data_rows(data, index)?;

        debug!(
            "Segment {} at '{}': {} rows",
            index,
            timestamp,
            time.len()
        );

        Ok(StabilitySegment {
            header,
            timestamp,
            light,
            pixel_size,
            current,
            voltage,
            time,
        })
    }
}

/// Extract a stability file with a freshly compiled parser
pub fn extract_stability(text: &str) -> Result<StabilityExtractionResult> {
    StabilityParser::new()?.extract(text)
}
