//! Data models for NREL measurement extraction
//!
//! This module contains the records produced by the JV and stability extractors.
//! All of them are plain owned values: built once per parser invocation,
//! handed to the caller, and discarded after conversion into entries.

use crate::constants::{HEADER_FILL_VALUE, HEADER_SEPARATOR, TIMESTAMP_FORMATS};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Header Records
// =============================================================================

/// A single `label: value` header line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderField {
    /// Exact text before the first `": "` (after any fixed-width prefix is stripped)
    pub label: String,

    /// Raw text after the first `": "`, `None` when the line has no separator
    pub value: Option<String>,
}

/// Ordered mapping of header label to raw string value
///
/// Labels keep file order and may repeat; lookups by label return the first
/// occurrence. No type coercion happens here beyond [`HeaderRecord::sanitize_non_finite`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    fields: Vec<HeaderField>,
}

impl HeaderRecord {
    /// Create an empty header record
    pub fn new() -> Self {
        Self::default()
    }

    /// Split one header line on the first `": "`, dropping `prefix_width`
    /// leading characters from the label
    pub fn parse_line(line: &str, prefix_width: usize) -> HeaderField {
        let line = line.trim_end_matches(['\r', '\n']);
        let (label, value) = match line.split_once(HEADER_SEPARATOR) {
            Some((label, value)) => (label, Some(value.to_string())),
            None => (line, None),
        };

        HeaderField {
            label: label.chars().skip(prefix_width).collect(),
            value,
        }
    }

    /// Build a record from header lines, one field per line
    pub fn from_lines<'a, I>(lines: I, prefix_width: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            fields: lines
                .into_iter()
                .map(|line| Self::parse_line(line, prefix_width))
                .collect(),
        }
    }

    /// Append a field
    pub fn push(&mut self, label: impl Into<String>, value: Option<String>) {
        self.fields.push(HeaderField {
            label: label.into(),
            value,
        });
    }

    /// Number of header fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(label, value)` pairs in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_deref()))
    }

    /// Value of the first field with the given label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .and_then(|f| f.value.as_deref())
    }

    /// Value of a required field; absence is a lookup error
    pub fn require(&self, label: &str) -> Result<&str> {
        self.get(label).ok_or_else(|| Error::missing_field(label))
    }

    /// Value at a fixed header row position
    pub fn value_at(&self, index: usize) -> Result<&str> {
        let field = self.fields.get(index).ok_or_else(|| {
            Error::layout(format!(
                "header row {} requested but only {} rows present",
                index,
                self.fields.len()
            ))
        })?;

        field
            .value
            .as_deref()
            .ok_or_else(|| Error::missing_field(field.label.clone()))
    }

    /// Replace missing values and values reading as `inf`/`nan` with `0`
    ///
    /// Returns the number of fields replaced.
    pub fn sanitize_non_finite(&mut self) -> usize {
        let mut replaced = 0;
        for field in &mut self.fields {
            let non_finite = match field.value.as_deref() {
                None => true,
                Some(value) => value
                    .trim()
                    .parse::<f64>()
                    .map(|v| !v.is_finite())
                    .unwrap_or(false),
            };

            if non_finite {
                field.value = Some(HEADER_FILL_VALUE.to_string());
                replaced += 1;
            }
        }
        replaced
    }

    /// Re-serialise as `label: value` lines
    ///
    /// Parsing the output with [`HeaderRecord::from_lines`] and a prefix width
    /// of zero reproduces the same pairs.
    pub fn to_text(&self) -> String {
        self.fields
            .iter()
            .map(|f| match &f.value {
                Some(value) => format!("{}{}{}", f.label, HEADER_SEPARATOR, value),
                None => f.label.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// JV Extraction Results
// =============================================================================

/// A named current-density vs. voltage curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRecord {
    /// Display name derived from the source file name
    pub name: String,

    /// Applied voltage (V)
    #[serde(with = "nan_as_null")]
    pub voltage: Vec<f64>,

    /// Measured current density, same length as `voltage`
    #[serde(with = "nan_as_null")]
    pub current_density: Vec<f64>,
}

impl CurveRecord {
    /// Create a curve, rejecting sequences of unequal length
    pub fn new(name: String, voltage: Vec<f64>, current_density: Vec<f64>) -> Result<Self> {
        if voltage.len() != current_density.len() {
            return Err(Error::layout(format!(
                "curve '{}' has {} voltage points but {} current points",
                name,
                voltage.len(),
                current_density.len()
            )));
        }

        Ok(Self {
            name,
            voltage,
            current_density,
        })
    }

    /// Number of sample points
    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    /// Whether the curve has no points
    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }
}

/// Result of extracting a JV curve file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JvExtractionResult {
    /// Illuminated device area, in the unit stated by the header
    pub active_area: f64,

    /// Irradiance header value scaled by 100
    pub intensity: f64,

    /// Sanitised header block
    pub header: HeaderRecord,

    /// Extracted curves (one per file)
    pub curves: Vec<CurveRecord>,
}

// =============================================================================
// Stability Extraction Results
// =============================================================================

/// One timestamped block of a stability test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilitySegment {
    /// The segment's own header lines
    pub header: HeaderRecord,

    /// Raw `Timestamp` header value
    pub timestamp: String,

    /// Numeric `Light` header value
    pub light: f64,

    /// Numeric `PxSize` header value
    pub pixel_size: f64,

    /// First data column
    #[serde(with = "nan_as_null")]
    pub current: Vec<f64>,

    /// Second data column
    #[serde(with = "nan_as_null")]
    pub voltage: Vec<f64>,

    /// Third data column
    #[serde(with = "nan_as_null")]
    pub time: Vec<f64>,
}

impl StabilitySegment {
    /// Interpret the timestamp using the known instrument formats
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the segment has no data rows
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Result of extracting a stability test file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityExtractionResult {
    /// Global header block
    pub header: HeaderRecord,

    /// Segments in document order
    pub curves: Vec<StabilitySegment>,
}

/// Sample vectors with missing points
///
/// Empty table cells are read as NaN, which JSON cannot represent; they are
/// written as `null` and read back as NaN.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(|v| (!v.is_nan()).then_some(*v)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
