//! JV curve file extractor
//!
//! Parses a single-device current-voltage measurement file into a header block
//! of scalar metadata and a voltage/current-density curve. The file layout is
//! fixed:
//!
//! ```text
//! line 0-1    ignored
//! line 2-16   15 "label: value" header lines
//! line 17     ignored separator
//! line 18     tab-separated column labels (Voltage, Current, ...)
//! line 19-    tab-separated data rows
//! ```
//!
//! ## Architecture
//!
//! - [`parser`] - Extraction orchestration ([`extract_jv`])
//! - [`header`] - Fixed-position header block extraction
//! - [`table`] - Tab-separated curve table reading
//! - [`file_name`] - File-name token conventions (curve names, batch siblings)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nrel_processor::app::services::jv_parser::extract_jv;
//!
//! # fn example(text: &str) -> nrel_processor::Result<()> {
//! let result = extract_jv(text, "S1_B2_D3_CU_fwd_lt_lp1_01.txt")?;
//! println!("area={} intensity={}", result.active_area, result.intensity);
//! # Ok(())
//! # }
//! ```

pub mod file_name;
pub mod header;
pub mod parser;
pub mod table;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use file_name::{BatchFileName, curve_name, search_id};
pub use parser::extract_jv;
pub use table::CurveTable;
