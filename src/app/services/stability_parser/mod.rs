//! Stability test file extractor
//!
//! Parses a multi-segment aging-test file: one global header block delimited
//! by `* HEADER START *` / `* HEADER END *`, followed by repeated segments
//! each opened by `* START TEST HEADER *`, closed by `* END TEST HEADER ***`
//! and followed by tab-separated `current`, `voltage`, `time` rows.
//!
//! - [`parser`] - Marker location and segment extraction
//! - [`segment`] - Per-segment header and data-row parsing

pub mod parser;
pub mod segment;


pub use parser::{StabilityParser, extract_stability};
