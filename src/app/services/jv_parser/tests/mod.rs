//! Test utilities for JV extractor testing
//!
//! Provides builders for JV file content used across the test modules.

use std::io::Write;
use tempfile::NamedTempFile;


/// Header lines in the station's standard order (rows 0-14 of the block)
pub const STANDARD_HEADER: [&str; 15] = [
    "Cell Name: S1_B2_D3",
    "Irradiance (100.0 mW/cm2): 1.00",
    "Voc (V): 1.08",
    "Jsc (mA/cm2): 22.4",
    "Fill Factor (%): 78.1",
    "Efficiency (%): 18.9",
    "Sweep Direction: fwd",
    "Cell Area (cm2): 0.13 cm2",
    "Integration Time (s): 0.02",
    "Settling Time (s): 0.05",
    "Averaging: 3",
    "Compliance (A): 0.1",
    "Rs (Ohm cm2): inf",
    "Rsh (Ohm cm2): nan",
    "Temperature (C): 25.0",
];

/// Build JV file content from header lines and a tab-separated table
pub fn build_jv_file(header: &[&str], table: &[&str]) -> String {
    let mut lines = vec![
        "// ************** HEADER START ***************".to_string(),
        "// NREL JV station export".to_string(),
    ];
    lines.extend(header.iter().map(|l| l.to_string()));
    lines.push("// ************** HEADER END *****************".to_string());
    lines.extend(table.iter().map(|l| l.to_string()));
    lines.join("\n")
}

/// Standard JV file with three sweep points and an empty trailing column
pub fn create_test_jv_file() -> String {
    build_jv_file(
        &STANDARD_HEADER,
        &[
            "Voltage\tCurrent\tPower\tComment",
            "-0.1\t-22.5\t2.25\t",
            "0.5\t-21.0\t-10.5\t",
            "1.1\t3.2\t3.52\t",
        ],
    )
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file
}
