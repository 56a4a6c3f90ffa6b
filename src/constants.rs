//! Application constants for NREL processor
//!
//! This module contains the fixed file-layout offsets, section markers,
//! file-name conventions and default values used throughout the processor.

// =============================================================================
// JV Curve File Layout
// =============================================================================

/// Lines ignored before the header block
pub const JV_HEADER_SKIP_LINES: usize = 2;

/// Number of `label: value` lines in the header block
pub const JV_HEADER_LINES: usize = 15;

/// Zero-based line index of the tab-separated column labels
///
/// Line 17 sits between the header block and the table and is ignored.
pub const JV_TABLE_HEADER_LINE: usize = 18;

/// Header row holding the cell area, formatted as `<number> <unit...>`
pub const JV_ACTIVE_AREA_ROW: usize = 7;

/// Header row holding the irradiance as a fraction of one sun
pub const JV_INTENSITY_ROW: usize = 1;

/// Factor converting the stored irradiance fraction to percent
pub const JV_INTENSITY_SCALE: f64 = 100.0;

/// Table column holding the voltage sweep
pub const JV_VOLTAGE_COLUMN: &str = "Voltage";

/// Table column holding the current density
pub const JV_CURRENT_COLUMN: &str = "Current";

/// Mis-encoded character sequences and their ASCII replacements, applied in order
pub const CHARACTER_REPLACEMENTS: &[(&str, &str)] = &[("Â²", "^2"), ("²", "^2")];

/// Separator between a header label and its value
pub const HEADER_SEPARATOR: &str = ": ";

/// Value substituted for missing or non-finite header fields
pub const HEADER_FILL_VALUE: &str = "0";

// =============================================================================
// File Name Conventions
// =============================================================================

/// Separator between file-name tokens
pub const FILE_NAME_TOKEN_SEPARATOR: char = '_';

/// Token range (start inclusive, end exclusive) naming a JV curve
pub const CURVE_NAME_TOKENS: (usize, usize) = (3, 7);

/// Number of leading tokens forming a batch sample identifier
pub const SAMPLE_ID_TOKENS: usize = 3;

/// Minimum token count for a batch measurement file name
pub const MIN_BATCH_FILE_TOKENS: usize = 5;

/// Suffix appended to a data file name for its processed archive
pub const ARCHIVE_FILE_SUFFIX: &str = ".archive.json";

// =============================================================================
// Stability File Markers
// =============================================================================

/// Opening marker of the global header block
pub const HEADER_START_MARKER: &str = "* HEADER START *";

/// Closing marker of the global header block
pub const HEADER_END_MARKER: &str = "* HEADER END *";

/// Opening marker of a per-timestamp test header
pub const TEST_HEADER_START_MARKER: &str = "* START TEST HEADER *";

/// Closing marker of a per-timestamp test header
pub const TEST_HEADER_END_MARKER: &str = "* END TEST HEADER ***";

/// Fixed-width prefix stripped from global header labels (e.g. `// `)
pub const GLOBAL_HEADER_PREFIX_WIDTH: usize = 3;

/// Fixed-width prefix stripped from test header labels (e.g. `//`)
pub const TEST_HEADER_PREFIX_WIDTH: usize = 2;

/// Required test header fields
pub mod stability_fields {
    pub const TIMESTAMP: &str = "Timestamp";
    pub const LIGHT: &str = "Light";
    pub const PIXEL_SIZE: &str = "PxSize";
}

/// Column names of a stability segment's time series, in file order
pub const STABILITY_COLUMNS: [&str; 3] = ["current", "voltage", "time"];

/// Timestamp formats tried when interpreting a segment timestamp
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

// =============================================================================
// Mainfile Matching
// =============================================================================

/// Default file-name pattern for JV mainfiles
pub const DEFAULT_JV_NAME_PATTERN: &str = r"^.*CU_.+_fwd_lt_lp1_.+\.txt$";

/// Default content pattern for JV mainfiles
pub const DEFAULT_JV_CONTENTS_PATTERN: &str = r"^// \*+ HEADER START \*+";

/// Default content pattern for stability files
pub const DEFAULT_STABILITY_CONTENTS_PATTERN: &str = r"\* START TEST HEADER \*";

/// Bytes of file content inspected when matching mainfiles
pub const CONTENT_SNIFF_BYTES: usize = 64 * 1024;

/// Extensions of candidate measurement files
pub const MEASUREMENT_EXTENSIONS: &[&str] = &["txt", "dat", "csv"];

// =============================================================================
// Entries and Lab Identifiers
// =============================================================================

/// Alphabet used for generated lab identifiers
pub const LAB_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default generated lab identifier length
pub const DEFAULT_LAB_ID_LENGTH: usize = 6;

/// Datetime format stored on measurement entries
pub const ENTRY_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default number of files processed concurrently
pub const DEFAULT_PARALLEL_WORKERS: usize = 4;

/// Maximum accepted worker count
pub const MAX_PARALLEL_WORKERS: usize = 64;

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "NREL_PROCESSOR_";

/// Application directory name under the user config directory
pub const APP_CONFIG_DIR: &str = "nrel-processor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";
