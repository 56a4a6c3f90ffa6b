//! NREL Processor Library
//!
//! A Rust library for extracting structured records from the text files
//! produced by NREL solar-cell measurement stations.
//!
//! This library provides tools for:
//! - Parsing single-device JV (current-voltage) files into a header block and curve
//! - Parsing multi-segment stability (aging) test files into timestamped segments
//! - Recognising measurement files by name and content patterns
//! - Building host-facing measurement entries and serialising them as JSON archives
//! - Exporting extracted curves to Parquet via polars

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod schema;
    pub mod services {
        pub mod entry_builder;
        pub mod field_parsers;
        pub mod file_registry;
        pub mod jv_parser;
        pub mod parquet_writer;
        pub mod stability_parser;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    CurveRecord, HeaderRecord, JvExtractionResult, StabilityExtractionResult, StabilitySegment,
};
pub use app::services::jv_parser::extract_jv;
pub use app::services::stability_parser::extract_stability;
pub use config::Config;

/// Result type alias for the NREL processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for extraction, export and CLI operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File does not have the fixed line layout the extractor expects
    #[error("Layout error: {message}")]
    Layout { message: String },

    /// Required header field is absent
    #[error("Missing header field '{field}'")]
    MissingField { field: String },

    /// Required table column is absent
    #[error("Missing column '{column}' (available: {available})")]
    MissingColumn { column: String, available: String },

    /// Required section marker is absent
    #[error("Missing section marker '{marker}'")]
    MissingMarker { marker: String },

    /// A value could not be converted to a number
    #[error("Invalid number in {context}: '{value}'")]
    NumberFormat { context: String, value: String },

    /// File name does not follow the expected token convention
    #[error("Invalid file name '{file_name}': {message}")]
    FileName { file_name: String, message: String },

    /// Tab-separated table could not be read
    #[error("Table parsing error: {message}")]
    TableParsing {
        message: String,
        #[source]
        source: csv::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// JSON/TOML serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Parquet/DataFrame error
    #[error("Polars error: {message}")]
    Polars {
        message: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Invalid glob or regex pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// File did not match any known measurement format
    #[error("Unrecognised measurement file: {path}")]
    UnrecognisedFile { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a layout error
    pub fn layout(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }

    /// Create a missing header field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::MissingColumn {
            column: column.into(),
            available: available.join(", "),
        }
    }

    /// Create a missing marker error
    pub fn missing_marker(marker: impl Into<String>) -> Self {
        Self::MissingMarker {
            marker: marker.into(),
        }
    }

    /// Create a number conversion error
    pub fn number_format(context: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NumberFormat {
            context: context.into(),
            value: value.into(),
        }
    }

    /// Create a file name convention error
    pub fn file_name(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileName {
            file_name: file_name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an unrecognised file error
    pub fn unrecognised_file(path: impl Into<String>) -> Self {
        Self::UnrecognisedFile { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::TableParsing {
            message: "Tab-separated table parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(error: polars::error::PolarsError) -> Self {
        Self::Polars {
            message: "DataFrame operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<glob::PatternError> for Error {
    fn from(error: glob::PatternError) -> Self {
        Self::Pattern {
            pattern: "glob".to_string(),
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for Error {
    fn from(error: regex::Error) -> Self {
        Self::Pattern {
            pattern: "regex".to_string(),
            message: error.to_string(),
        }
    }
}
