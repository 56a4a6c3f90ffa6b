//! File-name token conventions
//!
//! JV file names are `_`-delimited token lists. Tokens 3 to 6 name the
//! curve. For batch measurements, tokens 0 to 2 form the sample identifier
//! and the second-to-last token names the sub-measurement; sibling data files
//! share the sample prefix and the measurement suffix.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;

use crate::constants::{
    CURVE_NAME_TOKENS, FILE_NAME_TOKEN_SEPARATOR, MIN_BATCH_FILE_TOKENS, SAMPLE_ID_TOKENS,
};
use crate::{Error, Result};

/// Curve display name: tokens 3..7 joined with spaces
///
/// Token ranges past the end are clamped, so short names yield fewer (or no)
/// tokens rather than an error.
pub fn curve_name(file_name: &str) -> String {
    let tokens: Vec<&str> = file_name.split(FILE_NAME_TOKEN_SEPARATOR).collect();
    let (start, end) = CURVE_NAME_TOKENS;
    let end = end.min(tokens.len());
    let start = start.min(end);
    tokens[start..end].join(" ")
}

/// Base name of `path` up to its first `.`
pub fn search_id(path: &Path) -> String {
    let base = base_name(path);
    base.split('.').next().unwrap_or_default().to_string()
}

/// Final path component as a string
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Token breakdown of a batch measurement file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFileName {
    /// Tokens 0..3 joined with `_`
    pub sample_id: String,

    /// Token -2
    pub measurement: String,

    /// Last token, including the extension
    pub suffix: String,
}

impl BatchFileName {
    /// Split a file name into its batch tokens
    pub fn parse(file_name: &str) -> Result<Self> {
        let tokens: Vec<&str> = file_name.split(FILE_NAME_TOKEN_SEPARATOR).collect();
        if tokens.len() < MIN_BATCH_FILE_TOKENS {
            return Err(Error::file_name(
                file_name,
                format!(
                    "expected at least {} '{}'-separated tokens, found {}",
                    MIN_BATCH_FILE_TOKENS,
                    FILE_NAME_TOKEN_SEPARATOR,
                    tokens.len()
                ),
            ));
        }

        Ok(Self {
            sample_id: tokens[..SAMPLE_ID_TOKENS].join("_"),
            measurement: tokens[tokens.len() - 2].to_string(),
            suffix: tokens[tokens.len() - 1].to_string(),
        })
    }

    /// Glob pattern matching sibling files of the same sample and measurement
    pub fn sibling_pattern(&self) -> String {
        format!(
            "{}_*_{}_{}",
            Pattern::escape(&self.sample_id),
            Pattern::escape(&self.measurement),
            Pattern::escape(&self.suffix)
        )
    }

    /// Sibling data files in `dir`, sorted by path
    pub fn find_siblings(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&dir.to_string_lossy()),
            self.sibling_pattern()
        );

        let mut files: Vec<PathBuf> = glob::glob(&pattern)?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        debug!("Found {} sibling files for pattern {}", files.len(), pattern);
        Ok(files)
    }
}
