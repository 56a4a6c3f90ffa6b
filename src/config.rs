//! Configuration management and validation.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `NREL_PROCESSOR_*` environment variables, then CLI overrides applied
//! by the command layer.

use crate::app::services::parquet_writer::CompressionAlgorithm;
use crate::constants::{
    APP_CONFIG_DIR, CONFIG_FILE_NAME, DEFAULT_JV_CONTENTS_PATTERN, DEFAULT_JV_NAME_PATTERN,
    DEFAULT_OUTPUT_DIR, DEFAULT_PARALLEL_WORKERS, DEFAULT_STABILITY_CONTENTS_PATTERN, ENV_PREFIX,
    MAX_PARALLEL_WORKERS, MEASUREMENT_EXTENSIONS,
};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
    pub patterns: PatternConfig,
}

/// Input/output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Directory where archives and Parquet files are written
    pub output_path: PathBuf,

    /// Descend into subdirectories when an input is a directory
    pub recursive: bool,

    /// Write one Parquet file per measurement alongside the JSON archive
    pub write_parquet: bool,

    /// Report what would be processed without writing anything
    pub dry_run: bool,

    /// Overwrite existing output files
    pub force_overwrite: bool,

    /// File extensions considered during discovery
    pub extensions: Vec<String>,

    /// Parquet compression codec
    pub compression: CompressionAlgorithm,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_DIR),
            recursive: true,
            write_parquet: false,
            dry_run: false,
            force_overwrite: false,
            extensions: MEASUREMENT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            compression: CompressionAlgorithm::default(),
        }
    }
}

/// Concurrency settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Number of files processed concurrently
    pub parallel_workers: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_workers: num_cpus::get().clamp(1, DEFAULT_PARALLEL_WORKERS),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for the crate (error, warn, info, debug, trace)
    pub level: String,

    /// Timestamped (true) or compact (false) log lines
    pub structured: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            structured: true,
        }
    }
}

/// Mainfile recognition patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// File-name regex for JV mainfiles
    pub jv_name: String,

    /// Content regex for JV mainfiles
    pub jv_contents: String,

    /// Content regex for stability files
    pub stability_contents: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            jv_name: DEFAULT_JV_NAME_PATTERN.to_string(),
            jv_contents: DEFAULT_JV_CONTENTS_PATTERN.to_string(),
            stability_contents: DEFAULT_STABILITY_CONTENTS_PATTERN.to_string(),
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/nrel-processor/config.toml`)
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_CONFIG_DIR).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read config file {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Invalid config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load defaults, then the config file (if any), then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())?;
        debug!("Layered configuration: {:?}", config);

        Ok(config)
    }

    /// Apply overrides from a variable lookup (keys without the prefix)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("OUTPUT") {
            self.processing.output_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("WORKERS") {
            self.performance.parallel_workers = value.parse().map_err(|_| {
                Error::configuration(format!("{}WORKERS must be a number: {}", ENV_PREFIX, value))
            })?;
        }
        if let Some(value) = lookup("WRITE_PARQUET") {
            self.processing.write_parquet = parse_bool(&value)?;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = lookup("JV_NAME_PATTERN") {
            self.patterns.jv_name = value;
        }
        Ok(())
    }

    /// Validate settings for consistency
    pub fn validate(&self) -> Result<()> {
        if self.performance.parallel_workers == 0 {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if self.performance.parallel_workers > MAX_PARALLEL_WORKERS {
            return Err(Error::configuration(format!(
                "Number of workers cannot exceed {}",
                MAX_PARALLEL_WORKERS
            )));
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        for pattern in [
            &self.patterns.jv_name,
            &self.patterns.jv_contents,
            &self.patterns.stability_contents,
        ] {
            Regex::new(pattern).map_err(|e| Error::pattern(pattern.clone(), e.to_string()))?;
        }

        Ok(())
    }

    /// Create the output directory if it doesn't exist
    pub fn ensure_output_directory(&self) -> Result<()> {
        let output = &self.processing.output_path;
        if !output.exists() {
            std::fs::create_dir_all(output).map_err(|e| {
                Error::io(
                    format!("Failed to create output directory '{}'", output.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::configuration(format!("Invalid boolean '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.performance.parallel_workers >= 1);
        assert_eq!(config.patterns.jv_name, DEFAULT_JV_NAME_PATTERN);
    }

    #[test]
    fn test_from_file_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[processing]\nwrite_parquet = true\ncompression = \"zstd\"\n\n[performance]\nparallel_workers = 2"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(config.processing.write_parquet);
        assert_eq!(config.processing.compression, CompressionAlgorithm::Zstd);
        assert_eq!(config.performance.parallel_workers, 2);
        // Unspecified sections keep their defaults
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[processing\nbroken").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [("WORKERS", "3"), ("WRITE_PARQUET", "yes"), ("LOG_LEVEL", "debug")]
            .into_iter()
            .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.performance.parallel_workers, 3);
        assert!(config.processing.write_parquet);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_override_bad_number() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| (key == "WORKERS").then(|| "many".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config.patterns.jv_name = "(unclosed".to_string();
        assert!(matches!(config.validate(), Err(Error::Pattern { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.performance.parallel_workers = 0;
        assert!(config.validate().is_err());
    }
}
