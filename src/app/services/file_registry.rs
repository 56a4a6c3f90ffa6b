//! Measurement file recognition and dispatch
//!
//! Decides which extractor handles a file from its name and the start of its
//! content, reads the text and runs the extractor. Every file is handled
//! independently; a failure affects that file only.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::app::models::{JvExtractionResult, StabilityExtractionResult};
use crate::app::services::field_parsers::decode_text;
use crate::app::services::jv_parser::{extract_jv, file_name::base_name};
use crate::app::services::stability_parser::StabilityParser;
use crate::config::PatternConfig;
use crate::constants::CONTENT_SNIFF_BYTES;
use crate::{Error, Result};

/// Kinds of measurement file the processor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FileKind {
    /// Single-device current-voltage sweep
    JvCurve,
    /// Multi-segment aging test
    Stability,
}

impl FileKind {
    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::JvCurve => "JV",
            FileKind::Stability => "Stability",
        }
    }
}

/// Extracted content of one measurement file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MeasurementData {
    Jv(JvExtractionResult),
    Stability(StabilityExtractionResult),
}

/// A parsed measurement file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedMeasurement {
    /// Source file
    pub path: PathBuf,

    /// Extracted records
    pub data: MeasurementData,
}

impl ParsedMeasurement {
    /// Kind of the source file
    pub fn kind(&self) -> FileKind {
        match self.data {
            MeasurementData::Jv(_) => FileKind::JvCurve,
            MeasurementData::Stability(_) => FileKind::Stability,
        }
    }

    /// Total number of sample points across curves or segments
    pub fn point_count(&self) -> usize {
        match &self.data {
            MeasurementData::Jv(jv) => jv.curves.iter().map(|c| c.len()).sum(),
            MeasurementData::Stability(st) => st.curves.iter().map(|s| s.len()).sum(),
        }
    }
}

/// Registry of compiled recognition patterns and extractors
#[derive(Debug, Clone)]
pub struct FileRegistry {
    jv_name: Regex,
    jv_contents: Regex,
    stability_contents: Regex,
    stability: StabilityParser,
}

impl FileRegistry {
    /// Compile the configured patterns
    pub fn new(patterns: &PatternConfig) -> Result<Self> {
        Ok(Self {
            jv_name: compile(&patterns.jv_name)?,
            jv_contents: compile(&patterns.jv_contents)?,
            stability_contents: compile(&patterns.stability_contents)?,
            stability: StabilityParser::new()?,
        })
    }

    /// Registry with the built-in patterns
    pub fn with_defaults() -> Result<Self> {
        Self::new(&PatternConfig::default())
    }

    /// Identify a file from its base name and (the start of) its content
    ///
    /// Stability markers take precedence; JV files must match both the name
    /// and the content pattern.
    pub fn detect(&self, file_name: &str, contents: &str) -> Option<FileKind> {
        let head = sniff(contents);

        if self.stability_contents.is_match(head) {
            Some(FileKind::Stability)
        } else if self.jv_name.is_match(file_name) && self.jv_contents.is_match(head) {
            Some(FileKind::JvCurve)
        } else {
            None
        }
    }

    /// Run the extractor for `kind` on already-read text
    pub fn parse_text(&self, kind: FileKind, file_name: &str, text: &str) -> Result<MeasurementData> {
        match kind {
            FileKind::JvCurve => extract_jv(text, file_name).map(MeasurementData::Jv),
            FileKind::Stability => self.stability.extract(text).map(MeasurementData::Stability),
        }
    }

    /// Recognise a file without parsing it
    pub fn identify_file(&self, path: &Path) -> Result<Option<FileKind>> {
        let text = read_text(path)?;
        Ok(self.detect(&base_name(path), &text))
    }

    /// Read, recognise and parse a measurement file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedMeasurement> {
        let text = read_text(path)?;
        let file_name = base_name(path);

        let kind = self
            .detect(&file_name, &text)
            .ok_or_else(|| Error::unrecognised_file(path.display().to_string()))?;
        debug!("{}: recognised as {} file", path.display(), kind.label());

        let data = self.parse_text(kind, &file_name, &text)?;
        let parsed = ParsedMeasurement {
            path: path.to_path_buf(),
            data,
        };

        info!(
            "Parsed {} file {} ({} points)",
            kind.label(),
            path.display(),
            parsed.point_count()
        );
        Ok(parsed)
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::io(format!("Failed to read file {}", path.display()), e))?;
    Ok(decode_text(&bytes))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::pattern(pattern, e.to_string()))
}

/// Leading slice of the content used for recognition, cut on a char boundary
fn sniff(contents: &str) -> &str {
    if contents.len() <= CONTENT_SNIFF_BYTES {
        return contents;
    }
    let mut end = CONTENT_SNIFF_BYTES;
    while !contents.is_char_boundary(end) {
        end -= 1;
    }
    &contents[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const JV_NAME: &str = "S1_B2_D3_CU_px1_fwd_lt_lp1_01.txt";

    fn jv_text() -> String {
        let mut lines = vec![
            "// ************** HEADER START ***************".to_string(),
            "// export".to_string(),
        ];
        for i in 0..15 {
            lines.push(match i {
                1 => "Irradiance (100.0 mW/cm2): 1.00".to_string(),
                7 => "Cell Area (cm2): 0.13 cm2".to_string(),
                _ => format!("Field {}: {}", i, i),
            });
        }
        lines.push("// ************** HEADER END *****************".to_string());
        lines.push("Voltage\tCurrent".to_string());
        lines.push("0.0\t-20.0".to_string());
        lines.push("0.5\t-10.0".to_string());
        lines.join("\n")
    }

    fn stability_text() -> String {
        "// ***** HEADER START *****\n// Device: X\n// ***** HEADER END *****\n\
         //** START TEST HEADER **\n//Timestamp: t0\n//Light: 1\n//PxSize: 0.1\n//Temp: 25\n\
         //** END TEST HEADER ***\n1\t2\t3\n"
            .to_string()
    }

    #[test]
    fn test_detect_jv_requires_name_and_content() {
        let registry = FileRegistry::with_defaults().unwrap();

        assert_eq!(registry.detect(JV_NAME, &jv_text()), Some(FileKind::JvCurve));
        assert_eq!(registry.detect("notes.txt", &jv_text()), None);
        assert_eq!(registry.detect(JV_NAME, "plain text"), None);
    }

    #[test]
    fn test_detect_stability_by_markers() {
        let registry = FileRegistry::with_defaults().unwrap();
        assert_eq!(
            registry.detect("aging_run.txt", &stability_text()),
            Some(FileKind::Stability)
        );
    }

    #[test]
    fn test_parse_file_dispatches() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_defaults().unwrap();

        let jv_path = dir.path().join(JV_NAME);
        std::fs::write(&jv_path, jv_text()).unwrap();
        let parsed = registry.parse_file(&jv_path).unwrap();
        assert_eq!(parsed.kind(), FileKind::JvCurve);
        assert_eq!(parsed.point_count(), 2);

        let st_path = dir.path().join("aging_run.txt");
        std::fs::write(&st_path, stability_text()).unwrap();
        let parsed = registry.parse_file(&st_path).unwrap();
        assert_eq!(parsed.kind(), FileKind::Stability);
        assert_eq!(parsed.point_count(), 1);
    }

    #[test]
    fn test_parse_latin1_file() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_defaults().unwrap();

        let text = jv_text().replace("Cell Area (cm2)", "Cell Area (cm\u{b2})");
        let bytes: Vec<u8> = text.chars().map(|c| c as u32 as u8).collect();
        let path = dir.path().join(JV_NAME);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&bytes)
            .unwrap();

        let parsed = registry.parse_file(&path).unwrap();
        match parsed.data {
            MeasurementData::Jv(jv) => {
                assert_eq!(jv.active_area, 0.13);
                assert_eq!(jv.header.get("Cell Area (cm^2)"), Some("0.13 cm2"));
            }
            other => panic!("expected JV data, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognised_file() {
        let dir = TempDir::new().unwrap();
        let registry = FileRegistry::with_defaults().unwrap();
        let path = dir.path().join("readme.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(matches!(
            registry.parse_file(&path),
            Err(Error::UnrecognisedFile { .. })
        ));
        assert_eq!(registry.identify_file(&path).unwrap(), None);
    }

    #[test]
    fn test_sniff_respects_char_boundary() {
        let text = "é".repeat(CONTENT_SNIFF_BYTES);
        let head = sniff(&text);
        assert!(head.len() <= CONTENT_SNIFF_BYTES);
        assert!(text.is_char_boundary(head.len()));
    }
}
