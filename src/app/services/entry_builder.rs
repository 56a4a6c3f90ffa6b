//! Notebook entry construction
//!
//! Turns parsed measurement files into the entries a lab notebook stores: a
//! processed measurement entry, written as `<data_file>.archive.json`, and a
//! raw-file record pointing at it.

use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{
    CurveRecord, HeaderRecord, JvExtractionResult, StabilityExtractionResult, StabilitySegment,
};
use crate::app::schema::{EntityKind, EntryData};
use crate::app::services::file_registry::{MeasurementData, ParsedMeasurement};
use crate::app::services::jv_parser::file_name::{base_name, search_id};
use crate::constants::{ARCHIVE_FILE_SUFFIX, ENTRY_DATETIME_FORMAT};
use crate::{Error, Result};

/// Processed JV measurement entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JvMeasurementEntry {
    /// `"<search_id> JV"`
    pub name: String,
    pub lab_id: String,
    /// Base name of the source file
    pub data_file: String,
    /// Processing time, `%Y-%m-%d %H:%M:%S.%f`
    pub datetime: String,
    /// Sample the measurement refers to
    pub sample_id: String,
    /// Cell area (cm^2)
    pub active_area: f64,
    /// Illumination intensity (mW/cm^2)
    pub intensity: f64,
    pub header: HeaderRecord,
    pub jv_curve: Vec<CurveRecord>,
}

/// Processed stability measurement entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityEntry {
    /// `"<search_id> Stability"`
    pub name: String,
    pub lab_id: String,
    pub data_file: String,
    pub datetime: String,
    pub sample_id: String,
    pub header: HeaderRecord,
    pub segments: Vec<StabilitySegment>,
}

/// Any processed measurement entry, tagged with its section name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "m_def")]
pub enum MeasurementEntry {
    #[serde(rename = "NREL_JVmeasurement")]
    Jv(JvMeasurementEntry),
    #[serde(rename = "NREL_Measurement")]
    Stability(StabilityEntry),
}

/// Raw-file record referencing the processed archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileEntry {
    pub processed_archive: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub entry_name: String,
}

/// Entry data plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryArchive<T> {
    pub metadata: ArchiveMetadata,
    pub data: T,
}

/// Both archives produced for one measurement file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltEntries {
    /// Archive file name for the processed entry
    pub archive_file: String,
    pub raw: EntryArchive<RawFileEntry>,
    pub processed: EntryArchive<MeasurementEntry>,
}

impl EntryData for JvMeasurementEntry {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::JvMeasurement
    }

    fn entry_name(&self) -> &str {
        &self.name
    }
}

impl EntryData for StabilityEntry {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Measurement
    }

    fn entry_name(&self) -> &str {
        &self.name
    }
}

impl EntryData for MeasurementEntry {
    fn entity_kind(&self) -> EntityKind {
        match self {
            MeasurementEntry::Jv(entry) => entry.entity_kind(),
            MeasurementEntry::Stability(entry) => entry.entity_kind(),
        }
    }

    fn entry_name(&self) -> &str {
        match self {
            MeasurementEntry::Jv(entry) => entry.entry_name(),
            MeasurementEntry::Stability(entry) => entry.entry_name(),
        }
    }
}

/// `<data_file>.archive.json`
pub fn archive_file_name(data_file: &str) -> String {
    format!("{}{}", data_file, ARCHIVE_FILE_SUFFIX)
}

/// Entry timestamp in the notebook format
pub fn format_entry_datetime(now: NaiveDateTime) -> String {
    now.format(ENTRY_DATETIME_FORMAT).to_string()
}

/// Build the processed entry for a JV curve file
pub fn build_jv_entry(
    path: &Path,
    result: &JvExtractionResult,
    now: NaiveDateTime,
    lab_id: String,
) -> JvMeasurementEntry {
    let search_id = search_id(path);
    JvMeasurementEntry {
        name: format!("{} JV", search_id),
        lab_id,
        data_file: base_name(path),
        datetime: format_entry_datetime(now),
        sample_id: search_id,
        active_area: result.active_area,
        intensity: result.intensity,
        header: result.header.clone(),
        jv_curve: result.curves.clone(),
    }
}

/// Build the processed entry for a stability test file
pub fn build_stability_entry(
    path: &Path,
    result: &StabilityExtractionResult,
    now: NaiveDateTime,
    lab_id: String,
) -> StabilityEntry {
    let search_id = search_id(path);
    StabilityEntry {
        name: format!("{} Stability", search_id),
        lab_id,
        data_file: base_name(path),
        datetime: format_entry_datetime(now),
        sample_id: search_id,
        header: result.header.clone(),
        segments: result.curves.clone(),
    }
}

/// Build the processed entry and the raw-file record for a parsed file
pub fn build_entries(parsed: &ParsedMeasurement, now: NaiveDateTime, lab_id: String) -> BuiltEntries {
    let data_file = base_name(&parsed.path);
    let archive_file = archive_file_name(&data_file);

    let entry = match &parsed.data {
        MeasurementData::Jv(result) => {
            MeasurementEntry::Jv(build_jv_entry(&parsed.path, result, now, lab_id))
        }
        MeasurementData::Stability(result) => {
            MeasurementEntry::Stability(build_stability_entry(&parsed.path, result, now, lab_id))
        }
    };
    debug!("Built {} entry '{}'", entry.entity_kind().section_name(), entry.entry_name());

    BuiltEntries {
        raw: EntryArchive {
            metadata: ArchiveMetadata {
                entry_name: data_file,
            },
            data: RawFileEntry {
                processed_archive: archive_file.clone(),
            },
        },
        processed: EntryArchive {
            metadata: ArchiveMetadata {
                entry_name: entry.entry_name().to_string(),
            },
            data: entry,
        },
        archive_file,
    }
}

/// Write an archive as pretty JSON, refusing to replace an existing file
/// unless `overwrite` is set
pub fn write_archive<T: Serialize>(archive: &T, path: &Path, overwrite: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let file = options.open(path).map_err(|e| {
        let message = if e.kind() == ErrorKind::AlreadyExists {
            format!("Archive {} already exists", path.display())
        } else {
            format!("Failed to create archive {}", path.display())
        };
        Error::io(message, e)
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, archive)?;
    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to write archive {}", path.display()), e))?;

    debug!("Wrote archive {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 45, 123456)
            .unwrap()
    }

    fn jv_result() -> JvExtractionResult {
        let mut header = HeaderRecord::new();
        header.push("Cell Area (cm^2)", Some("0.13 cm2".to_string()));
        JvExtractionResult {
            active_area: 0.13,
            intensity: 100.0,
            header,
            curves: vec![CurveRecord::new("D3 CU fwd lt".to_string(), vec![0.0, 0.5], vec![-20.0, -10.0]).unwrap()],
        }
    }

    fn parsed_jv() -> ParsedMeasurement {
        ParsedMeasurement {
            path: PathBuf::from("/data/S1_B2_D3_CU_fwd_lt_lp1_01.txt"),
            data: MeasurementData::Jv(jv_result()),
        }
    }

    #[test]
    fn test_build_jv_entry_fields() {
        let path = Path::new("/data/S1_B2_D3_CU_fwd_lt_lp1_01.txt");
        let entry = build_jv_entry(path, &jv_result(), fixed_now(), "ABC123".to_string());

        assert_eq!(entry.name, "S1_B2_D3_CU_fwd_lt_lp1_01 JV");
        assert_eq!(entry.data_file, "S1_B2_D3_CU_fwd_lt_lp1_01.txt");
        assert_eq!(entry.sample_id, "S1_B2_D3_CU_fwd_lt_lp1_01");
        assert_eq!(entry.datetime, "2024-03-01 12:30:45.123456");
        assert_eq!(entry.jv_curve.len(), 1);
        assert_eq!(entry.entity_kind(), EntityKind::JvMeasurement);
    }

    #[test]
    fn test_search_id_stops_at_first_dot() {
        let path = Path::new("cell.run2.txt");
        let entry = build_jv_entry(path, &jv_result(), fixed_now(), String::new());
        assert_eq!(entry.name, "cell JV");
        assert_eq!(entry.data_file, "cell.run2.txt");
    }

    #[test]
    fn test_build_entries_links_raw_and_processed() {
        let built = build_entries(&parsed_jv(), fixed_now(), "ABC123".to_string());

        assert_eq!(built.archive_file, "S1_B2_D3_CU_fwd_lt_lp1_01.txt.archive.json");
        assert_eq!(built.raw.metadata.entry_name, "S1_B2_D3_CU_fwd_lt_lp1_01.txt");
        assert_eq!(built.raw.data.processed_archive, built.archive_file);
        assert_eq!(built.processed.metadata.entry_name, "S1_B2_D3_CU_fwd_lt_lp1_01 JV");
    }

    #[test]
    fn test_stability_entry() {
        let parsed = ParsedMeasurement {
            path: PathBuf::from("aging_run.txt"),
            data: MeasurementData::Stability(StabilityExtractionResult {
                header: HeaderRecord::new(),
                curves: Vec::new(),
            }),
        };
        let built = build_entries(&parsed, fixed_now(), "XYZ789".to_string());

        assert_eq!(built.processed.data.entry_name(), "aging_run Stability");
        assert_eq!(built.processed.data.entity_kind(), EntityKind::Measurement);
    }

    #[test]
    fn test_archive_json_is_tagged() {
        let built = build_entries(&parsed_jv(), fixed_now(), "ABC123".to_string());
        let json = serde_json::to_value(&built.processed).unwrap();

        assert_eq!(json["data"]["m_def"], "NREL_JVmeasurement");
        assert_eq!(json["data"]["intensity"], 100.0);
        assert_eq!(json["metadata"]["entry_name"], "S1_B2_D3_CU_fwd_lt_lp1_01 JV");
    }

    #[test]
    fn test_write_archive_respects_overwrite() {
        let dir = TempDir::new().unwrap();
        let built = build_entries(&parsed_jv(), fixed_now(), "ABC123".to_string());
        let path = dir.path().join(&built.archive_file);

        write_archive(&built.processed, &path, false).unwrap();
        assert!(write_archive(&built.processed, &path, false).is_err());
        write_archive(&built.processed, &path, true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: EntryArchive<MeasurementEntry> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, built.processed);
    }

    /// Test that archives with missing curve points can be read back
    ///
    /// Purpose: Empty table cells become NaN, which JSON stores as null
    /// Benefit: Every archive the parser writes stays loadable
    #[test]
    fn test_write_archive_with_missing_point() {
        let dir = TempDir::new().unwrap();
        let mut result = jv_result();
        result.curves = vec![
            CurveRecord::new(
                "D3 CU fwd lt".to_string(),
                vec![0.0, f64::NAN, 0.2],
                vec![-20.0, -19.0, -18.0],
            )
            .unwrap(),
        ];
        let parsed = ParsedMeasurement {
            path: PathBuf::from("/data/S1_B2_D3_CU_fwd_lt_lp1_01.txt"),
            data: MeasurementData::Jv(result),
        };
        let built = build_entries(&parsed, fixed_now(), "ABC123".to_string());
        let path = dir.path().join(&built.archive_file);

        write_archive(&built.processed, &path, false).unwrap();
        assert!(matches!(
            write_archive(&built.processed, &path, false),
            Err(Error::Io { .. })
        ));

        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(json["data"]["jv_curve"][0]["voltage"][1].is_null());

        let back: EntryArchive<MeasurementEntry> = serde_json::from_str(&text).unwrap();
        match back.data {
            MeasurementEntry::Jv(entry) => {
                let voltage = &entry.jv_curve[0].voltage;
                assert_eq!(voltage[0], 0.0);
                assert!(voltage[1].is_nan());
                assert_eq!(voltage[2], 0.2);
                assert_eq!(entry.jv_curve[0].current_density, vec![-20.0, -19.0, -18.0]);
            }
            other => panic!("expected JV entry, got {:?}", other),
        }
    }
}
