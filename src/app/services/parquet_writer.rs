//! Parquet export of extracted curves
//!
//! Curves are flattened to one row per sample point so the output can be
//! queried directly with polars or pandas.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::models::{JvExtractionResult, StabilityExtractionResult};
use crate::app::services::file_registry::MeasurementData;
use crate::{Error, Result};

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    Snappy,
    Zstd,
    Lz4,
    Uncompressed,
}

impl CompressionAlgorithm {
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

/// Flatten JV curves: `curve`, `point`, `voltage`, `current_density`
pub fn jv_to_dataframe(result: &JvExtractionResult) -> Result<DataFrame> {
    let rows: usize = result.curves.iter().map(|c| c.len()).sum();
    let mut curve = Vec::with_capacity(rows);
    let mut point = Vec::with_capacity(rows);
    let mut voltage = Vec::with_capacity(rows);
    let mut current_density = Vec::with_capacity(rows);

    for record in &result.curves {
        for i in 0..record.len() {
            curve.push(record.name.as_str());
            point.push(i as u32);
            voltage.push(record.voltage[i]);
            current_density.push(record.current_density[i]);
        }
    }

    let df = df! {
        "curve" => curve,
        "point" => point,
        "voltage" => voltage,
        "current_density" => current_density,
    }?;
    Ok(df)
}

/// Flatten stability segments: one row per point with the segment metadata
/// repeated (`segment`, `timestamp`, `light`, `pixel_size`, `current`,
/// `voltage`, `time`)
pub fn stability_to_dataframe(result: &StabilityExtractionResult) -> Result<DataFrame> {
    let rows: usize = result.curves.iter().map(|s| s.len()).sum();
    let mut segment = Vec::with_capacity(rows);
    let mut timestamp = Vec::with_capacity(rows);
    let mut light = Vec::with_capacity(rows);
    let mut pixel_size = Vec::with_capacity(rows);
    let mut current = Vec::with_capacity(rows);
    let mut voltage = Vec::with_capacity(rows);
    let mut time = Vec::with_capacity(rows);

    for (index, seg) in result.curves.iter().enumerate() {
        segment.extend(std::iter::repeat_n(index as u32, seg.len()));
        timestamp.extend(std::iter::repeat_n(seg.timestamp.as_str(), seg.len()));
        light.extend(std::iter::repeat_n(seg.light, seg.len()));
        pixel_size.extend(std::iter::repeat_n(seg.pixel_size, seg.len()));
        current.extend_from_slice(&seg.current);
        voltage.extend_from_slice(&seg.voltage);
        time.extend_from_slice(&seg.time);
    }

    let df = df! {
        "segment" => segment,
        "timestamp" => timestamp,
        "light" => light,
        "pixel_size" => pixel_size,
        "current" => current,
        "voltage" => voltage,
        "time" => time,
    }?;
    Ok(df)
}

/// DataFrame for any parsed measurement
pub fn measurement_to_dataframe(data: &MeasurementData) -> Result<DataFrame> {
    match data {
        MeasurementData::Jv(result) => jv_to_dataframe(result),
        MeasurementData::Stability(result) => stability_to_dataframe(result),
    }
}

/// Write a DataFrame to `path`; returns the number of rows written
pub fn write_parquet(
    df: &mut DataFrame,
    path: &Path,
    compression: CompressionAlgorithm,
) -> Result<usize> {
    let file = File::create(path)
        .map_err(|e| Error::io(format!("Failed to create {}", path.display()), e))?;

    ParquetWriter::new(file)
        .with_compression(compression.to_polars_compression())
        .with_statistics(StatisticsOptions::full())
        .finish(df)?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(df.height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{CurveRecord, HeaderRecord, StabilitySegment};
    use tempfile::TempDir;

    fn jv_result() -> JvExtractionResult {
        JvExtractionResult {
            active_area: 0.13,
            intensity: 100.0,
            header: HeaderRecord::new(),
            curves: vec![
                CurveRecord::new("D3 CU fwd lt".to_string(), vec![0.0, 0.5, 1.0], vec![-20.0, -10.0, 5.0])
                    .unwrap(),
            ],
        }
    }

    fn segment(timestamp: &str, n: usize) -> StabilitySegment {
        StabilitySegment {
            header: HeaderRecord::new(),
            timestamp: timestamp.to_string(),
            light: 1.0,
            pixel_size: 0.128,
            current: vec![0.1; n],
            voltage: vec![0.9; n],
            time: (0..n).map(|t| t as f64).collect(),
        }
    }

    #[test]
    fn test_jv_to_dataframe() {
        let df = jv_to_dataframe(&jv_result()).unwrap();

        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["curve", "point", "voltage", "current_density"]);
        assert_eq!(df.column("voltage").unwrap().f64().unwrap().get(1), Some(0.5));
        assert_eq!(
            df.column("curve").unwrap().str().unwrap().get(2),
            Some("D3 CU fwd lt")
        );
    }

    #[test]
    fn test_stability_to_dataframe_repeats_segment_metadata() {
        let result = StabilityExtractionResult {
            header: HeaderRecord::new(),
            curves: vec![segment("t0", 2), segment("t1", 3)],
        };
        let df = stability_to_dataframe(&result).unwrap();

        assert_eq!(df.height(), 5);
        let segments = df.column("segment").unwrap().u32().unwrap();
        assert_eq!(segments.get(1), Some(0));
        assert_eq!(segments.get(2), Some(1));
        assert_eq!(df.column("timestamp").unwrap().str().unwrap().get(4), Some("t1"));
    }

    #[test]
    fn test_empty_stability_result() {
        let result = StabilityExtractionResult {
            header: HeaderRecord::new(),
            curves: Vec::new(),
        };
        assert_eq!(stability_to_dataframe(&result).unwrap().height(), 0);
    }

    #[test]
    fn test_write_parquet_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curves.parquet");
        let mut df = jv_to_dataframe(&jv_result()).unwrap();

        let written = write_parquet(&mut df, &path, CompressionAlgorithm::Zstd).unwrap();
        assert_eq!(written, 3);

        let back = ParquetReader::new(File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(back.height(), 3);
        assert!(back.equals(&df));
    }
}
