//! Tab-separated curve table reading
//!
//! The table keeps cells as raw strings so that only the columns actually
//! consumed are converted to numbers.

use crate::app::services::field_parsers::parse_cell;
use crate::{Error, Result};
use tracing::debug;

/// Raw tab-separated table with a label row
#[derive(Debug, Clone, Default)]
pub struct CurveTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CurveTable {
    /// Read a table from the given lines; the first non-blank line holds the labels
    pub fn read<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let content = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            if row.len() > headers.len() {
                let extra = &row[headers.len()..];
                if extra.iter().any(|cell| !cell.is_empty()) {
                    debug!(
                        "Row {} has {} cells for {} labels; ignoring {:?}",
                        index,
                        row.len(),
                        headers.len(),
                        extra
                    );
                }
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Column labels in file order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Drop columns whose cells are empty in every row
    ///
    /// Returns the labels of the dropped columns. A table without data rows
    /// keeps all of its columns.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        if self.rows.is_empty() {
            return Vec::new();
        }

        let keep: Vec<bool> = (0..self.headers.len())
            .map(|col| self.rows.iter().any(|row| !row[col].is_empty()))
            .collect();

        let dropped: Vec<String> = self
            .headers
            .iter()
            .zip(&keep)
            .filter(|(_, keep)| !**keep)
            .map(|(h, _)| h.clone())
            .collect();

        if !dropped.is_empty() {
            debug!("Dropping empty columns: {:?}", dropped);
            self.headers = retain_flagged(std::mem::take(&mut self.headers), &keep);
            self.rows = std::mem::take(&mut self.rows)
                .into_iter()
                .map(|row| retain_flagged(row, &keep))
                .collect();
        }

        dropped
    }

    /// Convert a named column to floats, reading empty cells as NaN
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::missing_column(name, &self.headers))?;

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| parse_cell(&row[index], &format!("column '{}' row {}", name, i)))
            .collect()
    }
}

fn retain_flagged(values: Vec<String>, keep: &[bool]) -> Vec<String> {
    values
        .into_iter()
        .zip(keep)
        .filter_map(|(value, keep)| keep.then_some(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [&str; 4] = [
        "Voltage\tCurrent\tComment\tPower",
        "0.0\t-20.0\t\t0.0",
        "0.5\t-10.0\t\t-5.0",
        "",
    ];

    #[test]
    fn test_read_pads_short_rows() {
        let table = CurveTable::read(["Voltage\tCurrent\tPower", "0.1\t-1.0"]).unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.numeric_column("Voltage").unwrap(), vec![0.1]);
        assert!(table.numeric_column("Power").unwrap()[0].is_nan());
    }

    #[test]
    fn test_drop_empty_columns() {
        let mut table = CurveTable::read(TABLE).unwrap();
        assert_eq!(table.row_count(), 2);

        let dropped = table.drop_empty_columns();
        assert_eq!(dropped, vec!["Comment".to_string()]);
        assert_eq!(table.headers(), ["Voltage", "Current", "Power"]);
        assert_eq!(table.numeric_column("Power").unwrap(), vec![0.0, -5.0]);
        assert!(matches!(
            table.numeric_column("Comment"),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_empty_voltage_column_is_missing() {
        let mut table =
            CurveTable::read(["Voltage\tCurrent", "\t-20.0", "\t-10.0"]).unwrap();

        assert_eq!(table.drop_empty_columns(), vec!["Voltage".to_string()]);
        assert!(matches!(
            table.numeric_column("Voltage"),
            Err(Error::MissingColumn { .. })
        ));
        assert_eq!(table.numeric_column("Current").unwrap(), vec![-20.0, -10.0]);
    }

    #[test]
    fn test_table_without_rows_keeps_columns() {
        let mut table = CurveTable::read(["Voltage\tCurrent\tComment"]).unwrap();

        assert_eq!(table.row_count(), 0);
        assert!(table.drop_empty_columns().is_empty());
        assert_eq!(table.headers(), ["Voltage", "Current", "Comment"]);
        assert!(table.numeric_column("Voltage").unwrap().is_empty());
    }

    #[test]
    fn test_wide_rows_are_cut_to_labels() {
        let table = CurveTable::read(["Voltage\tCurrent", "0.1\t-1.0\t99.0"]).unwrap();

        assert_eq!(table.headers().len(), 2);
        assert_eq!(table.numeric_column("Current").unwrap(), vec![-1.0]);
    }
}
