//! Untyped raw table reading.
//!
//! Raw exports put title and metadata rows above the real header, so the file
//! is read without a header row and with flexible record lengths. Cells are
//! decoded lossily: a stray non-UTF-8 byte in a footnote must not sink a load.

use std::fs::File;
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

/// A headerless grid of trimmed string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Read a delimited file into a `RawTable`.
    pub fn read_csv(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }

    pub fn from_reader<R: std::io::Read>(reader: R, path: &Path) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (record, result) in reader.byte_records().enumerate() {
            let record = result.map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                record,
                source,
            })?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
                    .collect(),
            );
        }
        debug!(rows = rows.len(), "read raw table");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`, `None` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_ragged_rows_without_header() {
        let data = "Title only\n\nPeriod,Total Attendances\nAug-10,\"1,234\"\n";
        let table = RawTable::from_reader(data.as_bytes(), Path::new("mem.csv")).unwrap();
        assert_eq!(table.cell(0, 0), Some("Title only"));
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 1), Some("Total Attendances"));
        assert_eq!(table.cell(2, 1), Some("1,234"));
    }
}
