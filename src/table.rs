use std::io::{Read, Write};
use std::path::Path;

use log::debug;

use crate::error::TableError;

/// A parsed tabular dataset: named columns of raw cell text, all the same
/// length. Numeric interpretation happens on demand so that columns such as
/// timestamps pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: Vec<(String, Vec<String>)>,
    rows: usize,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: Vec::new(), rows: 0 }
    }

    /// Provenance label, the file name for CSV input.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn push_column(&mut self, name: impl Into<String>, cells: Vec<String>) -> Result<(), TableError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.rows = cells.len();
        } else if cells.len() != self.rows {
            return Err(TableError::LengthMismatch { name, expected: self.rows, got: cells.len() });
        }
        self.columns.push((name, cells));
        Ok(())
    }

    pub fn push_numeric(&mut self, name: impl Into<String>, values: &[f64]) -> Result<(), TableError> {
        self.push_column(name, values.iter().map(|v| v.to_string()).collect())
    }

    pub fn with_column(mut self, name: impl Into<String>, cells: Vec<String>) -> Result<Self, TableError> {
        self.push_column(name, cells)?;
        Ok(self)
    }

    pub fn with_numeric(mut self, name: impl Into<String>, values: &[f64]) -> Result<Self, TableError> {
        self.push_numeric(name, values)?;
        Ok(self)
    }

    /// Cells of a column exactly as loaded.
    pub fn text(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Column parsed as floats; blank or unparseable cells become NaN.
    pub fn numeric(&self, name: &str) -> Option<Vec<f64>> {
        self.text(name).map(|cells| {
            cells
                .iter()
                .map(|c| c.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect()
        })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(name, file)
    }

    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (col, value) in cells.iter_mut().zip(record.iter()) {
                col.push(value.to_string());
            }
        }

        let mut table = Table::new(name);
        for (header, col) in headers.into_iter().zip(cells) {
            table.push_column(header, col)?;
        }
        debug!("Loaded table '{}': {} columns, {} rows", table.name, table.columns.len(), table.rows);
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(self.column_names())?;
        for row in 0..self.rows {
            writer.write_record(self.columns.iter().map(|(_, cells)| cells[row].as_str()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numeric_parsing_marks_bad_cells_nan() {
        let table = Table::new("t")
            .with_column("a", cells(&["1.5", " 2 ", "", "x"]))
            .unwrap();
        let a = table.numeric("a").unwrap();
        assert_eq!(&a[..2], &[1.5, 2.0]);
        assert!(a[2].is_nan() && a[3].is_nan());
        assert!(table.numeric("missing").is_none());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Table::new("t")
            .with_column("a", cells(&["1", "2"]))
            .unwrap()
            .with_column("b", cells(&["1"]))
            .unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new("t")
            .with_column("a", cells(&["1"]))
            .unwrap()
            .with_column("a", cells(&["2"]))
            .unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(_)));
    }

    #[test]
    fn test_csv_reader_keeps_text_cells() {
        let src = "Time,Z Fine Acceleration\n2024-01-01T00:00:00Z,0.25\n2024-01-01T00:00:01Z,-0.5\n";
        let table = Table::from_csv_reader("mem.csv", src.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.text("Time").unwrap()[1], "2024-01-01T00:00:01Z");
        assert_eq!(table.numeric("Z Fine Acceleration").unwrap(), vec![0.25, -0.5]);
    }

    #[test]
    fn test_ragged_csv_is_an_error() {
        let src = "a,b\n1,2\n3\n";
        assert!(Table::from_csv_reader("bad.csv", src.as_bytes()).is_err());
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_01.csv");
        let table = Table::new("src")
            .with_numeric("x", &[1.0, 2.5])
            .unwrap()
            .with_column("Time", cells(&["t0", "t1"]))
            .unwrap();
        table.write_csv(std::fs::File::create(&path).unwrap()).unwrap();

        let loaded = Table::from_csv_path(&path).unwrap();
        assert_eq!(loaded.name(), "run_01.csv");
        assert_eq!(loaded.numeric("x").unwrap(), vec![1.0, 2.5]);
        assert_eq!(loaded.text("Time").unwrap(), &cells(&["t0", "t1"])[..]);
    }
}
