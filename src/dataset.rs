//! Row store: the equipment table as loaded, immutable afterwards.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use color_eyre::eyre::{eyre, Result};
use csv::{ReaderBuilder, Trim};

use crate::OpenOptions;

/// One record of the table. Cells are kept as the strings the CSV
/// parser produced; reads past the end of a short record are "".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, col: usize) -> &str {
        self.cells.get(col).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The loaded table: header names plus records in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn from_path(path: &Path, options: &OpenOptions) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| eyre!("Failed to open {}: {e}", path.display()))?;
        Self::from_reader(file, options)
    }

    pub fn from_reader<R: Read>(rdr: R, options: &OpenOptions) -> Result<Self> {
        let has_header = options.has_header.unwrap_or(true);
        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter.unwrap_or(b','))
            .has_headers(has_header)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(rdr);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| eyre!("Failed to parse CSV: {e}"))?;
            rows.push(Row::new(record.iter().map(str::to_string).collect()));
        }

        let headers = if has_header {
            reader
                .headers()
                .map_err(|e| eyre!("Failed to parse CSV header: {e}"))?
                .iter()
                .map(str::to_string)
                .collect()
        } else {
            let width = rows.iter().map(Row::len).max().unwrap_or(0);
            (1..=width).map(|i| format!("column_{i}")).collect()
        };

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header(&self, col: usize) -> &str {
        self.headers.get(col).map(String::as_str).unwrap_or("")
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.headers.len()
    }

    /// Distinct non-empty values of a column in first-seen order.
    /// Feeds the filter panel's candidate lists.
    pub fn distinct_values(&self, col: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for row in &self.rows {
            let cell = row.cell(col);
            if !cell.is_empty() && seen.insert(cell.to_string()) {
                values.push(cell.to_string());
            }
        }
        values
    }
}
