//! CSV dataset loading.
//!
//! The loader parses an uploaded CSV byte stream into a string-typed
//! [`Dataset`]; all typing decisions (numeric coercion, label encoding)
//! happen later in [`crate::preprocessing`].
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::PipelineError;

/// An in-memory tabular dataset: a header row plus uniform data rows.
///
/// Invariant: every row has exactly `columns.len()` cells. The loader
/// rejects ragged input, and the preprocessor only removes whole columns or
/// whole rows, so the invariant holds for the dataset's lifetime.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Case-insensitive column lookup, matching how the source data tends
    /// to be hand-edited.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.eq_ignore_ascii_case(name))
    }

    /// First `n` rows, for the dataset preview.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.rows.iter().take(n).cloned().collect()
    }

    /// Remove a column by index from the header and every row.
    pub fn drop_column(&mut self, index: usize) {
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
    }

    /// Distinct values of a column with their row counts, sorted by value.
    pub fn value_counts(&self, index: usize) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row[index].as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect()
    }
}

/// Parse raw CSV bytes into a [`Dataset`].
///
/// Fails on invalid delimited text, ragged rows, or zero data rows.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<Dataset, PipelineError> {
    read_csv_reader(bytes)
}

/// Parse CSV from any reader. See [`read_csv_bytes`].
pub fn read_csv_reader<R: Read>(reader: R) -> Result<Dataset, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::Parse(format!("invalid header row: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if columns.is_empty() {
        return Err(PipelineError::Parse("empty header row".to_string()));
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| PipelineError::Parse(format!("row {}: {}", row_idx + 1, e)))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(PipelineError::Parse("no data rows".to_string()));
    }

    Ok(Dataset { columns, rows })
}

/// Load a CSV file from disk.
pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let bytes = std::fs::read(&path)
        .with_context(|| format!("Failed to read CSV file: {}", path.as_ref().display()))?;
    read_csv_bytes(&bytes)
        .with_context(|| format!("Failed to parse CSV file: {}", path.as_ref().display()))
}
