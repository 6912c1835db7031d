//! CSV/TSV reader for the employee table.
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::data_handling::{Cell, Table};

/// Field delimiter implied by the file extension: tab for `.tsv`, comma
/// otherwise.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Read a header-prefixed CSV or TSV file into a `Table`.
///
/// Empty cells are loaded as `0`.
pub fn read_table_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let delimiter = delimiter_for(&path);
    read_table_csv_with_delimiter(path, delimiter)
}

pub fn read_table_csv_with_delimiter<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open data file: {}", path.as_ref().display()))?;

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.is_empty() {
        return Err(anyhow!("No columns in {}", path.as_ref().display()));
    }

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        rows.push(record.iter().map(Cell::parse).collect::<Vec<Cell>>());
    }

    log::info!(
        "Loaded {} rows x {} columns from {}",
        rows.len(),
        columns.len(),
        path.as_ref().display()
    );

    Table::new(columns, rows).with_context(|| format!("Malformed table in {}", path.as_ref().display()))
}
