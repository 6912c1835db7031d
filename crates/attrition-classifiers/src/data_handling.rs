//! Data structures and helpers for holding and splitting tabular HR data.
//!
//! This module defines `Cell` and `Table`, the in-memory form of the
//! employee dataset handed to the ensemble, and the seeded train/test split
//! shared by every ensemble member.
use std::fmt;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{AttritionError, Result};

/// A single raw value of the dataset.
///
/// Missing values are represented as `Int(0)`, mirroring how empty cells are
/// filled when a table is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Parse a raw text field, inferring the most specific type.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Cell::Int(0);
        }
        if let Ok(v) = raw.parse::<i64>() {
            return Cell::Int(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            if v.is_finite() {
                return Cell::Float(v);
            }
        }
        match raw.to_ascii_lowercase().as_str() {
            "true" => Cell::Bool(true),
            "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    /// Numeric value of the cell, if it has one. Text is parsed leniently.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }

    /// The normalised string form used as an encoding key.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// An ordered table of records with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking that every row has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(AttritionError::RowWidth {
                    row,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
        }
        Ok(Table { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AttritionError::UnknownColumn(name.to_string()))?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// True when every cell of the column carries a number (or boolean).
    pub fn is_numeric_column(&self, name: &str) -> Result<bool> {
        Ok(self.column_values(name)?.all(Cell::is_numeric))
    }

    /// Remove a column and its cells from every row.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AttritionError::UnknownColumn(name.to_string()))?;
        self.columns.remove(idx);
        for row in self.rows.iter_mut() {
            row.remove(idx);
        }
        Ok(())
    }
}

/// Row partition of an encoded dataset into train and test sets.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Original row indices that ended up in the training partition.
    pub train_indices: Vec<usize>,
    /// Original row indices that ended up in the test partition.
    pub test_indices: Vec<usize>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<usize>,
    pub y_test: Array1<usize>,
}

/// Shuffle rows with a seeded RNG and hold out `test_fraction` of them.
///
/// The test partition receives `ceil(n * test_fraction)` rows, taken from the
/// front of the permutation. The same seed always yields the same partition.
///
/// # Arguments
///
/// * `x` - Encoded feature matrix, one row per record.
/// * `y` - Labels aligned with the rows of `x`.
/// * `test_fraction` - Share of rows held out, clamped to `[0, 1]`.
/// * `seed` - Seed of the shuffling RNG.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<usize>,
    test_fraction: f64,
    seed: u64,
) -> TrainTestSplit {
    let n_samples = x.nrows();
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n_samples as f64) * fraction).ceil() as usize;
    let n_test = n_test.min(n_samples);

    let test_indices = indices[..n_test].to_vec();
    let train_indices = indices[n_test..].to_vec();

    log::debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n_samples,
        train_indices.len(),
        test_indices.len(),
        seed
    );

    TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            vec!["Age".into(), "Attrition".into(), "Department".into()],
            vec![
                vec![Cell::Int(31), Cell::from("Yes"), Cell::from("Sales")],
                vec![Cell::Int(45), Cell::from("No"), Cell::from("R&D")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn parse_infers_cell_types() {
        assert_eq!(Cell::parse("42"), Cell::Int(42));
        assert_eq!(Cell::parse("4.5"), Cell::Float(4.5));
        assert_eq!(Cell::parse("TRUE"), Cell::Bool(true));
        assert_eq!(Cell::parse("Sales"), Cell::Text("Sales".into()));
        assert_eq!(Cell::parse("  "), Cell::Int(0));
    }

    #[test]
    fn keys_are_stable_strings() {
        assert_eq!(Cell::Int(5).as_key(), "5");
        assert_eq!(Cell::Float(5.0).as_key(), "5");
        assert_eq!(Cell::Float(2.5).as_key(), "2.5");
        assert_eq!(Cell::Bool(false).as_key(), "false");
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(vec!["a".into(), "b".into()], vec![vec![Cell::Int(1)]]).unwrap_err();
        assert!(matches!(err, AttritionError::RowWidth { row: 0, expected: 2, found: 1 }));
    }

    #[test]
    fn drop_column_removes_cells() {
        let mut table = sample_table();
        table.drop_column("Attrition").unwrap();
        assert_eq!(table.columns(), &["Age".to_string(), "Department".to_string()]);
        assert!(table.rows().iter().all(|r| r.len() == 2));
        assert!(table.drop_column("Attrition").is_err());
    }

    #[test]
    fn numeric_column_detection() {
        let table = sample_table();
        assert!(table.is_numeric_column("Age").unwrap());
        assert!(!table.is_numeric_column("Department").unwrap());
    }

    #[test]
    fn split_sizes_follow_fraction() {
        let x = Array2::from_shape_fn((10, 2), |(r, c)| (r * 2 + c) as f64);
        let y = Array1::from_shape_fn(10, |r| r % 2);
        let split = train_test_split(&x, &y, 0.2, 999);
        assert_eq!(split.test_indices.len(), 2);
        assert_eq!(split.train_indices.len(), 8);
        assert_eq!(split.x_train.nrows(), 8);
        assert_eq!(split.y_test.len(), 2);

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }
}
