//! Categorical encoding shared by training and single-record inference.
//!
//! `CategoricalEncoder` enumerates the distinct values of every column of a
//! `Table`. Columns designated categorical are replaced by their integer codes;
//! all other columns are coerced to `f64`. The per-column vocabularies double
//! as the reverse mapping used to label report buckets.
use std::collections::{BTreeSet, HashMap};

use ndarray::{Array1, Array2};

use crate::data_handling::{Cell, Table};
use crate::error::{AttritionError, Result};

/// Distinct values of one column in code order.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    values: Vec<String>,
    codes: HashMap<String, usize>,
}

impl Vocabulary {
    fn from_cells<'a, I>(cells: I) -> Self
    where
        I: Iterator<Item = &'a Cell>,
    {
        let cells: Vec<&Cell> = cells.collect();
        let numeric = !cells.is_empty() && cells.iter().all(|c| c.is_numeric());

        let values: Vec<String> = if numeric {
            let mut seen: Vec<(f64, String)> = Vec::new();
            let mut keys = BTreeSet::new();
            for cell in &cells {
                let key = cell.as_key();
                if keys.insert(key.clone()) {
                    seen.push((cell.to_f64().unwrap_or_default(), key));
                }
            }
            seen.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            seen.into_iter().map(|(_, key)| key).collect()
        } else {
            cells
                .iter()
                .map(|c| c.as_key())
                .collect::<BTreeSet<String>>()
                .into_iter()
                .collect()
        };

        let codes = values
            .iter()
            .enumerate()
            .map(|(code, value)| (value.clone(), code))
            .collect();

        Vocabulary { values, codes }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn code(&self, key: &str) -> Option<usize> {
        self.codes.get(key).copied()
    }

    pub fn value(&self, code: usize) -> Option<&str> {
        self.values.get(code).map(String::as_str)
    }
}

/// Bidirectional value <-> code mapping fitted on one table.
///
/// Codes are assigned by sorting the distinct normalised values of a column:
/// numerically when every cell of the column is a number, lexically
/// otherwise. The assignment is therefore stable for a given table.
#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder {
    categorical: BTreeSet<String>,
    vocabularies: HashMap<String, Vocabulary>,
}

impl CategoricalEncoder {
    /// Fit the encoder on `table`.
    ///
    /// A vocabulary is built for every column. Names in `categorical` that are
    /// not present in the table are ignored, which lets a single column list
    /// serve tables from which some columns were deleted.
    pub fn fit(table: &Table, categorical: &[String]) -> Self {
        let mut vocabularies = HashMap::with_capacity(table.n_cols());
        for (idx, column) in table.columns().iter().enumerate() {
            let vocab = Vocabulary::from_cells(table.rows().iter().map(|row| &row[idx]));
            vocabularies.insert(column.clone(), vocab);
        }

        let categorical: BTreeSet<String> = categorical
            .iter()
            .filter(|c| table.has_column(c))
            .cloned()
            .collect();

        for column in &categorical {
            if let Some(vocab) = vocabularies.get(column) {
                log::debug!("{}: {:?}", column, vocab.values());
            }
        }

        CategoricalEncoder {
            categorical,
            vocabularies,
        }
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.contains(column)
    }

    /// Vocabulary (reverse mapping) of any fitted column.
    pub fn vocabulary(&self, column: &str) -> Option<&Vocabulary> {
        self.vocabularies.get(column)
    }

    /// Code of `value` in a categorical column.
    pub fn encode(&self, column: &str, value: &Cell) -> Result<usize> {
        let vocab = self
            .vocabularies
            .get(column)
            .ok_or_else(|| AttritionError::UnknownColumn(column.to_string()))?;
        let key = value.as_key();
        vocab
            .code(&key)
            .ok_or_else(|| AttritionError::UnknownCategory {
                column: column.to_string(),
                value: key,
            })
    }

    /// Original value behind `code`.
    pub fn decode(&self, column: &str, code: usize) -> Option<&str> {
        self.vocabularies.get(column).and_then(|v| v.value(code))
    }

    /// Numeric representation of one value: its code for categorical columns,
    /// the value itself coerced to `f64` for all others.
    pub fn value_to_f64(&self, column: &str, value: &Cell) -> Result<f64> {
        if self.is_categorical(column) {
            return self.encode(column, value).map(|code| code as f64);
        }
        value.to_f64().ok_or_else(|| AttritionError::NotNumeric {
            column: column.to_string(),
            value: value.as_key(),
        })
    }

    /// Encode the given columns of `table` into a row-major feature matrix.
    pub fn transform(&self, table: &Table, columns: &[String]) -> Result<Array2<f64>> {
        let indices = columns
            .iter()
            .map(|c| {
                table
                    .column_index(c)
                    .ok_or_else(|| AttritionError::UnknownColumn(c.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut x = Array2::<f64>::zeros((table.n_rows(), columns.len()));
        for (mut out, row) in x.outer_iter_mut().zip(table.rows()) {
            for (j, (column, &idx)) in columns.iter().zip(indices.iter()).enumerate() {
                out[j] = self.value_to_f64(column, &row[idx])?;
            }
        }
        Ok(x)
    }

    /// Encode a label column into class indices.
    ///
    /// Categorical label columns use their codes; numeric label columns must
    /// hold non-negative integers.
    pub fn encode_labels(&self, table: &Table, column: &str) -> Result<Array1<usize>> {
        table
            .column_values(column)?
            .map(|cell| {
                let value = self.value_to_f64(column, cell)?;
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(AttritionError::NotNumeric {
                        column: column.to_string(),
                        value: cell.as_key(),
                    });
                }
                Ok(value as usize)
            })
            .collect()
    }
}
