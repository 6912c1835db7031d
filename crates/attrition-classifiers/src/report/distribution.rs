//! Feature distributions of the employees the ensemble predicts will leave.
use ndarray::{Array1, Array2};

use crate::config::ReportConfig;
use crate::data_handling::Cell;
use crate::error::{AttritionError, Result};
use crate::feature_index::FeatureIndexMap;
use crate::preprocessing::CategoricalEncoder;

/// Label of employees predicted to leave.
pub const LEAVE_LABEL: usize = 1;

/// Fixed value bands for the continuous columns that are charted as ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binning {
    Age,
    HourlyRate,
    MonthlyIncome,
}

impl Binning {
    pub fn for_column(column: &str) -> Option<Self> {
        match column {
            "Age" => Some(Binning::Age),
            "HourlyRate" => Some(Binning::HourlyRate),
            "MonthlyIncome" => Some(Binning::MonthlyIncome),
            _ => None,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            Binning::Age => vec![
                "Age <= 30".to_string(),
                "30 < Age < 40".to_string(),
                "Age >= 40".to_string(),
            ],
            Binning::HourlyRate => (0..6)
                .map(|i| format!("{} <= Hourly Rate < {}", 30 + i * 10, 40 + i * 10))
                .chain(std::iter::once("90 <= Hourly Rate <= 100".to_string()))
                .collect(),
            Binning::MonthlyIncome => (0..8)
                .map(|i| {
                    let low = if i == 0 { 1000 } else { 2500 * i };
                    format!("{} - {}", low, 2500 * (i + 1))
                })
                .collect(),
        }
    }

    /// Band index of `value`. The outer bands absorb everything beyond them.
    pub fn bucket(&self, value: f64) -> usize {
        match self {
            Binning::Age => {
                if value <= 30.0 {
                    0
                } else if value < 40.0 {
                    1
                } else {
                    2
                }
            }
            Binning::HourlyRate => {
                if value < 40.0 {
                    0
                } else {
                    (((value - 30.0) / 10.0).floor() as usize).min(6)
                }
            }
            Binning::MonthlyIncome => {
                if value < 2500.0 {
                    0
                } else {
                    ((value / 2500.0).floor() as usize).min(7)
                }
            }
        }
    }
}

/// Bar chart data of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDistribution {
    pub column: String,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl FeatureDistribution {
    fn new(column: &str, labels: Vec<String>) -> Self {
        let counts = vec![0; labels.len()];
        FeatureDistribution {
            column: column.to_string(),
            labels,
            counts,
        }
    }

    fn increment(&mut self, index: usize) {
        self.counts[index] += 1;
    }

    /// Count one occurrence of `label`, appending it if unseen.
    fn increment_label(&mut self, label: String) {
        match self.labels.iter().position(|l| *l == label) {
            Some(index) => self.increment(index),
            None => {
                self.labels.push(label);
                self.counts.push(1);
            }
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Ordered per-column distributions plus the bookkeeping of one report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionReport {
    /// Binned columns first, then per-value columns in feature order, then
    /// the target column.
    pub distributions: Vec<FeatureDistribution>,
    /// Number of rows predicted to leave.
    pub positive_rows: usize,
    /// Row indices (within the scored matrix) whose prediction was wrong.
    pub mistakes: Vec<usize>,
}

impl DistributionReport {
    pub fn get(&self, column: &str) -> Option<&FeatureDistribution> {
        self.distributions.iter().find(|d| d.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDistribution> {
        self.distributions.iter()
    }
}

enum Bucketing {
    Binned(Binning),
    Values,
}

/// Tallies encoded feature rows into human readable buckets.
pub struct DistributionReporter<'a> {
    encoder: &'a CategoricalEncoder,
    index_map: &'a FeatureIndexMap,
    target: &'a str,
    config: &'a ReportConfig,
}

impl<'a> DistributionReporter<'a> {
    pub fn new(
        encoder: &'a CategoricalEncoder,
        index_map: &'a FeatureIndexMap,
        target: &'a str,
        config: &'a ReportConfig,
    ) -> Self {
        DistributionReporter {
            encoder,
            index_map,
            target,
            config,
        }
    }

    /// Columns that get a chart, with their feature index and bucketing.
    fn charted_columns(&self) -> Vec<(&'a str, usize, Bucketing)> {
        let mut binned = Vec::new();
        let mut valued = Vec::new();
        for (column, index) in self.index_map.iter() {
            if let Some(binning) = Binning::for_column(column) {
                binned.push((column, index, Bucketing::Binned(binning)));
            } else if !self.config.excluded_columns.iter().any(|c| c == column) {
                valued.push((column, index, Bucketing::Values));
            }
        }
        binned.extend(valued);
        binned
    }

    /// Readable name of an encoded value.
    ///
    /// Categorical codes are decoded; other values are matched against the
    /// column's vocabulary so booleans keep their `true`/`false` names.
    fn value_label(&self, column: &str, value: f64) -> String {
        if self.encoder.is_categorical(column) {
            if value >= 0.0 {
                if let Some(name) = self.encoder.decode(column, value as usize) {
                    return name.to_string();
                }
            }
        } else if let Some(vocab) = self.encoder.vocabulary(column) {
            if let Some(name) = vocab
                .values()
                .iter()
                .find(|v| Cell::parse(v.as_str()).to_f64() == Some(value))
            {
                return name.clone();
            }
        }
        value.to_string()
    }

    fn target_labels(&self) -> Vec<String> {
        if self.encoder.is_categorical(self.target) {
            if let Some(vocab) = self.encoder.vocabulary(self.target) {
                return vocab.values().to_vec();
            }
        }
        vec!["0".to_string(), "1".to_string()]
    }

    /// Build the report for one scored matrix.
    ///
    /// # Arguments
    ///
    /// * `predictions` - Voted label per row of `x`.
    /// * `x` - Encoded feature rows, columns in `index_map` order.
    /// * `y_true` - True labels of the rows of `x`.
    pub fn tally(
        &self,
        predictions: &Array1<usize>,
        x: &Array2<f64>,
        y_true: &Array1<usize>,
    ) -> Result<DistributionReport> {
        if x.ncols() != self.index_map.len() {
            return Err(AttritionError::FeatureCount {
                expected: self.index_map.len(),
                found: x.ncols(),
            });
        }
        for len in [x.nrows(), y_true.len()] {
            if len != predictions.len() {
                return Err(AttritionError::VoteLength {
                    expected: predictions.len(),
                    found: len,
                });
            }
        }

        let columns = self.charted_columns();
        let mut distributions: Vec<FeatureDistribution> = columns
            .iter()
            .map(|(column, _, bucketing)| {
                let labels = match bucketing {
                    Bucketing::Binned(binning) => binning.labels(),
                    Bucketing::Values => self
                        .encoder
                        .vocabulary(column)
                        .map(|v| v.values().to_vec())
                        .unwrap_or_default(),
                };
                FeatureDistribution::new(column, labels)
            })
            .collect();
        let mut target = FeatureDistribution::new(self.target, self.target_labels());

        let mut positive_rows = 0;
        let mut mistakes = Vec::new();

        for (row, ((&predicted, &truth), features)) in predictions
            .iter()
            .zip(y_true.iter())
            .zip(x.outer_iter())
            .enumerate()
        {
            if predicted != truth {
                mistakes.push(row);
            }

            if predicted == LEAVE_LABEL {
                positive_rows += 1;
                for ((column, index, bucketing), dist) in
                    columns.iter().zip(distributions.iter_mut())
                {
                    let value = features[*index];
                    match bucketing {
                        Bucketing::Binned(binning) => dist.increment(binning.bucket(value)),
                        Bucketing::Values => dist.increment_label(self.value_label(column, value)),
                    }
                }
            }

            if predicted < target.labels.len() {
                target.increment(predicted);
            } else {
                target.increment_label(predicted.to_string());
            }
        }

        distributions.push(target);
        log::debug!(
            "{} of {} rows predicted to leave, {} mistakes",
            positive_rows,
            predictions.len(),
            mistakes.len()
        );

        Ok(DistributionReport {
            distributions,
            positive_rows,
            mistakes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::Table;

    fn remote_workers() -> (Table, CategoricalEncoder, FeatureIndexMap) {
        let table = Table::new(
            vec!["Attrition".into(), "Remote".into(), "JobLevel".into()],
            vec![
                vec![Cell::from("Yes"), Cell::Bool(true), Cell::Int(2)],
                vec![Cell::from("Yes"), Cell::Bool(false), Cell::Int(1)],
                vec![Cell::from("No"), Cell::Bool(true), Cell::Int(2)],
            ],
        )
        .unwrap();
        let encoder = CategoricalEncoder::fit(&table, &["Attrition".to_string()]);
        let index_map = FeatureIndexMap::new(table.columns(), "Attrition");
        (table, encoder, index_map)
    }

    #[test]
    fn boolean_and_numeric_values_keep_vocabulary_labels() {
        let (table, encoder, index_map) = remote_workers();
        let config = ReportConfig::default();
        let reporter = DistributionReporter::new(&encoder, &index_map, "Attrition", &config);

        let x = encoder.transform(&table, index_map.features()).unwrap();
        let y = encoder.encode_labels(&table, "Attrition").unwrap();
        let predictions = Array1::from(vec![1, 1, 0]);
        let report = reporter.tally(&predictions, &x, &y).unwrap();

        let remote = report.get("Remote").unwrap();
        assert_eq!(remote.labels, vec!["false".to_string(), "true".to_string()]);
        assert_eq!(remote.counts, vec![1, 1]);

        let level = report.get("JobLevel").unwrap();
        assert_eq!(level.labels, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(level.counts, vec![1, 1]);

        assert_eq!(report.positive_rows, 2);
        assert!(report.mistakes.is_empty());
    }

    #[test]
    fn age_bands() {
        let age = Binning::Age;
        assert_eq!(age.bucket(18.0), 0);
        assert_eq!(age.bucket(30.0), 0);
        assert_eq!(age.bucket(30.5), 1);
        assert_eq!(age.bucket(39.0), 1);
        assert_eq!(age.bucket(40.0), 2);
        assert_eq!(age.labels().len(), 3);
    }

    #[test]
    fn hourly_rate_bands_cover_outliers() {
        let rate = Binning::HourlyRate;
        let labels = rate.labels();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "30 <= Hourly Rate < 40");
        assert_eq!(labels[6], "90 <= Hourly Rate <= 100");
        assert_eq!(rate.bucket(12.0), 0);
        assert_eq!(rate.bucket(39.9), 0);
        assert_eq!(rate.bucket(40.0), 1);
        assert_eq!(rate.bucket(89.0), 5);
        assert_eq!(rate.bucket(90.0), 6);
        assert_eq!(rate.bucket(150.0), 6);
    }

    #[test]
    fn monthly_income_bands() {
        let income = Binning::MonthlyIncome;
        let labels = income.labels();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "1000 - 2500");
        assert_eq!(labels[7], "17500 - 20000");
        assert_eq!(income.bucket(500.0), 0);
        assert_eq!(income.bucket(2499.0), 0);
        assert_eq!(income.bucket(2500.0), 1);
        assert_eq!(income.bucket(17499.0), 6);
        assert_eq!(income.bucket(25000.0), 7);
    }

    #[test]
    fn unseen_label_is_appended() {
        let mut dist = FeatureDistribution::new("Gender", vec!["Female".into()]);
        dist.increment_label("Male".into());
        dist.increment_label("Female".into());
        assert_eq!(dist.labels, vec!["Female".to_string(), "Male".to_string()]);
        assert_eq!(dist.counts, vec![1, 1]);
        assert_eq!(dist.total(), 2);
    }
}
