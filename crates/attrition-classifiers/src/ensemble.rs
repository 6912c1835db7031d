//! The attrition ensemble: encoding, training, voting and record prediction.
use std::collections::HashMap;

use ndarray::{Array1, Array2, Axis};

use crate::config::{AttritionConfig, ModelConfig, ReportConfig};
use crate::data_handling::{train_test_split, Cell, Table, TrainTestSplit};
use crate::error::{AttritionError, Result};
use crate::feature_index::FeatureIndexMap;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::build_model;
use crate::preprocessing::CategoricalEncoder;
use crate::report::distribution::{DistributionReport, DistributionReporter};
use crate::stats::{accuracy_score, n_classes};
use crate::voting::MajorityVoter;

/// Label of employees who stay.
pub const STAY_LABEL: usize = 0;

/// Train and test accuracy of one ensemble member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberScore {
    pub name: String,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
}

/// Verdict of the ensemble for a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPrediction {
    /// Majority label.
    pub label: usize,
    /// Majority label decoded back to the target column's original value.
    pub label_name: String,
    /// Label proposed by each member, in ensemble order.
    pub votes: Vec<(String, usize)>,
    /// Percentage (0-100) of members voting that the employee stays.
    pub satisfaction_score: f64,
}

struct FittedState {
    encoder: CategoricalEncoder,
    index_map: FeatureIndexMap,
    split: TrainTestSplit,
    members: Vec<Box<dyn ClassifierModel>>,
}

/// Predict with one member, rejecting output that is not one label per row.
fn checked_predict(member: &dyn ClassifierModel, x: &Array2<f64>) -> Result<Array1<usize>> {
    let prediction = member.predict(x)?;
    if prediction.len() != x.nrows() {
        return Err(AttritionError::Prediction {
            model: member.name().to_string(),
            reason: format!("{} labels for {} rows", prediction.len(), x.nrows()),
        });
    }
    Ok(prediction)
}

/// Owns the dataset and a fixed, ordered set of classifiers combined by
/// majority vote.
///
/// Columns may be deleted until `train` is called; every call to `train`
/// rebuilds the encoder, the feature index map, the split and all members
/// from scratch.
pub struct AttritionEnsembleModel {
    table: Table,
    target: String,
    categorical: Vec<String>,
    member_configs: Vec<ModelConfig>,
    test_fraction: f64,
    seed: u64,
    fitted: Option<FittedState>,
}

impl AttritionEnsembleModel {
    /// Create a model over `table`, deleting the configured `drop_columns`
    /// that are present.
    pub fn new(table: Table, config: &AttritionConfig) -> Result<Self> {
        if !table.has_column(&config.target_column) {
            return Err(AttritionError::UnknownColumn(config.target_column.clone()));
        }

        let mut model = AttritionEnsembleModel {
            table,
            target: config.target_column.clone(),
            categorical: config.categorical_columns.clone(),
            member_configs: config.models.clone(),
            test_fraction: config.test_fraction,
            seed: config.seed,
            fitted: None,
        };

        for column in &config.drop_columns {
            if model.table.has_column(column) {
                model.drop_column(column)?;
            }
        }

        log::debug!(
            "Loaded {} employees with {} columns",
            model.table.n_rows(),
            model.table.n_cols()
        );
        Ok(model)
    }

    /// Delete a feature column. Any previous training run is discarded.
    pub fn drop_column(&mut self, column: &str) -> Result<()> {
        if column == self.target {
            return Err(AttritionError::TargetColumn(column.to_string()));
        }
        self.table.drop_column(column)?;
        self.fitted = None;
        log::debug!("Dropped column '{}'", column);
        Ok(())
    }

    /// Encode the table, split it and fit every member on the training rows.
    ///
    /// Either every member fits or the whole run fails; on failure the model
    /// is left untrained.
    ///
    /// # Returns
    ///
    /// Train and test accuracy per member, in ensemble order.
    pub fn train(&mut self) -> Result<Vec<MemberScore>> {
        self.fitted = None;
        if self.member_configs.is_empty() {
            return Err(AttritionError::EmptyEnsemble);
        }

        let index_map = FeatureIndexMap::new(self.table.columns(), &self.target);
        let encoder = CategoricalEncoder::fit(&self.table, &self.categorical);
        let x = encoder.transform(&self.table, index_map.features())?;
        let y = encoder.encode_labels(&self.table, &self.target)?;
        let split = train_test_split(&x, &y, self.test_fraction, self.seed);

        let mut members = Vec::with_capacity(self.member_configs.len());
        let mut scores = Vec::with_capacity(self.member_configs.len());

        for (i, config) in self.member_configs.iter().enumerate() {
            if split.x_train.nrows() == 0 {
                return Err(AttritionError::Training {
                    model: config.name.clone(),
                    reason: "the training partition is empty".to_string(),
                });
            }
            if n_classes(&split.y_train) < 2 {
                return Err(AttritionError::Training {
                    model: config.name.clone(),
                    reason: "the training partition holds a single class".to_string(),
                });
            }

            log::info!("Training model: {}", config.name);
            let mut model = build_model(config, self.seed.wrapping_add(i as u64));
            model.fit(&split.x_train, &split.y_train)?;
            log::info!("Training is done");

            let train_accuracy =
                accuracy_score(&split.y_train, &checked_predict(model.as_ref(), &split.x_train)?);
            let test_accuracy =
                accuracy_score(&split.y_test, &checked_predict(model.as_ref(), &split.x_test)?);
            log::info!("Train accuracy for {}: {:.4}", config.name, train_accuracy);
            log::info!("Test accuracy for {}: {:.4}", config.name, test_accuracy);

            scores.push(MemberScore {
                name: config.name.clone(),
                train_accuracy,
                test_accuracy,
            });
            members.push(model);
        }

        self.fitted = Some(FittedState {
            encoder,
            index_map,
            split,
            members,
        });
        Ok(scores)
    }

    fn fitted(&self) -> Result<&FittedState> {
        self.fitted.as_ref().ok_or(AttritionError::NotTrained)
    }

    /// Labels proposed by every member for every row of `x`, in ensemble order.
    pub fn member_predictions(&self, x: &Array2<f64>) -> Result<Vec<Array1<usize>>> {
        let fitted = self.fitted()?;
        if x.ncols() != fitted.index_map.len() {
            return Err(AttritionError::FeatureCount {
                expected: fitted.index_map.len(),
                found: x.ncols(),
            });
        }

        fitted
            .members
            .iter()
            .map(|member| {
                log::debug!("Predicting with model: {}", member.name());
                let prediction = checked_predict(member.as_ref(), x)?;
                log::trace!("Predicted: {}", prediction);
                Ok(prediction)
            })
            .collect()
    }

    /// Majority-voted label for every row of an encoded feature matrix.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let predictions = self.member_predictions(x)?;
        MajorityVoter::vote(&predictions)
    }

    /// Build the encoded feature vector of one record.
    ///
    /// Values are read in the current feature order. Categorical values are
    /// replaced by their fitted code; everything else is coerced to `f64`.
    /// Entries of `values` that are not features are ignored.
    pub fn fit_data(&self, values: &HashMap<String, Cell>) -> Result<Array1<f64>> {
        let fitted = self.fitted()?;
        fitted
            .index_map
            .features()
            .iter()
            .map(|feature| {
                let value = values
                    .get(feature)
                    .ok_or_else(|| AttritionError::MissingFeature(feature.clone()))?;
                fitted.encoder.value_to_f64(feature, value)
            })
            .collect()
    }

    /// Predict a single record given as feature name -> raw value.
    pub fn predict_record(&self, values: &HashMap<String, Cell>) -> Result<RecordPrediction> {
        let fitted = self.fitted()?;
        let x = self.fit_data(values)?.insert_axis(Axis(0));
        let predictions = self.member_predictions(&x)?;
        let label = MajorityVoter::vote(&predictions)?[0];

        let votes: Vec<(String, usize)> = fitted
            .members
            .iter()
            .zip(predictions.iter())
            .map(|(member, p)| (member.name().to_string(), p[0]))
            .collect();
        let stays = votes.iter().filter(|(_, l)| *l == STAY_LABEL).count();
        let satisfaction_score = 100.0 * stays as f64 / votes.len() as f64;

        Ok(RecordPrediction {
            label,
            label_name: self.label_name(label),
            votes,
            satisfaction_score,
        })
    }

    /// Original target value behind a class label.
    pub fn label_name(&self, label: usize) -> String {
        match &self.fitted {
            Some(fitted) if fitted.encoder.is_categorical(&self.target) => fitted
                .encoder
                .decode(&self.target, label)
                .map(str::to_string)
                .unwrap_or_else(|| label.to_string()),
            _ => label.to_string(),
        }
    }

    /// Predict the test partition and tally feature distributions of the
    /// rows predicted to leave.
    pub fn distribution_report(&self, config: &ReportConfig) -> Result<DistributionReport> {
        let fitted = self.fitted()?;
        let predictions = self.predict(&fitted.split.x_test)?;
        let reporter =
            DistributionReporter::new(&fitted.encoder, &fitted.index_map, &self.target, config);
        reporter.tally(&predictions, &fitted.split.x_test, &fitted.split.y_test)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn target_column(&self) -> &str {
        &self.target
    }

    /// Feature columns in vector order, as of the current table.
    pub fn features(&self) -> Vec<String> {
        self.table
            .columns()
            .iter()
            .filter(|c| **c != self.target)
            .cloned()
            .collect()
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.member_configs.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn encoder(&self) -> Option<&CategoricalEncoder> {
        self.fitted.as_ref().map(|f| &f.encoder)
    }

    pub fn index_map(&self) -> Option<&FeatureIndexMap> {
        self.fitted.as_ref().map(|f| &f.index_map)
    }

    pub fn split(&self) -> Option<&TrainTestSplit> {
        self.fitted.as_ref().map(|f| &f.split)
    }
}
