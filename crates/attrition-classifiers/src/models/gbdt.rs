use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};

use crate::error::{AttritionError, Result};
use crate::models::classifier_trait::ClassifierModel;

const LOG_LIKELIHOOD: &str = "LogLikelyhood";

/// Loss names accepted by gbdt that suit binary labels.
const SUPPORTED_LOSSES: [&str; 4] = [LOG_LIKELIHOOD, "SquaredError", "LAD", "binary:logistic"];

/// Gradient Boosting Decision Tree (GBDT) classifier for binary labels.
pub struct GBDTClassifier {
    name: String,
    model: Option<GBDT>,
    n_features: usize,
    max_depth: u32,
    num_boost_round: u32,
    learning_rate: f32,
    debug: bool,
    training_optimization_level: u8,
    loss_type: String,
}

impl GBDTClassifier {
    pub fn new(
        name: impl Into<String>,
        max_depth: u32,
        num_boost_round: u32,
        learning_rate: f32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: impl Into<String>,
    ) -> Self {
        GBDTClassifier {
            name: name.into(),
            model: None,
            n_features: 0,
            max_depth,
            num_boost_round,
            learning_rate,
            debug,
            training_optimization_level,
            loss_type: loss_type.into(),
        }
    }

    /// Class label as the regression target expected by the loss.
    fn target_value(&self, label: usize) -> f32 {
        match (self.loss_type.as_str(), label) {
            (LOG_LIKELIHOOD, 0) => -1.0,
            (_, label) => label as f32,
        }
    }

    fn to_data_vec(x: &Array2<f64>, labels: Option<Vec<f32>>) -> DataVec {
        let mut data = DataVec::with_capacity(x.nrows());
        for (i, row) in x.outer_iter().enumerate() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            let label = labels.as_ref().map(|l| l[i]).unwrap_or(0.0);
            data.push(Data::new_training_data(features, 1.0, label, None));
        }
        data
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        self.model = None;

        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: format!("{} labels for {} rows", y.len(), x.nrows()),
            });
        }
        if let Some(bad) = y.iter().find(|&&label| label > 1) {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: format!("label {} is not binary", bad),
            });
        }

        if self.num_boost_round == 0 {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: "num_boost_round must be positive".to_string(),
            });
        }
        if !SUPPORTED_LOSSES.contains(&self.loss_type.as_str()) {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: format!(
                    "unsupported loss '{}', expected one of {}",
                    self.loss_type,
                    SUPPORTED_LOSSES.join(", ")
                ),
            });
        }

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.learning_rate);
        config.set_max_depth(self.max_depth);
        config.set_iterations(self.num_boost_round as usize);
        config.set_debug(self.debug);
        config.set_training_optimization_level(self.training_optimization_level);
        config.set_loss(&self.loss_type);

        let targets: Vec<f32> = y.iter().map(|&label| self.target_value(label)).collect();
        let mut train_x = Self::to_data_vec(x, Some(targets));

        let mut gbdt = GBDT::new(&config);
        gbdt.fit(&mut train_x);

        self.n_features = x.ncols();
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self.model.as_ref().ok_or(AttritionError::NotTrained)?;
        if x.ncols() != self.n_features {
            return Err(AttritionError::FeatureCount {
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        let test_x = Self::to_data_vec(x, None);
        let scores = model.predict(&test_x);
        Ok(scores
            .iter()
            .map(|&score| if score >= 0.5 { 1 } else { 0 })
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbdt_classifier() {
        // Target is perfectly correlated with the second feature
        let x = Array2::from_shape_vec(
            (10, 3),
            vec![
                0.1, 1.0, 5.0, 0.4, -1.0, 5.0, 0.6, 1.0, 5.0, 0.9, -1.0, 5.0, 1.2, 1.0, 5.0, 1.5,
                -1.0, 5.0, 1.8, 1.0, 5.0, 2.1, -1.0, 5.0, 2.4, 1.0, 5.0, 2.7, -1.0, 5.0,
            ],
        )
        .unwrap();
        let y = Array1::from(vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);

        let mut classifier = GBDTClassifier::new("gbdt", 3, 20, 0.1, false, 2, LOG_LIKELIHOOD);
        classifier.fit(&x, &y).unwrap();

        let predictions = classifier.predict(&x).unwrap();
        assert_eq!(predictions.len(), y.len());
        let correct = predictions.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 8, "only {} of 10 correct", correct);
    }

    #[test]
    fn unknown_loss_is_a_training_error() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let y = Array1::from(vec![0, 0, 1, 1]);
        let mut classifier = GBDTClassifier::new("gbdt", 3, 5, 0.1, false, 2, "logloss");
        match classifier.fit(&x, &y) {
            Err(AttritionError::Training { model, reason }) => {
                assert_eq!(model, "gbdt");
                assert!(reason.contains("logloss"));
            }
            other => panic!("expected a training error, got {:?}", other.err()),
        }
        assert!(matches!(classifier.predict(&x), Err(AttritionError::NotTrained)));
    }

    #[test]
    fn zero_boosting_rounds_is_a_training_error() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let y = Array1::from(vec![0, 0, 1, 1]);
        let mut classifier = GBDTClassifier::new("gbdt", 3, 0, 0.1, false, 2, LOG_LIKELIHOOD);
        assert!(matches!(
            classifier.fit(&x, &y),
            Err(AttritionError::Training { .. })
        ));
    }

    #[test]
    fn non_binary_labels_fail_training() {
        let x = Array2::<f64>::zeros((3, 1));
        let y = Array1::from(vec![0, 1, 2]);
        let mut classifier = GBDTClassifier::new("gbdt", 3, 5, 0.1, false, 2, LOG_LIKELIHOOD);
        assert!(matches!(
            classifier.fit(&x, &y),
            Err(AttritionError::Training { .. })
        ));
    }
}
