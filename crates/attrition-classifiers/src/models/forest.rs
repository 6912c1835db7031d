use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::config::SplitCriterion;
use crate::error::{AttritionError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::voting::MajorityVoter;

/// How many features each tree of the ensemble sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSampling {
    /// Every tree is grown on all features (plain bagging).
    All,
    /// Every tree is grown on `round(sqrt(n_features))` random features.
    Sqrt,
}

struct FittedTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

/// Bootstrap-aggregated decision trees.
///
/// Covers both the random forest members (feature subsampling per tree) and
/// the bagging member (all features). Trees are grown with `linfa-trees` and
/// combined with the same majority vote used across the ensemble.
pub struct ForestClassifier {
    name: String,
    n_estimators: usize,
    criterion: SplitCriterion,
    max_depth: Option<usize>,
    sampling: FeatureSampling,
    seed: u64,
    n_features: usize,
    trees: Vec<FittedTree>,
}

impl ForestClassifier {
    pub fn random_forest(
        name: impl Into<String>,
        n_estimators: usize,
        criterion: SplitCriterion,
        max_depth: Option<usize>,
        seed: u64,
    ) -> Self {
        ForestClassifier {
            name: name.into(),
            n_estimators,
            criterion,
            max_depth,
            sampling: FeatureSampling::Sqrt,
            seed,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn bagging(
        name: impl Into<String>,
        n_estimators: usize,
        max_depth: Option<usize>,
        seed: u64,
    ) -> Self {
        ForestClassifier {
            name: name.into(),
            n_estimators,
            criterion: SplitCriterion::Gini,
            max_depth,
            sampling: FeatureSampling::All,
            seed,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn features_per_tree(&self, n_features: usize) -> usize {
        match self.sampling {
            FeatureSampling::All => n_features,
            FeatureSampling::Sqrt => ((n_features as f64).sqrt().round() as usize).clamp(1, n_features),
        }
    }

    fn training_error(&self, reason: impl Into<String>) -> AttritionError {
        AttritionError::Training {
            model: self.name.clone(),
            reason: reason.into(),
        }
    }
}

impl ClassifierModel for ForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        self.trees.clear();

        let (n_samples, n_features) = x.dim();
        if n_samples == 0 || n_features == 0 {
            return Err(self.training_error(format!(
                "cannot fit on a {}x{} feature matrix",
                n_samples, n_features
            )));
        }
        if y.len() != n_samples {
            return Err(self.training_error(format!(
                "{} labels for {} rows",
                y.len(),
                n_samples
            )));
        }
        if self.n_estimators == 0 {
            return Err(self.training_error("n_estimators must be positive"));
        }

        let quality = match self.criterion {
            SplitCriterion::Gini => SplitQuality::Gini,
            SplitCriterion::Entropy => SplitQuality::Entropy,
        };
        let k = self.features_per_tree(n_features);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let features: Vec<usize> = if k == n_features {
                (0..n_features).collect()
            } else {
                let mut picked = sample(&mut rng, n_features, k).into_vec();
                picked.sort_unstable();
                picked
            };

            let records = x.select(Axis(0), &rows).select(Axis(1), &features);
            let targets = y.select(Axis(0), &rows);
            let dataset = DatasetBase::new(records, targets);

            let tree = DecisionTree::<f64, usize>::params()
                .split_quality(quality)
                .max_depth(self.max_depth)
                .fit(&dataset)
                .map_err(|e| self.training_error(e.to_string()))?;

            trees.push(FittedTree { features, tree });
        }

        log::trace!("{}: grew {} trees on {} features each", self.name, trees.len(), k);
        self.n_features = n_features;
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(AttritionError::NotTrained);
        }
        if x.ncols() != self.n_features {
            return Err(AttritionError::FeatureCount {
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        let per_tree: Vec<Array1<usize>> = self
            .trees
            .iter()
            .map(|fitted| {
                let view = x.select(Axis(1), &fitted.features);
                let labels: Array1<usize> = fitted.tree.predict(&view);
                labels
            })
            .collect();

        MajorityVoter::vote(&per_tree)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f64>, Array1<usize>) {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                0.0, 1.0, 0.1, 0.9, 0.2, 1.1, 0.1, 1.2, //
                1.0, 0.0, 0.9, 0.1, 1.1, 0.2, 1.2, 0.1,
            ],
        )
        .unwrap();
        let y = Array1::from(vec![0, 0, 0, 0, 1, 1, 1, 1]);
        (x, y)
    }

    #[test]
    fn bagging_learns_separable_data() {
        let (x, y) = separable();
        let mut model = ForestClassifier::bagging("bagging", 15, None, 7);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 15);
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 8);
        let correct = preds.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 7, "only {} of 8 correct", correct);
    }

    #[test]
    fn forest_is_reproducible_with_seed() {
        let (x, y) = separable();
        let mut a = ForestClassifier::random_forest("rf", 9, SplitCriterion::Entropy, Some(3), 11);
        let mut b = ForestClassifier::random_forest("rf", 9, SplitCriterion::Entropy, Some(3), 11);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn predict_before_fit_errors() {
        let (x, _) = separable();
        let model = ForestClassifier::bagging("bagging", 3, None, 1);
        assert!(matches!(model.predict(&x), Err(AttritionError::NotTrained)));
    }

    #[test]
    fn empty_matrix_is_a_training_error() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<usize>::zeros(0);
        let mut model = ForestClassifier::bagging("bagging", 3, None, 1);
        assert!(matches!(model.fit(&x, &y), Err(AttritionError::Training { .. })));
    }
}
