use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::ForestClassifier;
use crate::models::gbdt::GBDTClassifier;
use crate::models::knn::KNNClassifier;

/// Build an unfitted classifier from a `ModelConfig`.
///
/// `seed` drives every random choice the model makes (bootstrap rows,
/// feature subsets), so the same config and seed always grow the same model.
pub fn build_model(config: &ModelConfig, seed: u64) -> Box<dyn ClassifierModel> {
    let name = config.name.clone();
    match &config.model_type {
        ModelType::RandomForest {
            n_estimators,
            criterion,
            max_depth,
        } => Box::new(ForestClassifier::random_forest(
            name,
            *n_estimators,
            *criterion,
            *max_depth,
            seed,
        )),
        ModelType::Bagging {
            n_estimators,
            max_depth,
        } => Box::new(ForestClassifier::bagging(name, *n_estimators, *max_depth, seed)),
        ModelType::KNN { n_neighbors } => Box::new(KNNClassifier::new(name, *n_neighbors)),
        ModelType::GBDT {
            max_depth,
            num_boost_round,
            learning_rate,
            debug,
            training_optimization_level,
            loss_type,
        } => Box::new(GBDTClassifier::new(
            name,
            *max_depth,
            *num_boost_round,
            *learning_rate,
            *debug,
            *training_optimization_level,
            loss_type.clone(),
        )),
    }
}
