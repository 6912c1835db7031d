use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Split quality measure of the decision trees grown by forest members.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SplitCriterion {
    Gini,
    Entropy,
}

/// Supported ensemble member types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    /// Bootstrapped trees, each grown on a random subset of the features.
    RandomForest {
        n_estimators: usize,
        criterion: SplitCriterion,
        max_depth: Option<usize>,
    },
    /// Bootstrapped trees over all features.
    Bagging {
        n_estimators: usize,
        max_depth: Option<usize>,
    },
    KNN {
        n_neighbors: usize,
    },
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        learning_rate: f32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_estimators: 200,
            criterion: SplitCriterion::Gini,
            max_depth: None,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random_forest" | "random_forest_gini" => Ok(ModelType::default()),
            "random_forest_entropy" => Ok(ModelType::RandomForest {
                n_estimators: 200,
                criterion: SplitCriterion::Entropy,
                max_depth: None,
            }),
            "bagging" => Ok(ModelType::Bagging {
                n_estimators: 200,
                max_depth: None,
            }),
            "knn" => Ok(ModelType::KNN { n_neighbors: 5 }),
            "gbdt" => Ok(ModelType::GBDT {
                max_depth: 3,
                num_boost_round: 100,
                learning_rate: 0.1,
                debug: false,
                training_optimization_level: 2,
                loss_type: "LogLikelyhood".to_string(),
            }),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of random_forest, random_forest_entropy, bagging, knn, gbdt",
                s
            )),
        }
    }
}

/// A named ensemble member.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,

    #[serde(flatten)]
    pub model_type: ModelType,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
        }
    }
}

/// Columns treated specially by the distribution report.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Columns that get no per-value buckets (identifiers, constants, raw rates).
    pub excluded_columns: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_columns: [
                "EmployeeNumber",
                "DailyRate",
                "EmployeeCount",
                "MonthlyRate",
                "Over18",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Central configuration of an attrition model run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AttritionConfig {
    /// Binary label column.
    pub target_column: String,
    /// Columns whose values are replaced by integer codes.
    pub categorical_columns: Vec<String>,
    /// Columns deleted before training when present.
    pub drop_columns: Vec<String>,
    /// Share of rows held out for testing.
    pub test_fraction: f64,
    /// Seed of the train/test split and of every randomised member.
    pub seed: u64,
    pub models: Vec<ModelConfig>,
    pub report: ReportConfig,
}

impl Default for AttritionConfig {
    fn default() -> Self {
        let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            target_column: "Attrition".to_string(),
            categorical_columns: strings(&[
                "Attrition",
                "BusinessTravel",
                "Department",
                "EducationField",
                "Gender",
                "JobRole",
                "MaritalStatus",
                "Over18",
                "OverTime",
            ]),
            drop_columns: strings(&["EmployeeNumber", "EmployeeCount", "Over18"]),
            test_fraction: 0.2,
            seed: 999,
            models: vec![
                ModelConfig::new(
                    "RandomForestClassifier_Gini",
                    ModelType::RandomForest {
                        n_estimators: 200,
                        criterion: SplitCriterion::Gini,
                        max_depth: None,
                    },
                ),
                ModelConfig::new(
                    "RandomForestClassifier_Entropy",
                    ModelType::RandomForest {
                        n_estimators: 200,
                        criterion: SplitCriterion::Entropy,
                        max_depth: None,
                    },
                ),
                ModelConfig::new("KNeighborsClassifier", ModelType::KNN { n_neighbors: 5 }),
                ModelConfig::new(
                    "BaggingClassifier",
                    ModelType::Bagging {
                        n_estimators: 200,
                        max_depth: None,
                    },
                ),
                ModelConfig::new(
                    "GBDTClassifier",
                    ModelType::GBDT {
                        max_depth: 3,
                        num_boost_round: 100,
                        learning_rate: 0.1,
                        debug: false,
                        training_optimization_level: 2,
                        loss_type: "LogLikelyhood".to_string(),
                    },
                ),
            ],
            report: ReportConfig::default(),
        }
    }
}
