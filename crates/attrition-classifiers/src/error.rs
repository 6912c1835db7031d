use thiserror::Error;

/// Errors raised by the encoding, training and prediction paths.
#[derive(Debug, Error)]
pub enum AttritionError {
    /// A value was never observed for this column when the encoder was fitted.
    #[error("unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// An ensemble member could not be fitted. Fatal for the whole run.
    #[error("training '{model}' failed: {reason}")]
    Training { model: String, reason: String },

    #[error("{model} failed to predict: {reason}")]
    Prediction { model: String, reason: String },

    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("the target column '{0}' cannot be used as a feature")]
    TargetColumn(String),

    #[error("no value supplied for feature '{0}'")]
    MissingFeature(String),

    #[error("value '{value}' in column '{column}' is not numeric")]
    NotNumeric { column: String, value: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} feature columns, got {found}")]
    FeatureCount { expected: usize, found: usize },

    #[error("prediction vectors must have equal lengths (expected {expected}, got {found})")]
    VoteLength { expected: usize, found: usize },

    #[error("the ensemble has no members")]
    EmptyEnsemble,

    #[error("model has not been trained")]
    NotTrained,
}

pub type Result<T> = std::result::Result<T, AttritionError>;
