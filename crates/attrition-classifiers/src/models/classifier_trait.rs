use ndarray::{Array1, Array2};

use crate::error::Result;

/// A small trait abstraction for the classifiers that make up the attrition
/// ensemble. Labels are class indices (`0` stays, `1` leaves for the target
/// column as encoded by the ensemble).
pub trait ClassifierModel {
    /// Fit the model from scratch, discarding any previous fit.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict one label per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Human readable name of the model
    fn name(&self) -> &str {
        "classifier"
    }
}
