use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{AttritionError, Result};
use crate::models::classifier_trait::ClassifierModel;

/// Brute-force k-nearest-neighbours classifier with uniform weights.
///
/// Distances are Euclidean over the raw (encoded, unscaled) features. Among
/// the `k` nearest training rows the most common label wins; ties go to the
/// smaller label. Equidistant neighbours are ordered by training row index.
pub struct KNNClassifier {
    name: String,
    n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
}

impl KNNClassifier {
    pub fn new(name: impl Into<String>, n_neighbors: usize) -> Self {
        KNNClassifier {
            name: name.into(),
            n_neighbors,
            x_train: None,
            y_train: None,
        }
    }

    fn classify(&self, row: ArrayView1<f64>, x_train: &Array2<f64>, y_train: &Array1<usize>) -> usize {
        let mut distances: Vec<(f64, usize)> = x_train
            .outer_iter()
            .enumerate()
            .map(|(idx, train_row)| {
                let d: f64 = train_row
                    .iter()
                    .zip(row.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (d, idx)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let k = self.n_neighbors.min(distances.len());
        let mut votes: Vec<(usize, usize)> = Vec::new();
        for &(_, idx) in &distances[..k] {
            let label = y_train[idx];
            match votes.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => votes.push((label, 1)),
            }
        }

        votes
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(label, _)| label)
            .unwrap_or_default()
    }
}

impl ClassifierModel for KNNClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: "no training rows".to_string(),
            });
        }
        if x.nrows() != y.len() {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: format!("{} labels for {} rows", y.len(), x.nrows()),
            });
        }
        if self.n_neighbors == 0 {
            return Err(AttritionError::Training {
                model: self.name.clone(),
                reason: "n_neighbors must be positive".to_string(),
            });
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let (x_train, y_train) = match (&self.x_train, &self.y_train) {
            (Some(x_train), Some(y_train)) => (x_train, y_train),
            _ => return Err(AttritionError::NotTrained),
        };
        if x.ncols() != x_train.ncols() {
            return Err(AttritionError::FeatureCount {
                expected: x_train.ncols(),
                found: x.ncols(),
            });
        }

        Ok(x
            .outer_iter()
            .map(|row| self.classify(row, x_train, y_train))
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
    fn nearest_neighbour_wins() {
        let x = Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 10.0, 11.0]).unwrap();
        let y = Array1::from(vec![0, 0, 1, 1]);
        let mut knn = KNNClassifier::new("knn", 1);
        knn.fit(&x, &y).unwrap();

        let query = Array2::from_shape_vec((2, 1), vec![0.4, 10.6]).unwrap();
        assert_eq!(knn.predict(&query).unwrap(), Array1::from(vec![0, 1]));
    }

    #[test]
    fn tie_between_labels_picks_smaller_label() {
        let x = Array2::from_shape_vec((2, 1), vec![-1.0, 1.0]).unwrap();
        let y = Array1::from(vec![1, 0]);
        let mut knn = KNNClassifier::new("knn", 2);
        knn.fit(&x, &y).unwrap();

        let query = Array2::from_shape_vec((1, 1), vec![0.0]).unwrap();
        assert_eq!(knn.predict(&query).unwrap()[0], 0);
    }

    #[test]
    fn k_larger_than_training_set_uses_all_rows() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array1::from(vec![1, 1, 0]);
        let mut knn = KNNClassifier::new("knn", 5);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), Array1::from(vec![1, 1, 1]));
    }

    #[test]
    fn wrong_width_is_rejected() {
        let x = Array2::from_shape_vec((2, 1), vec![0.0, 1.0]).unwrap();
        let mut knn = KNNClassifier::new("knn", 1);
        knn.fit(&x, &Array1::from(vec![0, 1])).unwrap();
        let wide = Array2::<f64>::zeros((1, 2));
        assert!(matches!(
            knn.predict(&wide),
            Err(AttritionError::FeatureCount { expected: 1, found: 2 })
        ));
    }
}
