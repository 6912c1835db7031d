use ndarray::Array1;

/// Fraction of positions where `predicted` equals `truth`.
///
/// Returns `0.0` for empty inputs.
///
/// # Panics
///
/// Panics if the two arrays have different lengths.
pub fn accuracy_score(truth: &Array1<usize>, predicted: &Array1<usize>) -> f64 {
    assert_eq!(
        truth.len(),
        predicted.len(),
        "accuracy_score requires equal lengths"
    );
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

/// Number of distinct labels in `labels`.
pub fn n_classes(labels: &Array1<usize>) -> usize {
    let mut seen: Vec<usize> = labels.to_vec();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}
