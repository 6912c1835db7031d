//! Hard majority voting across classifier outputs.
use ndarray::Array1;

use crate::error::{AttritionError, Result};

/// Combines per-model label vectors into one label per row.
///
/// The most frequent label of a row wins. When several labels share the top
/// count, the one seen first while walking the models in order wins, so
/// `[1, 0, 0, 1]` resolves to `1` and `[0, 1, 1, 0]` to `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityVoter;

impl MajorityVoter {
    /// Vote on the labels of a single row, given in model order.
    ///
    /// Returns `None` when no labels are given.
    pub fn vote_row<I>(labels: I) -> Option<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        // (label, count) in first-seen order
        let mut counts: Vec<(usize, usize)> = Vec::new();
        for label in labels {
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (label, count) in counts {
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Vote on every row of `predictions` (one vector per model).
    ///
    /// # Arguments
    ///
    /// * `predictions` - Per-model label vectors, same length and row order.
    ///
    /// # Returns
    ///
    /// One label per row, or an error when no vectors are given or their
    /// lengths differ.
    pub fn vote(predictions: &[Array1<usize>]) -> Result<Array1<usize>> {
        let first = predictions.first().ok_or(AttritionError::EmptyEnsemble)?;
        let n_rows = first.len();

        if let Some(bad) = predictions.iter().find(|p| p.len() != n_rows) {
            return Err(AttritionError::VoteLength {
                expected: n_rows,
                found: bad.len(),
            });
        }

        (0..n_rows)
            .map(|row| {
                Self::vote_row(predictions.iter().map(|p| p[row]))
                    .ok_or(AttritionError::EmptyEnsemble)
            })
            .collect()
    }
}
