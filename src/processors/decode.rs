//! Greedy decoding of per-step decoder logits into token ids.

use crate::core::Tensor3D;
use ndarray::{ArrayView1, Axis};

/// Index of the largest value; ties resolve to the lowest index and NaN never wins.
fn argmax(row: ArrayView1<'_, f32>) -> usize {
    let mut best_idx = 0;
    let mut best = f32::NEG_INFINITY;
    for (idx, &value) in row.iter().enumerate() {
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}

/// Takes the argmax over the vocabulary axis of `[batch, steps, vocab]` logits.
///
/// Returns one id sequence of length `steps` per batch item.
pub fn greedy_decode(logits: &Tensor3D) -> Vec<Vec<usize>> {
    logits
        .axis_iter(Axis(0))
        .map(|steps| steps.axis_iter(Axis(0)).map(argmax).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_greedy_decode_picks_max_per_step() {
        let mut logits = Array3::<f32>::zeros((2, 3, 4));
        logits[[0, 0, 2]] = 1.0;
        logits[[0, 1, 3]] = 0.5;
        logits[[0, 2, 0]] = 9.0;
        logits[[1, 0, 1]] = -0.1;
        logits[[1, 1, 1]] = 3.0;
        logits[[1, 2, 3]] = 2.0;
        let ids = greedy_decode(&logits);
        // [1, 0, 1] = -0.1 loses to the zeros, so the first zero (index 0) wins.
        assert_eq!(ids, vec![vec![2, 3, 0], vec![0, 1, 3]]);
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let logits = Array3::<f32>::from_elem((1, 1, 5), 0.25);
        assert_eq!(greedy_decode(&logits), vec![vec![0]]);
    }

    #[test]
    fn test_nan_never_selected() {
        let mut logits = Array3::<f32>::zeros((1, 1, 3));
        logits[[0, 0, 0]] = f32::NAN;
        logits[[0, 0, 2]] = 1.0;
        assert_eq!(greedy_decode(&logits), vec![vec![2]]);
    }

    #[test]
    fn test_empty_batch() {
        let logits = Array3::<f32>::zeros((0, 5, 4));
        assert!(greedy_decode(&logits).is_empty());
    }
}
