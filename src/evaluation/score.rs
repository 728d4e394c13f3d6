//! Levenshtein scoring of predicted InChI strings.

use crate::core::errors::{InchiError, InchiResult};
use crate::pipeline::EvaluationRow;
use serde::Serialize;

/// Character-level edit distance with unit insert, delete and substitute costs.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Mean edit distance between aligned truth and prediction strings.
///
/// # Errors
///
/// Returns `InvalidInput` when the two slices differ in length.
pub fn get_score<T: AsRef<str>, P: AsRef<str>>(y_true: &[T], y_pred: &[P]) -> InchiResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(InchiError::invalid_input(format!(
            "cannot score {} predictions against {} labels",
            y_pred.len(),
            y_true.len()
        )));
    }
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let total: usize = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| levenshtein(t.as_ref(), p.as_ref()))
        .sum();
    Ok(total as f64 / y_true.len() as f64)
}

/// The `InChI=1S/<formula>` part of an InChI string.
///
/// Strings with fewer than two `/`-separated fields are returned whole.
pub fn formula_prefix(inchi: &str) -> &str {
    match inchi.match_indices('/').nth(1) {
        Some((idx, _)) => &inchi[..idx],
        None => inchi,
    }
}

/// Summary of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    /// Mean distance over the full strings.
    pub mean_distance: f64,
    /// Mean distance over the formula prefixes.
    pub mean_formula_distance: f64,
    pub exact_matches: usize,
}

impl EvaluationReport {
    /// Share of predictions equal to their label.
    pub fn exact_match_rate(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.exact_matches as f64 / self.samples as f64
        }
    }
}

/// Scores joined evaluation rows.
pub fn evaluate(rows: &[EvaluationRow]) -> InchiResult<EvaluationReport> {
    let truth: Vec<&str> = rows.iter().map(|r| r.inchi.as_str()).collect();
    let pred: Vec<&str> = rows.iter().map(|r| r.inchi_predict.as_str()).collect();
    let mean_distance = get_score(&truth, &pred)?;

    let truth_formula: Vec<&str> = truth.iter().map(|s| formula_prefix(s)).collect();
    let pred_formula: Vec<&str> = pred.iter().map(|s| formula_prefix(s)).collect();
    let mean_formula_distance = get_score(&truth_formula, &pred_formula)?;

    let exact_matches = rows.iter().filter(|r| r.inchi == r.inchi_predict).count();

    Ok(EvaluationReport {
        samples: rows.len(),
        mean_distance,
        mean_formula_distance,
        exact_matches,
    })
}
