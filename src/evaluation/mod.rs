//! Scoring predictions against labels.

pub mod score;

pub use score::{EvaluationReport, evaluate, formula_prefix, get_score, levenshtein};
