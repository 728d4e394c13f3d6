//! The end-to-end translation loop and its outputs.

pub mod inference;
pub mod output;
pub mod stats;

pub use inference::{InchiPredictor, Prediction};
pub use output::{EvaluationRow, join_predictions, write_evaluation_csv, write_submission_csv};
pub use stats::RunStats;
