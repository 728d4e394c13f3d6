//! CSV outputs of a run.

use super::inference::Prediction;
use crate::core::errors::InchiResult;
use crate::data::LabelRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A labelled image with its prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub image_id: String,
    #[serde(rename = "InChI")]
    pub inchi: String,
    #[serde(rename = "InChI_Predict")]
    pub inchi_predict: String,
}

/// Pairs labels with predictions by image id, in label order.
///
/// Labels without a prediction are dropped with a warning.
pub fn join_predictions(labels: &[LabelRecord], predictions: Vec<Prediction>) -> Vec<EvaluationRow> {
    let mut by_id: HashMap<String, String> = predictions
        .into_iter()
        .map(|p| (p.image_id, p.inchi))
        .collect();
    let rows: Vec<EvaluationRow> = labels
        .iter()
        .filter_map(|label| {
            by_id.remove(&label.image_id).map(|inchi_predict| EvaluationRow {
                image_id: label.image_id.clone(),
                inchi: label.inchi.clone(),
                inchi_predict,
            })
        })
        .collect();
    if rows.len() != labels.len() {
        tracing::warn!(
            labels = labels.len(),
            predicted = rows.len(),
            "some labelled images have no prediction"
        );
    }
    rows
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> InchiResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

/// Writes `image_id,InChI,InChI_Predict` rows.
pub fn write_evaluation_csv(path: impl AsRef<Path>, rows: &[EvaluationRow]) -> InchiResult<()> {
    write_rows(path.as_ref(), rows)
}

/// Writes `image_id,InChI` rows.
pub fn write_submission_csv(path: impl AsRef<Path>, rows: &[Prediction]) -> InchiResult<()> {
    write_rows(path.as_ref(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(id: &str, inchi: &str) -> Prediction {
        Prediction {
            image_id: id.into(),
            inchi: inchi.into(),
        }
    }

    #[test]
    fn test_submission_csv_quotes_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/submission.csv");
        write_submission_csv(
            &path,
            &[
                prediction("a1", "InChI=1S/CH4/h1H4"),
                prediction("b2", "InChI=1S/C2H6/c1-2/h1-2H3,1H"),
            ],
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "image_id,InChI\na1,InChI=1S/CH4/h1H4\nb2,\"InChI=1S/C2H6/c1-2/h1-2H3,1H\"\n"
        );
    }

    #[test]
    fn test_evaluation_csv_header_and_join() {
        let labels = vec![
            LabelRecord {
                image_id: "x".into(),
                inchi: "InChI=1S/H2O/h1H2".into(),
            },
            LabelRecord {
                image_id: "y".into(),
                inchi: "InChI=1S/CH4/h1H4".into(),
            },
        ];
        let rows = join_predictions(
            &labels,
            vec![
                prediction("y", "InChI=1S/CH4/h1H4"),
                prediction("x", "InChI=1S/H2O"),
            ],
        );
        assert_eq!(rows[0].image_id, "x");
        assert_eq!(rows[0].inchi_predict, "InChI=1S/H2O");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submission_train.csv");
        write_evaluation_csv(&path, &rows).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["image_id", "InChI", "InChI_Predict"]);
        let back: Vec<EvaluationRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_join_drops_unpredicted_labels() {
        let labels = vec![LabelRecord {
            image_id: "x".into(),
            inchi: "InChI=1S/H2O/h1H2".into(),
        }];
        assert!(join_predictions(&labels, Vec::new()).is_empty());
    }
}
