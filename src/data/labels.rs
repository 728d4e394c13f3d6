//! Label and submission-template CSV files.
//!
//! `train_labels.csv` has the header `image_id,InChI`; the submission template
//! `sample_submission.csv` has at least an `image_id` column. Images live in a
//! three-level directory tree keyed by the first three characters of the id.

use crate::core::errors::{InchiError, InchiResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One labelled training image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub image_id: String,
    #[serde(rename = "InChI")]
    pub inchi: String,
}

/// One row of a submission template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionRecord {
    pub image_id: String,
}

/// Which image tree an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> InchiResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        InchiError::invalid_input(format!("Failed to open '{}': {e}", path.display()))
    })?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}

/// Reads `image_id,InChI` rows.
pub fn read_labels(path: impl AsRef<Path>) -> InchiResult<Vec<LabelRecord>> {
    let path = path.as_ref();
    let records: Vec<LabelRecord> = read_csv(path)?;
    tracing::info!(path = %path.display(), rows = records.len(), "read labels");
    Ok(records)
}

/// Reads the image ids of a submission template.
pub fn read_submission_template(path: impl AsRef<Path>) -> InchiResult<Vec<SubmissionRecord>> {
    let path = path.as_ref();
    let records: Vec<SubmissionRecord> = read_csv(path)?;
    tracing::info!(path = %path.display(), rows = records.len(), "read submission template");
    Ok(records)
}

/// Path of an image: `{root}/{split}/{id[0]}/{id[1]}/{id[2]}/{id}.png`.
///
/// # Errors
///
/// Returns `InvalidInput` for ids shorter than three characters.
pub fn image_path(root: &Path, split: Split, image_id: &str) -> InchiResult<PathBuf> {
    let mut chars = image_id.chars();
    let (Some(a), Some(b), Some(c)) = (chars.next(), chars.next(), chars.next()) else {
        return Err(InchiError::invalid_input(format!(
            "image id '{image_id}' is shorter than three characters"
        )));
    };
    Ok(root
        .join(split.dir_name())
        .join(a.to_string())
        .join(b.to_string())
        .join(c.to_string())
        .join(format!("{image_id}.png")))
}

pub fn train_file_path(root: &Path, image_id: &str) -> InchiResult<PathBuf> {
    image_path(root, Split::Train, image_id)
}

pub fn test_file_path(root: &Path, image_id: &str) -> InchiResult<PathBuf> {
    image_path(root, Split::Test, image_id)
}

/// Draws `n` records without replacement, reproducibly for a given seed.
///
/// When `n` is at least the number of records, every record is returned in a
/// shuffled order.
pub fn sample_records<T: Clone>(records: &[T], n: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    if n >= records.len() {
        let mut all = records.to_vec();
        all.shuffle(&mut rng);
        return all;
    }
    records.choose_multiple(&mut rng, n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn labels_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "image_id,InChI").unwrap();
        writeln!(file, "000011a64c74,\"InChI=1S/C13H20OS/c1-9(2)8-15-13-6-5-10(3)7-12(13)11(4)14/h5-7,9,11,14H,8H2,1-4H3\"").unwrap();
        writeln!(file, "000019cc0cd2,\"InChI=1S/C21H30O4/c1-12(22)25-14-6-8-20(2)13(10-14)5-7-15-16(20)9-17(23)21(3)18(15)11-19(21)24/h13-16,18-19H,5-11H2,1-3H3\"").unwrap();
        writeln!(file, "0000252b6d2b,\"InChI=1S/C24H23N5O4/c1-14-13-15(7-8-17(14)28-12-10-20(30)26-24(28)32)27-11-9-16(22(27)31)19-6-4-5-18-21(19)29(3)25-23(18)2/h4-8,13H,9-12H2,1-3H3,(H,26,30,32)\"").unwrap();
        file
    }

    #[test]
    fn test_read_labels() {
        let file = labels_file();
        let records = read_labels(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].image_id, "000011a64c74");
        assert!(records[0].inchi.starts_with("InChI=1S/C13H20OS/"));
        assert!(records[2].inchi.ends_with("(H,26,30,32)"));
    }

    #[test]
    fn test_read_labels_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "image_id\nabc").unwrap();
        let err = read_labels(file.path()).unwrap_err();
        assert!(matches!(err, InchiError::Csv(_)));
        assert!(crate::core::error_chain(&err).contains("InChI"));
    }

    #[test]
    fn test_read_submission_template_ignores_extra_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "image_id,InChI").unwrap();
        writeln!(file, "00000d2a601c,InChI=1S/H2O/h1H2").unwrap();
        writeln!(file, "00001f7fc849,InChI=1S/H2O/h1H2").unwrap();
        let records = read_submission_template(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                SubmissionRecord { image_id: "00000d2a601c".into() },
                SubmissionRecord { image_id: "00001f7fc849".into() },
            ]
        );
    }

    #[test]
    fn test_image_paths() {
        let root = Path::new("/data/bms");
        assert_eq!(
            train_file_path(root, "000011a64c74").unwrap(),
            PathBuf::from("/data/bms/train/0/0/0/000011a64c74.png")
        );
        assert_eq!(
            test_file_path(root, "abcdef").unwrap(),
            PathBuf::from("/data/bms/test/a/b/c/abcdef.png")
        );
        assert!(train_file_path(root, "ab").is_err());
    }

    #[test]
    fn test_sample_is_deterministic_and_unique() {
        let data: Vec<u32> = (0..100).collect();
        let a = sample_records(&data, 10, 42);
        let b = sample_records(&data, 10, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        let mut sorted = a.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 10);
    }

    #[test]
    fn test_sample_larger_than_data_returns_all() {
        let data: Vec<u32> = (0..5).collect();
        let mut sampled = sample_records(&data, 50, 1);
        assert_eq!(sampled.len(), 5);
        sampled.sort();
        assert_eq!(sampled, data);
    }
}
