//! Image dataset and batched loader.

use super::labels::{LabelRecord, SubmissionRecord, Split, image_path};
use crate::core::batch::BatchSampler;
use crate::core::errors::{InchiError, InchiResult};
use crate::core::Tensor4D;
use crate::processors::ImagePreprocessor;
use crate::utils::load_images_batch_with_threshold;
use std::path::{Path, PathBuf};

/// One image to translate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    pub image_id: String,
    pub path: PathBuf,
}

/// Ordered list of images resolved against a data root.
#[derive(Debug, Clone, Default)]
pub struct ImageDataset {
    items: Vec<DatasetItem>,
}

impl ImageDataset {
    pub fn new(items: Vec<DatasetItem>) -> Self {
        Self { items }
    }

    /// Resolves labelled training rows to image paths.
    pub fn from_labels(root: &Path, records: &[LabelRecord]) -> InchiResult<Self> {
        Self::from_ids(root, Split::Train, records.iter().map(|r| r.image_id.as_str()))
    }

    /// Resolves submission-template rows to test image paths.
    pub fn from_submission(root: &Path, records: &[SubmissionRecord]) -> InchiResult<Self> {
        Self::from_ids(root, Split::Test, records.iter().map(|r| r.image_id.as_str()))
    }

    fn from_ids<'a>(
        root: &Path,
        split: Split,
        ids: impl Iterator<Item = &'a str>,
    ) -> InchiResult<Self> {
        let items = ids
            .map(|id| {
                Ok(DatasetItem {
                    image_id: id.to_string(),
                    path: image_path(root, split, id)?,
                })
            })
            .collect::<InchiResult<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }
}

/// A preprocessed batch ready for the encoder.
#[derive(Debug)]
pub struct ImageBatch {
    /// Position of the batch within the run.
    pub index: usize,
    /// Ids of the images, in tensor order.
    pub image_ids: Vec<String>,
    /// `[N, 3, size, size]` normalized images.
    pub images: Tensor4D,
}

/// Loads and preprocesses dataset images batch by batch on a dedicated thread pool.
pub struct DataLoader<'a> {
    dataset: &'a ImageDataset,
    preprocessor: &'a ImagePreprocessor,
    sampler: BatchSampler,
    pool: rayon::ThreadPool,
}

impl<'a> DataLoader<'a> {
    /// Creates a loader with `num_workers` threads.
    pub fn new(
        dataset: &'a ImageDataset,
        preprocessor: &'a ImagePreprocessor,
        batch_size: usize,
        num_workers: usize,
    ) -> InchiResult<Self> {
        if batch_size == 0 {
            return Err(InchiError::invalid_field("batch_size", "> 0", batch_size));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers.max(1))
            .thread_name(|i| format!("inchi-loader-{i}"))
            .build()
            .map_err(|e| InchiError::batch_processing("failed to start loader threads", e))?;
        Ok(Self {
            dataset,
            preprocessor,
            sampler: BatchSampler::new(batch_size),
            pool,
        })
    }

    /// Number of batches the dataset splits into.
    pub fn num_batches(&self) -> usize {
        self.sampler.num_batches(self.dataset.len())
    }

    /// Reads and preprocesses one batch of items on the loader's pool.
    pub fn load_batch(&self, index: usize, items: &[DatasetItem]) -> InchiResult<ImageBatch> {
        let paths: Vec<&Path> = items.iter().map(|item| item.path.as_path()).collect();
        let images = self.pool.install(|| {
            let raw = load_images_batch_with_threshold(&paths, None)?;
            self.preprocessor.preprocess_batch(raw)
        })?;
        Ok(ImageBatch {
            index,
            image_ids: items.iter().map(|item| item.image_id.clone()).collect(),
            images,
        })
    }

    /// Iterates over preprocessed batches in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = InchiResult<ImageBatch>> + '_ {
        self.sampler
            .batches(self.dataset.items())
            .enumerate()
            .map(move |(index, items)| self.load_batch(index, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::InferenceConfig;
    use image::{GrayImage, Luma};

    fn write_dataset(root: &Path, ids: &[&str]) -> ImageDataset {
        let records: Vec<LabelRecord> = ids
            .iter()
            .map(|id| LabelRecord {
                image_id: id.to_string(),
                inchi: "InChI=1S/CH4/h1H4".to_string(),
            })
            .collect();
        let dataset = ImageDataset::from_labels(root, &records).unwrap();
        for item in dataset.items() {
            std::fs::create_dir_all(item.path.parent().unwrap()).unwrap();
            GrayImage::from_pixel(30, 20, Luma([255]))
                .save(&item.path)
                .unwrap();
        }
        dataset
    }

    #[test]
    fn test_from_submission_uses_test_tree() {
        let records = vec![SubmissionRecord {
            image_id: "abc123".into(),
        }];
        let dataset = ImageDataset::from_submission(Path::new("/r"), &records).unwrap();
        assert_eq!(dataset.items()[0].path, PathBuf::from("/r/test/a/b/c/abc123.png"));
    }

    #[test]
    fn test_loader_batches_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = write_dataset(dir.path(), &["aaa1", "bbb2", "ccc3", "ddd4", "eee5"]);
        let config = InferenceConfig::new().with_size(8);
        let pre = ImagePreprocessor::from_config(&config).unwrap();
        let loader = DataLoader::new(&dataset, &pre, 2, 2).unwrap();
        assert_eq!(loader.num_batches(), 3);

        let batches: Vec<ImageBatch> = loader.iter().collect::<InchiResult<_>>().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].image_ids, vec!["aaa1", "bbb2"]);
        assert_eq!(batches[2].image_ids, vec!["eee5"]);
        assert_eq!(batches[2].index, 2);
        assert_eq!(batches[0].images.shape(), &[2, 3, 8, 8]);
        assert_eq!(batches[2].images.shape(), &[1, 3, 8, 8]);
    }

    #[test]
    fn test_loader_reports_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = ImageDataset::new(vec![DatasetItem {
            image_id: "zzz9".into(),
            path: dir.path().join("missing.png"),
        }]);
        let pre = ImagePreprocessor::from_config(&InferenceConfig::new().with_size(8)).unwrap();
        let loader = DataLoader::new(&dataset, &pre, 4, 1).unwrap();
        let first = loader.iter().next().unwrap();
        assert!(matches!(first, Err(InchiError::ImageLoad { .. })));
    }

    #[test]
    fn test_loader_rejects_zero_batch_size() {
        let dataset = ImageDataset::default();
        let pre = ImagePreprocessor::from_config(&InferenceConfig::new()).unwrap();
        assert!(DataLoader::new(&dataset, &pre, 0, 1).is_err());
    }
}
