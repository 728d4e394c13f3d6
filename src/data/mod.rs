//! Dataset access: label files, image paths, sampling and batched loading.

pub mod dataset;
pub mod labels;

pub use dataset::{DataLoader, DatasetItem, ImageBatch, ImageDataset};
pub use labels::{
    LabelRecord, Split, SubmissionRecord, read_labels, read_submission_template,
    sample_records, test_file_path, train_file_path,
};
