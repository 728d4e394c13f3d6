//! The inference loop: images to InChI strings.

use super::stats::RunStats;
use crate::core::config::InferenceConfig;
use crate::core::errors::{InchiError, InchiResult};
use crate::core::Tensor4D;
use crate::data::{DataLoader, ImageDataset};
use crate::models::{ImageEncoder, SequenceDecoder};
use crate::processors::{ImagePreprocessor, greedy_decode};
use crate::utils::Vocabulary;
use crate::utils::progress::progress_bar;
use serde::Serialize;
use std::time::Instant;

/// One translated image; serializes as a submission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub image_id: String,
    #[serde(rename = "InChI")]
    pub inchi: String,
}

/// Runs the encoder and decoder over batches and assembles InChI strings.
#[derive(Debug)]
pub struct InchiPredictor<E, D> {
    encoder: E,
    decoder: D,
    vocab: Vocabulary,
    config: InferenceConfig,
    preprocessor: ImagePreprocessor,
}

impl<E: ImageEncoder, D: SequenceDecoder> InchiPredictor<E, D> {
    /// Creates a predictor after checking the configuration and that the
    /// decoder's vocabulary size (when it declares one) matches `vocab`.
    pub fn new(
        encoder: E,
        decoder: D,
        vocab: Vocabulary,
        config: InferenceConfig,
    ) -> InchiResult<Self> {
        config.validate()?;
        if let Some(size) = decoder.vocab_size()
            && size != vocab.len()
        {
            return Err(InchiError::config_error(format!(
                "decoder produces {size} classes but the vocabulary has {} tokens",
                vocab.len()
            )));
        }
        let preprocessor = ImagePreprocessor::from_config(&config)?;
        Ok(Self {
            encoder,
            decoder,
            vocab,
            config,
            preprocessor,
        })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Translates one preprocessed `[N, 3, S, S]` batch.
    pub fn predict_batch(&self, images: &Tensor4D) -> InchiResult<Vec<String>> {
        let batch = images.shape()[0];
        if batch == 0 {
            return Ok(Vec::new());
        }

        let features = self.encoder.encode(images)?;
        let logits = self.decoder.predict(&features, self.config.max_len)?;

        let shape = logits.shape();
        if shape[0] != batch || shape[1] > self.config.max_len || shape[2] != self.vocab.len() {
            return Err(InchiError::shape_mismatch(
                "decode",
                &[batch, self.config.max_len, self.vocab.len()],
                shape,
                "decoder logits must be [batch, <= max_len, vocab]",
            ));
        }

        let sequences = greedy_decode(&logits);
        let captions = self.vocab.predict_captions(&sequences)?;
        Ok(captions
            .into_iter()
            .map(|text| format!("{}{text}", self.config.inchi_prefix))
            .collect())
    }

    /// Translates every image of `dataset`, in dataset order.
    pub fn predict_dataset(&self, dataset: &ImageDataset) -> InchiResult<Vec<Prediction>> {
        let loader = DataLoader::new(
            dataset,
            &self.preprocessor,
            self.config.batch_size,
            self.config.num_workers,
        )?;
        let pb = progress_bar(loader.num_batches() as u64, "predicting");
        let mut stats = RunStats::new();
        let mut predictions = Vec::with_capacity(dataset.len());

        let mut started = Instant::now();
        for batch in loader.iter() {
            let batch = batch?;
            let loaded = started.elapsed();

            let infer_start = Instant::now();
            let texts = self.predict_batch(&batch.images)?;
            let inferred = infer_start.elapsed();

            stats.record_batch(batch.image_ids.len(), loaded, inferred);
            tracing::debug!(
                batch = batch.index,
                images = batch.image_ids.len(),
                load_ms = loaded.as_millis() as u64,
                infer_ms = inferred.as_millis() as u64,
                "batch translated"
            );

            predictions.extend(
                batch
                    .image_ids
                    .into_iter()
                    .zip(texts)
                    .map(|(image_id, inchi)| Prediction { image_id, inchi }),
            );
            pb.inc(1);
            started = Instant::now();
        }
        pb.finish_and_clear();

        tracing::info!("{stats}");
        Ok(predictions)
    }
}
