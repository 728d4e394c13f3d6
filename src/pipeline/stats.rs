//! Timing statistics for an inference run.

use std::fmt;
use std::time::Duration;

/// Counts and timings accumulated over the batches of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Images translated so far.
    pub images: usize,
    /// Batches completed so far.
    pub batches: usize,
    /// Time spent loading and preprocessing images, in milliseconds.
    pub loading_ms: f64,
    /// Time spent in the encoder and decoder, in milliseconds.
    pub inference_ms: f64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one finished batch.
    pub fn record_batch(&mut self, images: usize, loading: Duration, inference: Duration) {
        self.images += images;
        self.batches += 1;
        self.loading_ms += loading.as_secs_f64() * 1000.0;
        self.inference_ms += inference.as_secs_f64() * 1000.0;
    }

    /// Mean encoder plus decoder time per image.
    pub fn inference_ms_per_image(&self) -> f64 {
        if self.images == 0 {
            0.0
        } else {
            self.inference_ms / self.images as f64
        }
    }

    /// Throughput over loading and inference together.
    pub fn images_per_second(&self) -> f64 {
        let total_ms = self.loading_ms + self.inference_ms;
        if total_ms == 0.0 {
            0.0
        } else {
            self.images as f64 * 1000.0 / total_ms
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images in {} batches, {:.2} ms/image inference, {:.1} images/sec",
            self.images,
            self.batches,
            self.inference_ms_per_image(),
            self.images_per_second()
        )
    }
}
