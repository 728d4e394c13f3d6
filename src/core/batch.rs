//! Tensor aliases and batching helpers.

/// A 2-dimensional tensor represented as a 2D array of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 3-dimensional tensor represented as a 3D array of f32 values.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4-dimensional tensor represented as a 4D array of f32 values.
pub type Tensor4D = ndarray::Array4<f32>;

/// Splits a dataset into consecutive fixed-size batches.
///
/// The last batch may be shorter. Order is preserved, so concatenating the
/// per-batch outputs lines up with the input rows.
#[derive(Debug, Clone, Copy)]
pub struct BatchSampler {
    batch_size: usize,
}

impl BatchSampler {
    /// Creates a new sampler. A batch size of zero yields no batches.
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `len` items split into.
    pub fn num_batches(&self, len: usize) -> usize {
        if self.batch_size == 0 {
            0
        } else {
            len.div_ceil(self.batch_size)
        }
    }

    /// Creates an iterator over batches of data.
    pub fn batches<'a, T>(&self, data: &'a [T]) -> impl Iterator<Item = &'a [T]> {
        if self.batch_size == 0 {
            data.chunks(1).take(0)
        } else {
            data.chunks(self.batch_size).take(usize::MAX)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_keep_order_and_remainder() {
        let sampler = BatchSampler::new(3);
        let data: Vec<u32> = (0..7).collect();
        let batches: Vec<&[u32]> = sampler.batches(&data).collect();
        assert_eq!(batches, vec![&[0, 1, 2][..], &[3, 4, 5][..], &[6][..]]);
        assert_eq!(sampler.num_batches(data.len()), 3);
    }

    #[test]
    fn test_zero_batch_size_yields_nothing() {
        let sampler = BatchSampler::new(0);
        let data = [1, 2, 3];
        assert_eq!(sampler.batches(&data).count(), 0);
        assert_eq!(sampler.num_batches(data.len()), 0);
    }
}
