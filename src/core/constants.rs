//! Constants used throughout the translation pipeline.
//!
//! Defaults mirror the settings the pretrained ResNet34 + attention LSTM
//! checkpoint was trained with.

/// Maximum number of tokens the decoder emits per image.
pub const DEFAULT_MAX_LEN: usize = 275;

/// Square side length the encoder expects.
pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// Images per forward pass.
pub const DEFAULT_BATCH_SIZE: usize = 512;

/// Threads used for loading and preprocessing images.
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// Seed for the training-set sample.
pub const DEFAULT_SEED: u64 = 42;

/// Number of labelled images scored by an evaluation run.
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Encoder backbone the checkpoint was trained with.
pub const DEFAULT_MODEL_NAME: &str = "resnet34";

/// Prefix shared by every standard InChI; the decoder only predicts what follows it.
pub const INCHI_PREFIX: &str = "InChI=1S/";

/// ImageNet channel means used by the encoder's normalization.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations used by the encoder's normalization.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Start-of-sequence token.
pub const SOS_TOKEN: &str = "<sos>";

/// End-of-sequence token.
pub const EOS_TOKEN: &str = "<eos>";

/// Padding token.
pub const PAD_TOKEN: &str = "<pad>";

/// Minimum number of images before loading switches to the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;
