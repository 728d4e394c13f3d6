//! Command-line entry point.
//!
//! `evaluate` translates a seeded sample of labelled training images and scores
//! the predictions; `submit` translates every image of a submission template.

use clap::{Args, Parser, Subcommand};
use inchi_ocr::core::{
    InchiError, InchiResult, InferenceConfig, error_chain, init_tracing, parse_device,
};
use inchi_ocr::data::{
    ImageDataset, read_labels, read_submission_template, sample_records,
};
use inchi_ocr::evaluation::evaluate;
use inchi_ocr::models::{ModelPaths, OnnxAttentionDecoder, OnnxEncoder};
use inchi_ocr::pipeline::{
    InchiPredictor, join_predictions, write_evaluation_csv, write_submission_csv,
};
use inchi_ocr::utils::Vocabulary;
use inchi_ocr::utils::progress::set_quiet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "inchi-ocr")]
#[command(about = "Translate molecule images into InChI strings and score them")]
struct Cli {
    /// JSON file with inference settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device to run on: cpu, cuda, cuda:N, tensorrt or tensorrt:N.
    /// Overrides the execution providers of the config file; CPU when neither is set.
    #[arg(long, global = true)]
    device: Option<String>,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    #[arg(long, global = true)]
    batch_size: Option<usize>,

    #[arg(long, global = true)]
    num_workers: Option<usize>,

    /// Maximum decoded tokens per image
    #[arg(long, global = true)]
    max_len: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score predictions on a sample of labelled training images
    Evaluate {
        /// Labels CSV with `image_id,InChI` columns
        #[arg(long)]
        labels: PathBuf,

        /// Directory holding the `train/` image tree
        #[arg(long)]
        data_root: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Number of labelled rows to sample
        #[arg(long)]
        sample_size: Option<usize>,

        /// Sampling seed
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value = "submission_train.csv")]
        output: PathBuf,
    },
    /// Translate every image of a submission template
    Submit {
        /// Template CSV with an `image_id` column
        #[arg(long)]
        template: PathBuf,

        /// Directory holding the `test/` image tree
        #[arg(long)]
        data_root: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        #[arg(long, default_value = "submission.csv")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// Directory with `{model_name}_fold0_best_{encoder,decoder}.onnx`
    #[arg(long, required_unless_present_all = ["encoder", "decoder"])]
    checkpoint_dir: Option<PathBuf>,

    /// Encoder graph, overrides the checkpoint directory
    #[arg(long, requires = "decoder")]
    encoder: Option<PathBuf>,

    /// Decoder graph, overrides the checkpoint directory
    #[arg(long, requires = "encoder")]
    decoder: Option<PathBuf>,

    /// Vocabulary JSON (`{"stoi": {...}}`)
    #[arg(long)]
    vocab: PathBuf,
}

impl ModelArgs {
    fn resolve(&self, model_name: &str) -> InchiResult<ModelPaths> {
        match (&self.encoder, &self.decoder, &self.checkpoint_dir) {
            (Some(encoder), Some(decoder), _) => Ok(ModelPaths::new(encoder, decoder)),
            (_, _, Some(dir)) => ModelPaths::from_checkpoint_dir(dir, model_name),
            _ => Err(InchiError::invalid_input(
                "either --checkpoint-dir or both --encoder and --decoder are required",
            )),
        }
    }
}

/// Resolves the run settings: defaults, then the `--config` file, then flags.
fn load_config(cli: &Cli) -> InchiResult<InferenceConfig> {
    let mut config = match &cli.config {
        Some(path) => InferenceConfig::from_json_file(path)?,
        None => InferenceConfig::default(),
    };
    if let Some(batch_size) = cli.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(num_workers) = cli.num_workers {
        config = config.with_num_workers(num_workers);
    }
    if let Some(max_len) = cli.max_len {
        config = config.with_max_len(max_len);
    }
    if let Some(device) = &cli.device {
        let providers = parse_device(device)?;
        let ort_session = config
            .ort_session
            .take()
            .unwrap_or_default()
            .with_execution_providers(providers);
        config = config.with_ort_session(ort_session);
    }
    if let Command::Evaluate {
        sample_size, seed, ..
    } = &cli.command
    {
        if let Some(n) = sample_size {
            config = config.with_sample_size(*n);
        }
        if let Some(seed) = seed {
            config = config.with_seed(*seed);
        }
    }
    config.validate()?;
    Ok(config)
}

fn build_predictor(
    model: &ModelArgs,
    config: InferenceConfig,
) -> InchiResult<InchiPredictor<OnnxEncoder, OnnxAttentionDecoder>> {
    let paths = model.resolve(&config.model_name)?;
    let ort_session = config.ort_session.clone().unwrap_or_default();
    info!(
        encoder = %paths.encoder.display(),
        decoder = %paths.decoder.display(),
        "loading models"
    );
    let encoder = OnnxEncoder::builder()
        .ort_session(ort_session.clone())
        .build(&paths.encoder)?;
    let decoder = OnnxAttentionDecoder::builder()
        .ort_session(ort_session)
        .build(&paths.decoder)?;
    let vocab = Vocabulary::from_file(&model.vocab)?;
    InchiPredictor::new(encoder, decoder, vocab, config)
}

fn run_evaluate(
    config: InferenceConfig,
    labels: &Path,
    data_root: &Path,
    model: &ModelArgs,
    output: &Path,
) -> InchiResult<()> {
    let labels = read_labels(labels)?;
    let sample = sample_records(&labels, config.sample_size, config.seed);
    info!(sampled = sample.len(), seed = config.seed, "sampled labelled images");

    let dataset = ImageDataset::from_labels(data_root, &sample)?;
    let predictor = build_predictor(model, config)?;
    let predictions = predictor.predict_dataset(&dataset)?;

    let rows = join_predictions(&sample, predictions);
    write_evaluation_csv(output, &rows)?;

    let report = evaluate(&rows)?;
    info!(
        samples = report.samples,
        mean_distance = report.mean_distance,
        mean_formula_distance = report.mean_formula_distance,
        exact_matches = report.exact_matches,
        "evaluation finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_submit(
    config: InferenceConfig,
    template: &Path,
    data_root: &Path,
    model: &ModelArgs,
    output: &Path,
) -> InchiResult<()> {
    let records = read_submission_template(template)?;
    let dataset = ImageDataset::from_submission(data_root, &records)?;
    let predictor = build_predictor(model, config)?;
    let predictions = predictor.predict_dataset(&dataset)?;
    write_submission_csv(output, &predictions)?;
    info!(rows = predictions.len(), output = %output.display(), "submission written");
    Ok(())
}

fn run(cli: Cli) -> InchiResult<()> {
    set_quiet(cli.quiet);
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Evaluate {
            labels,
            data_root,
            model,
            output,
            ..
        } => run_evaluate(config, labels, data_root, model, output),
        Command::Submit {
            template,
            data_root,
            model,
            output,
        } => run_submit(config, template, data_root, model, output),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}
