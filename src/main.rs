use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use burn::module::AutodiffModule;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use binmlp::data::{
    BatchLoader, PreparedData, Split, Standardizer, TabularData, TabularItem, build_eval_loader,
    build_loader,
    load_and_prepare,
};
use binmlp::export::InstructionModel;
use binmlp::grid_search::{GridAxis, GridSearchConfig, grid_search};
use binmlp::training::{self, TrainingConfig};
use binmlp::{Backend, BinaryClassifier, BinaryClassifierConfig, InferenceBackend, Settings, plot};

type Device = <InferenceBackend as burn::tensor::backend::Backend>::Device;

/// Tolerance used when checking an export against its embedded validation rows.
const EXPORT_TOLERANCE: f32 = 1e-4;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    cli.command.run().context("Running the command")?;

    Ok(())
}

fn init_logger(verbose: bool) -> Result<()> {
    let level = if verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_rfc3339()
            .add_filter_allow("binmlp".to_owned())
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Train, evaluate and export a binary MLP classifier")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model and persist its weights.
    Train(TrainArgs),
    /// Sweep learning rate and gamma, retraining a fresh model for each pair.
    GridSearch(GridSearchArgs),
    /// Classify one row with a persisted model.
    Predict(PredictArgs),
    /// Write a persisted model as an instruction-graph JSON.
    Export(ExportArgs),
}

impl Commands {
    fn run(&self) -> Result<()> {
        match self {
            Self::Train(args) => args.run(),
            Self::GridSearch(args) => args.run(),
            Self::Predict(args) => args.run(),
            Self::Export(args) => args.run(),
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    /// JSON settings file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Write the loss/accuracy chart to this SVG file
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Skip persisting the weights and the standardizer
    #[arg(long)]
    no_save: bool,
}

impl TrainArgs {
    fn run(&self) -> Result<()> {
        let settings = load_settings(&self.config)?;
        let device = Device::default();
        let mut rng = seeded_rng(settings.seed);

        let PreparedData {
            feature_names,
            standardizer,
            split,
        } = load_and_prepare(&settings, &mut rng).context("Preparing the dataset")?;
        log::info!(
            "Loaded {} features: {} train, {} validation, {} test rows",
            feature_names.len(),
            split.train.len(),
            split.validation.len(),
            split.test.len()
        );

        let loaders = Loaders::new(split, &settings, &mut rng, &device);
        let model = BinaryClassifierConfig::from_settings(feature_names.len(), &settings)
            .init::<Backend>(&device)
            .context("Building the model")?;

        let config = TrainingConfig::from(&settings).plot_path(self.plot.clone());
        let result = training::train(model, &loaders.train, Some(&loaders.validation), &config)
            .context("Training")?;
        training::test(&result.model.valid(), &loaders.test, true);

        if self.no_save {
            return Ok(());
        }

        result
            .model
            .save_weights(settings.weights_path())
            .context("Saving the weights")?;
        log::info!("Saved weights to {}.mpk", settings.weights_path().display());
        if let Some(standardizer) = standardizer {
            standardizer
                .save(settings.standardizer_path())
                .context("Saving the standardizer")?;
            log::info!(
                "Saved standardizer to {}",
                settings.standardizer_path().display()
            );
        }

        Ok(())
    }
}

#[derive(Args)]
struct GridSearchArgs {
    /// JSON settings file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Learning rates as START:END:STEPS
    #[arg(long)]
    lr: GridAxis,

    /// Decay factors as START:END:STEPS
    #[arg(long)]
    gamma: GridAxis,

    /// Write the four result surfaces to this SVG file
    #[arg(long)]
    plot: Option<PathBuf>,
}

impl GridSearchArgs {
    fn run(&self) -> Result<()> {
        let settings = load_settings(&self.config)?;
        let device = Device::default();
        let mut rng = seeded_rng(settings.seed);

        let prepared = load_and_prepare(&settings, &mut rng).context("Preparing the dataset")?;
        let model_config = BinaryClassifierConfig::from_settings(prepared.feature_size(), &settings);
        let loaders = Loaders::new(prepared.split, &settings, &mut rng, &device);

        let grid = GridSearchConfig::new(self.lr, self.gamma);
        log::info!("Training {} models", grid.len());

        let report = grid_search(
            || model_config.init::<Backend>(&device),
            &loaders.train,
            Some(&loaders.validation),
            &loaders.test,
            &TrainingConfig::from(&settings),
            &grid,
        )
        .context("Running the grid search")?;

        if let Some(path) = &self.plot {
            plot::grid_surfaces(&report, path).context("Plotting the grid search")?;
            log::info!("Saved grid search surfaces to {}", path.display());
        }

        Ok(())
    }
}

#[derive(Args)]
struct PredictArgs {
    /// JSON settings file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Number of input features the model was trained with
    #[arg(short, long)]
    features: usize,

    /// Comma-separated raw feature values
    values: String,
}

impl PredictArgs {
    fn run(&self) -> Result<()> {
        let settings = load_settings(&self.config)?;
        let device = Device::default();

        let mut row = self
            .values
            .split(',')
            .map(|value| {
                value
                    .trim()
                    .parse::<f32>()
                    .with_context(|| format!("Parsing feature value {value:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if row.len() != self.features {
            bail!("Expected {} values, got {}", self.features, row.len());
        }

        if let Some(standardizer) = load_standardizer(&settings)? {
            standardizer.transform_row(&mut row)?;
        }

        let model = load_model(&settings, self.features, &device)?;
        let prediction = model.predict(&row, &device)?;
        println!(
            "class: {}, confidence: {:.4}",
            prediction.class, prediction.confidence
        );

        Ok(())
    }
}

#[derive(Args)]
struct ExportArgs {
    /// JSON settings file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Number of input features the model was trained with
    #[arg(short, long)]
    features: usize,

    /// Output JSON file
    #[arg(short, long, default_value = "model.json")]
    output: PathBuf,

    /// Embed this many rows of the dataset with their expected outputs
    #[arg(long, default_value_t = 0)]
    validation_rows: usize,
}

impl ExportArgs {
    fn run(&self) -> Result<()> {
        let settings = load_settings(&self.config)?;
        let device = Device::default();

        let model = load_model(&settings, self.features, &device)?;
        let standardizer = load_standardizer(&settings)?;

        let data = if self.validation_rows > 0 {
            Some(
                TabularData::from_csv(&settings.data_path, settings.delimiter_byte()?)
                    .context("Reading validation rows")?,
            )
        } else {
            None
        };
        let feature_names = data.as_ref().map(|data| data.feature_names());

        let mut export = model
            .to_instruction_model_info(feature_names, standardizer.as_ref())
            .context("Converting the model")?;
        if let Some(data) = &data {
            let rows = &data.features()[..self.validation_rows.min(data.len())];
            export.validation_data = Some(model.generate_validation_data(
                rows,
                standardizer.as_ref(),
                &device,
            )?);
        }

        let checked = InstructionModel::new(export.clone())?.check_validation_data(EXPORT_TOLERANCE)?;
        if checked > 0 {
            log::info!("Export reproduces {checked} validation rows");
        }

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(&self.output, json)
            .with_context(|| format!("Writing {}", self.output.display()))?;
        log::info!("Exported model to {}", self.output.display());

        Ok(())
    }
}

/// Per-split loaders; evaluation loaders live on the inference backend.
struct Loaders {
    train: BatchLoader<Backend>,
    validation: BatchLoader<InferenceBackend>,
    test: BatchLoader<InferenceBackend>,
}

impl Loaders {
    fn new(
        split: Split<TabularItem>,
        settings: &Settings,
        rng: &mut StdRng,
        device: &Device,
    ) -> Self {
        Self {
            train: build_loader(split.train, settings.train_batch_size, rng.next_u64(), device),
            validation: build_eval_loader(split.validation, settings.val_batch_size, device),
            test: build_eval_loader(split.test, settings.test_batch_size, device),
        }
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    Settings::from_file(path).with_context(|| format!("Loading settings from {}", path.display()))
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_model(
    settings: &Settings,
    features: usize,
    device: &Device,
) -> Result<BinaryClassifier<InferenceBackend>> {
    BinaryClassifierConfig::from_settings(features, settings)
        .init::<InferenceBackend>(device)
        .context("Building the model")?
        .load_weights(settings.weights_path(), device)
        .with_context(|| {
            format!(
                "Loading weights from {}.mpk",
                settings.weights_path().display()
            )
        })
}

fn load_standardizer(settings: &Settings) -> Result<Option<Standardizer>> {
    if !settings.standardize {
        return Ok(None);
    }
    let path = settings.standardizer_path();
    Standardizer::load(&path)
        .map(Some)
        .with_context(|| format!("Loading standardizer from {}", path.display()))
}
