use anyhow::{Context, Result};
use clap::Parser;
use neural_network::{NetworkConfig, OutputHead};
use std::fs;
use std::path::{Path, PathBuf};
use tickets::{
    Answer, EncodedTickets, EncoderMode, FEATURE_COLUMNS, LABEL_COLUMN, LabelEncoder, Task,
    TicketTable, complete_answers, encode_answers,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use training::prelude::*;

fn install_logger() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}

fn checkpoint_path(common: &CommonArgs) -> PathBuf {
    common
        .model_dir
        .join(common.preset.checkpoint_file_name())
}

fn load_table(path: &Path) -> Result<TicketTable> {
    let table = TicketTable::load(path)
        .with_context(|| format!("Failed to load tickets from {}", path.display()))?;
    info!(rows = table.len(), path = %path.display(), "loaded tickets");
    Ok(table)
}

fn train(args: TrainArgs) -> Result<()> {
    let common = &args.common;
    let table = load_table(&common.data)?;
    fs::create_dir_all(&common.model_dir).context("Failed to create model directory")?;

    let encoder = LabelEncoder::new(&common.model_dir);
    let task = Task::from(common.preset.head());
    let encoded = EncodedTickets::from_table(&table, &encoder, EncoderMode::Fit, task)
        .context("Failed to encode tickets")?;
    let split = encoded
        .split(args.validation_fraction, args.test_fraction, args.seed)
        .context("Failed to split tickets")?;

    let network_config = match &args.network_config {
        Some(path) => NetworkConfig::load(path).context("Failed to load network configuration")?,
        None => common.preset.network_config(),
    };
    if network_config.head != common.preset.head() {
        anyhow::bail!(
            "network configuration uses a {} head but preset {} needs {}",
            network_config.head,
            common.preset,
            common.preset.head()
        );
    }
    let mut training_config = match &args.config {
        Some(path) => TrainingConfig::load(path).context("Failed to load training configuration")?,
        None => common.preset.training_config(),
    };
    if args.no_progress {
        training_config.show_progress = false;
    }
    println!("{network_config}");

    let checkpoint = FileCheckpoint::new(checkpoint_path(common));
    let validation = (!split.validation.is_empty()).then_some(split.validation);
    let mut trainer = Trainer::new(
        &network_config,
        training_config.clone(),
        split.train,
        validation,
        Box::new(checkpoint),
    )
    .context("Failed to create trainer")?;

    let history = if args.minibatch {
        trainer.train_minibatch()
    } else {
        trainer.train()
    }
    .context("Failed to train network")?
    .clone();
    println!("\n{history}");
    save_training_history(&history, common)?;

    if split.test.is_empty() {
        return Ok(());
    }
    let evaluation = if history.checkpoints_written > 0 {
        Trainer::restore(&network_config, training_config, checkpoint_path(common))
            .context("Failed to restore best checkpoint")?
            .test_with(&split.test)
    } else {
        trainer.test_with(&split.test)
    }
    .context("Failed to evaluate test split")?;
    println!("Held-out test split:\n{evaluation}");
    Ok(())
}

/// Saves the training history next to the checkpoint
fn save_training_history(history: &TrainingHistory, common: &CommonArgs) -> Result<()> {
    let history_json =
        serde_json::to_string_pretty(history).context("Failed to serialize training history")?;
    let history_path = common
        .model_dir
        .join(format!("{}-history.json", common.preset));
    fs::write(&history_path, history_json).context("Failed to write training history file")?;
    info!(path = %history_path.display(), "saved training history");
    Ok(())
}

fn restore(common: &CommonArgs) -> Result<Trainer> {
    let path = checkpoint_path(common);
    Trainer::restore(
        &common.preset.network_config(),
        common.preset.training_config(),
        &path,
    )
    .with_context(|| format!("Failed to restore network from {}", path.display()))
}

fn test(common: CommonArgs) -> Result<()> {
    let table = load_table(&common.data)?;
    let encoder = LabelEncoder::new(&common.model_dir);
    let encoded = EncodedTickets::from_table(
        &table,
        &encoder,
        EncoderMode::Load,
        Task::from(common.preset.head()),
    )
    .context("Failed to encode tickets")?;

    let trainer = restore(&common)?;
    let evaluation = trainer
        .test_with(&encoded.dataset()?)
        .context("Failed to evaluate network")?;
    println!("{evaluation}");
    Ok(())
}

fn predict(common: CommonArgs, given: Vec<(String, Answer)>) -> Result<()> {
    let table = load_table(&common.data)?;
    let encoder = LabelEncoder::new(&common.model_dir);
    // majority answers come from the training data, encoded with the stored mappings
    let encoded = EncodedTickets::from_table(
        &table,
        &encoder,
        EncoderMode::Load,
        Task::from(common.preset.head()),
    )
    .context("Failed to encode tickets")?;

    let answers = complete_answers(&given, &encoded.feature_means())?;
    let used: Vec<String> = FEATURE_COLUMNS
        .iter()
        .zip(&answers)
        .map(|(name, answer)| format!("{name}={answer}"))
        .collect();
    println!("Inputs being used for prediction: {}", used.join(", "));

    let inputs = encode_answers(&answers, &encoder).context("Failed to encode answers")?;
    let trainer = restore(&common)?;
    let output = trainer.predict(&inputs).context("Failed to run network")?;

    match trainer.network().head() {
        OutputHead::Classification => {
            let class = output.argmax_rows().first().copied().unwrap_or_default();
            let team = encoder
                .decode(class, LABEL_COLUMN)
                .context("Failed to decode response team")?;
            println!(
                "Predicted response team: {team} (probability {:.3})",
                output.get(0, class).unwrap_or_default()
            );
        }
        OutputHead::Regression => {
            let days = output.get(0, 0).unwrap_or_default();
            println!("Predicted days to resolve: {days:.1}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    install_logger()?;
    let args = Args::parse();

    match args.command {
        Command::Train(train_args) => train(train_args).context("Failed to train network")?,
        Command::Test(common) => test(common).context("Failed to test network")?,
        Command::Predict { common, answers } => {
            predict(common, answers).context("Failed to predict")?
        }
    }

    Ok(())
}

#[derive(clap::Parser)]
#[command(name = "tickets", about = "Ticket routing neural networks", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CommonArgs {
    /// regression, classification-basic or classification-advanced
    #[arg(long, default_value = "classification-basic")]
    preset: Preset,

    /// Ticket CSV with a header row
    #[arg(long)]
    data: PathBuf,

    /// Directory holding checkpoints and label encoders
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,
}

#[derive(clap::Args)]
struct TrainArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Train in mini-batches (classification only)
    #[arg(long)]
    minibatch: bool,

    /// Training configuration JSON, overriding the preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Network configuration JSON, overriding the preset
    #[arg(long)]
    network_config: Option<PathBuf>,

    #[arg(long, default_value_t = 0.1)]
    validation_fraction: f64,

    #[arg(long, default_value_t = 0.1)]
    test_fraction: f64,

    /// Seed for the train/validation/test shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long)]
    no_progress: bool,
}

#[derive(clap::Subcommand)]
#[command(about = "Ticket routing network operations")]
enum Command {
    /// Train a preset and checkpoint its best parameters
    Train(TrainArgs),
    /// Evaluate a trained preset on a labelled CSV
    Test(CommonArgs),
    /// Predict for one ticket from yes/no answers
    Predict {
        #[command(flatten)]
        common: CommonArgs,

        /// Feature=yes|no, repeatable; unanswered features use the majority answer
        #[arg(long = "answer", value_parser = tickets::parse_assignment)]
        answers: Vec<(String, Answer)>,
    },
}
