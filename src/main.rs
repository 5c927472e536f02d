//! Trains a classifier on a comma-delimited dataset (Iris layout by default:
//! four numeric features then a class name) and reports test-set error.
//!
//!   cargo run --release -- --data resources/iris.data

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backprop_nn::{evaluate, train_loop, Dataset, NetworkSpec, TrainConfig};

#[derive(Parser)]
#[command(name = "backprop-nn")]
#[command(about = "Train a feedforward network on a CSV dataset", long_about = None)]
struct Cli {
    /// Dataset file: numeric features followed by a class label per line
    #[arg(short, long)]
    data: PathBuf,

    /// Number of leading numeric columns
    #[arg(short, long, default_value_t = 4)]
    features: usize,

    /// Examples of each class used for training; the rest are for testing
    #[arg(long, default_value_t = 35)]
    train_per_class: usize,

    /// JSON network description (topology, activations, learning rate)
    #[arg(long)]
    network: Option<PathBuf>,

    /// JSON training configuration (epochs, batch size, shuffling)
    #[arg(long)]
    train: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let dataset = Dataset::load(&cli.data, cli.features)
        .with_context(|| format!("loading {}", cli.data.display()))?;
    let (train, test) = dataset.split_per_class(cli.train_per_class);
    info!(
        train = train.len(),
        test = test.len(),
        classes = ?dataset.class_names(),
        "dataset split"
    );

    let spec = match &cli.network {
        Some(path) => NetworkSpec::load_json(path)
            .with_context(|| format!("reading network spec {}", path.display()))?,
        None => NetworkSpec::new(vec![cli.features, 5, 5, dataset.class_count()]),
    };
    let config = match &cli.train {
        Some(path) => TrainConfig::load_json(path)
            .with_context(|| format!("reading training config {}", path.display()))?,
        None => TrainConfig::default(),
    };

    let mut network = spec.build()?;
    info!(topology = ?network.topology(), epochs = config.epochs, "training");
    train_loop(&mut network, train.inputs(), train.targets(), &config)?;

    let result = evaluate(&mut network, test.inputs(), test.targets())?;
    info!(
        mse = result.mse,
        accuracy = %format!("{:.1}%", result.accuracy * 100.0),
        "test set"
    );

    Ok(())
}
