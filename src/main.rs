//! heimdall binary entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heimdall::config::{ConfigLoader, HeimdallConfig, Service};
use heimdall::monitor::MonitorClient;
use heimdall::{logging, model, prediction, simulator};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "heimdall", version, about = "Astronaut telemetry anomaly pipeline")]
struct Cli {
    /// Configuration file (defaults to heimdall.toml or config/heimdall.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug" or "heimdall=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the prediction API
    ServePredict {
        /// Model artifact path
        #[arg(long)]
        model: Option<PathBuf>,

        /// Sigmoid sharpness for score normalization
        #[arg(long)]
        sharpness: Option<f64>,
    },

    /// Run the telemetry simulator
    ServeSimulator {
        /// Seed for reproducible readings
        #[arg(long)]
        seed: Option<u64>,

        /// Marker file mirroring the fault flag
        #[arg(long)]
        fault_marker: Option<PathBuf>,
    },

    /// Fit the anomaly model on the built-in healthy readings
    Train {
        /// Output artifact path
        #[arg(long, default_value = "model.json")]
        output: PathBuf,

        /// Forest RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Poll the simulator and score each reading
    Monitor {
        /// Stop after this many polls
        #[arg(long)]
        count: Option<u64>,

        /// Simulator base URL
        #[arg(long)]
        simulator_url: Option<String>,

        /// Prediction API base URL
        #[arg(long)]
        prediction_url: Option<String>,
    },

    /// Print an annotated sample configuration
    SampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::SampleConfig = cli.command {
        print!("{}", HeimdallConfig::sample_toml()?);
        return Ok(());
    }

    let mut loader = ConfigLoader::new()
        .load_from_file(cli.config.as_deref())
        .load_from_env();
    match cli.command {
        Command::ServePredict { .. } => loader = loader.for_service(Service::Prediction),
        Command::ServeSimulator { .. } => loader = loader.for_service(Service::Simulator),
        _ => {}
    }
    let mut config = loader.build()?;

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _guard = logging::init_logging(&config.logging)?;

    match cli.command {
        Command::ServePredict { model, sharpness } => {
            if let Some(model) = model {
                config.prediction.model_path = model;
            }
            if let Some(sharpness) = sharpness {
                config.prediction.sharpness = sharpness;
            }
            config.validate()?;
            prediction::serve(&config.prediction).await?;
        }
        Command::ServeSimulator { seed, fault_marker } => {
            if seed.is_some() {
                config.simulator.seed = seed;
            }
            if fault_marker.is_some() {
                config.simulator.fault_marker = fault_marker;
            }
            simulator::serve(&config.simulator).await?;
        }
        Command::Train { output, seed } => {
            let forest = model::train_default_model(seed)?;
            forest
                .save(&output)
                .with_context(|| format!("Failed to write model to {}", output.display()))?;
            info!(path = %output.display(), "model artifact written");
        }
        Command::Monitor {
            count,
            simulator_url,
            prediction_url,
        } => {
            if let Some(url) = simulator_url {
                config.monitor.simulator_url = url;
            }
            if let Some(url) = prediction_url {
                config.monitor.prediction_url = url;
            }
            let client = MonitorClient::new(config.monitor.clone())?;
            tokio::select! {
                summary = client.run(count) => {
                    info!(
                        attempts = summary.attempts,
                        successes = summary.successes,
                        failures = summary.failures,
                        alerts = summary.alerts,
                        "monitor finished"
                    );
                }
                _ = tokio::signal::ctrl_c() => info!("monitor interrupted"),
            }
        }
        Command::SampleConfig => {}
    }

    Ok(())
}
