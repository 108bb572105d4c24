use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dqn_snake::config::{DEFAULT_CONFIG_PATH, ExperimentConfig, load_config};
use dqn_snake::modes::{
    DEFAULT_DEMO_CHECKPOINT, DEFAULT_EVAL_GAMES, DemoMode, EvaluateMode, TrainMode,
};
use dqn_snake::rl::{QNetworkConfig, QPolicy, TrainingBackend, default_device, load_metadata};

#[derive(Parser)]
#[command(name = "dqn_snake")]
#[command(version, about = "Snake game with a deep Q-learning agent")]
struct Cli {
    /// Experiment configuration (YAML or JSON)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a new agent
    Train {
        /// Number of games (defaults to NUM_GAMES from the config)
        #[arg(long)]
        games: Option<usize>,

        /// Games between progress reports (defaults to PLOT_INTERVAL)
        #[arg(long)]
        plot_interval: Option<usize>,
    },

    /// Evaluate a saved agent with exploration disabled
    Evaluate {
        /// Checkpoint to load (defaults to the experiment's checkpoint)
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Number of games
        #[arg(long, default_value_t = DEFAULT_EVAL_GAMES)]
        games: usize,
    },

    /// Record one game of a saved agent as an animated GIF
    Demo {
        /// Checkpoint file name inside MODELS_DIR
        #[arg(long, default_value = DEFAULT_DEMO_CHECKPOINT)]
        checkpoint_name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.config);
    let device = default_device();

    match cli.command {
        Command::Train {
            games,
            plot_interval,
        } => {
            let policy = QPolicy::<TrainingBackend>::from_config(&config.agent, device);
            let mut train_mode = TrainMode::new(policy, config.clone());
            if let Some(games) = games {
                train_mode = train_mode.with_num_games(games);
            }
            if let Some(plot_interval) = plot_interval {
                train_mode = train_mode.with_plot_interval(plot_interval);
            }

            let report = train_mode.run()?;
            info!(
                "Finished {} games: record {}, mean score {:.2}",
                report.games, report.record, report.mean_score
            );
        }
        Command::Evaluate { checkpoint, games } => {
            let path = checkpoint.clone().unwrap_or_else(|| config.checkpoint_path());
            let policy = inference_policy(&config, &path);
            let mut evaluate_mode =
                EvaluateMode::new(policy, &config, checkpoint.as_deref(), games)?;
            evaluate_mode.run();
        }
        Command::Demo { checkpoint_name } => {
            let policy = inference_policy(&config, &config.models_dir.join(&checkpoint_name));
            let mut demo_mode = DemoMode::new(policy, &config, &checkpoint_name)?;
            let report = demo_mode.run()?;
            info!("Demo score {} saved to {:?}", report.score, report.video);
        }
    }

    Ok(())
}

/// Policy shaped like the network stored at `checkpoint`, ready to load it
///
/// Falls back to the configured hidden width when the checkpoint cannot be
/// read; loading then reports the actual problem.
fn inference_policy(config: &ExperimentConfig, checkpoint: &Path) -> QPolicy<TrainingBackend> {
    let device = default_device();
    let network = match load_metadata::<TrainingBackend>(checkpoint, &device) {
        Ok(metadata) => metadata.network,
        Err(_) => QNetworkConfig::new(config.agent.hidden_size),
    };
    QPolicy::new(network, config.agent.learning_rate, device)
}

/// Load the configuration file, falling back to defaults when it is unusable
fn resolve_config(path: &Path) -> ExperimentConfig {
    match load_config(path) {
        Ok(Some(config)) => {
            info!("Loaded config {:?} (experiment '{}')", path, config.experiment_name);
            config
        }
        Ok(None) => {
            warn!("No usable config at {:?}; using defaults", path);
            ExperimentConfig::default()
        }
        Err(err) => {
            error!("{}; using defaults", err);
            ExperimentConfig::default()
        }
    }
}
