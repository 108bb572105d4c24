//! Experiment configuration
//!
//! One flat document of upper-case keys describes a run: naming and output
//! directories, the game rules, and the agent hyperparameters. Loaded once at
//! startup and passed by reference to every harness.
//!
//! ```yaml
//! EXPERIMENT_NAME: v1_production
//! NUM_GAMES: 500
//! GRID_WIDTH: 20
//! LEARNING_RATE: 0.001
//! GAMMA: 0.9
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::GameConfig;
use crate::rl::{AgentConfig, checkpoint_path};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "./configs/dqn_baseline.yaml";

/// Errors raised while loading a configuration file that does exist
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete description of one experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ExperimentConfig {
    /// Namespaces checkpoint, metric and curve file names
    pub experiment_name: String,

    /// Training episode budget
    pub num_games: usize,

    /// Games between progress log lines during training
    pub plot_interval: usize,

    /// Seed for food placement, exploration and replay sampling
    pub seed: u64,

    pub models_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub videos_dir: PathBuf,

    #[serde(flatten)]
    pub game: GameConfig,

    #[serde(flatten)]
    pub agent: AgentConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            experiment_name: "default".to_string(),
            num_games: 200,
            plot_interval: 50,
            seed: 0,
            models_dir: PathBuf::from("./models"),
            logs_dir: PathBuf::from("./logs"),
            videos_dir: PathBuf::from("./videos"),
            game: GameConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Check every section, reporting the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.experiment_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "EXPERIMENT_NAME must not be empty".to_string(),
            ));
        }
        if self.num_games == 0 {
            return Err(ConfigError::Invalid(
                "NUM_GAMES must be at least 1".to_string(),
            ));
        }
        if self.plot_interval == 0 {
            return Err(ConfigError::Invalid(
                "PLOT_INTERVAL must be at least 1".to_string(),
            ));
        }
        self.game.validate().map_err(ConfigError::Invalid)?;
        self.agent.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Checkpoint written by training and read by default evaluation
    pub fn checkpoint_path(&self) -> PathBuf {
        checkpoint_path(&self.models_dir, &self.experiment_name)
    }

    /// `<logs>/<run_name>_metrics.json`
    pub fn metrics_path(&self, run_name: &str) -> PathBuf {
        self.logs_dir.join(format!("{run_name}_metrics.json"))
    }

    /// `<logs>/graphs/<experiment>_curve.json`
    pub fn curve_path(&self) -> PathBuf {
        self.logs_dir
            .join("graphs")
            .join(format!("{}_curve.json", self.experiment_name))
    }
}

#[derive(Debug, Clone, Copy)]
enum ConfigFormat {
    Yaml,
    Json,
}

/// Load an experiment configuration
///
/// Returns `Ok(None)` when the file does not exist or its extension is not
/// `.yaml`, `.yml` or `.json`; callers then fall back to their defaults.
/// A file that exists but cannot be read, parsed or validated is an error.
pub fn load_config(path: &Path) -> Result<Option<ExperimentConfig>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    let format = match extension.as_deref() {
        Some("yaml") | Some("yml") => ConfigFormat::Yaml,
        Some("json") => ConfigFormat::Json,
        _ => return Ok(None),
    };

    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str::<ExperimentConfig>(&text).map_err(|err| err.to_string())
        }
        ConfigFormat::Json => {
            serde_json::from_str::<ExperimentConfig>(&text).map_err(|err| err.to_string())
        }
    };
    let config = parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    config.validate()?;
    Ok(Some(config))
}
