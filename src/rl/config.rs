//! DQN agent hyperparameter configuration

use serde::{Deserialize, Serialize};

use super::exploration::ExplorationSchedule;

/// Configuration for the DQN agent
///
/// All hyperparameters used by the agent, its replay buffer and its policy
/// network. Keys are upper-case in configuration files so they can sit next
/// to `EXPERIMENT_NAME` and friends.
///
/// # Example
///
/// ```rust
/// use dqn_snake::rl::AgentConfig;
///
/// let config = AgentConfig {
///     learning_rate: 1e-3,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct AgentConfig {
    /// Learning rate for the Adam optimizer
    ///
    /// Default: 0.001
    #[serde(alias = "LR")]
    pub learning_rate: f64,

    /// Discount factor for bootstrapped targets
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Replay buffer capacity
    ///
    /// Default: 100_000
    pub max_memory: usize,

    /// Largest batch drawn for a long-memory update
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Below this many stored transitions, long-memory trains on the whole buffer
    ///
    /// Default: 1000
    pub min_batch_size: usize,

    /// Width of the hidden layer
    ///
    /// Default: 256
    pub hidden_size: usize,

    /// Exploration probability before the first completed game
    ///
    /// Default: 0.4
    pub epsilon_start: f64,

    /// Exploration floor
    ///
    /// Default: 0.01
    pub epsilon_min: f64,

    /// Games over which exploration decays linearly to the floor
    ///
    /// Default: 80
    pub epsilon_decay_games: usize,
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exploration schedule described by this config
    pub fn exploration(&self) -> ExplorationSchedule {
        ExplorationSchedule::new(
            self.epsilon_start,
            self.epsilon_min,
            self.epsilon_decay_games,
        )
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(format!("gamma must be in (0, 1), got {}", self.gamma));
        }

        if self.max_memory == 0 {
            return Err("max_memory must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.min_batch_size > self.batch_size {
            return Err(format!(
                "min_batch_size ({}) cannot exceed batch_size ({})",
                self.min_batch_size, self.batch_size
            ));
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        for (name, value) in [
            ("epsilon_start", self.epsilon_start),
            ("epsilon_min", self.epsilon_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0, 1], got {value}"));
            }
        }

        if self.epsilon_min > self.epsilon_start {
            return Err(format!(
                "epsilon_min ({}) cannot exceed epsilon_start ({})",
                self.epsilon_min, self.epsilon_start
            ));
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            gamma: 0.9,
            max_memory: 100_000,
            batch_size: 1000,
            min_batch_size: 1000,
            hidden_size: 256,
            epsilon_start: 0.4,
            epsilon_min: 0.01,
            epsilon_decay_games: 80,
        }
    }
}
