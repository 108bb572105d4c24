//! Training mode for the DQN agent
//!
//! Runs whole games in a headless environment. Every step feeds a short-memory
//! update and the replay buffer; every finished game triggers a long-memory
//! update. The policy is checkpointed whenever a game sets a new record score,
//! and once more when the run completes.
//!
//! # Example
//!
//! ```rust,no_run
//! use dqn_snake::config::ExperimentConfig;
//! use dqn_snake::modes::TrainMode;
//! use dqn_snake::rl::{default_device, QPolicy, TrainingBackend};
//!
//! let config = ExperimentConfig::default();
//! let policy = QPolicy::<TrainingBackend>::from_config(&config.agent, default_device());
//!
//! let mut train_mode = TrainMode::new(policy, config);
//! let report = train_mode.run()?;
//! println!("Record: {}", report.record);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::config::ExperimentConfig;
use crate::metrics::{TrainingCurve, TrainingStats};
use crate::rl::{DqnAgent, Policy, SnakeEnvironment, Transition};

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Games played
    pub games: usize,

    /// Best score of the run
    pub record: u32,

    /// Mean score over all games
    pub mean_score: f32,

    /// Raw and running-mean score series
    pub curve: TrainingCurve,

    /// Final checkpoint, if it could be written
    pub checkpoint: Option<PathBuf>,

    /// Curve artifact, if it could be written
    pub curve_path: Option<PathBuf>,
}

/// Training mode for the DQN agent
pub struct TrainMode<P: Policy> {
    /// Agent being trained
    agent: DqnAgent<P>,

    /// Headless environment for experience collection
    env: SnakeEnvironment,

    /// Training statistics tracker
    stats: TrainingStats,

    config: ExperimentConfig,

    /// Episode budget (defaults to `NUM_GAMES`)
    num_games: usize,

    /// Games between progress log lines
    plot_interval: usize,

    show_progress: bool,
}

impl<P: Policy> TrainMode<P> {
    /// Create a new training mode around a freshly initialized policy
    ///
    /// `config` must have passed [`ExperimentConfig::validate`].
    pub fn new(policy: P, config: ExperimentConfig) -> Self {
        let agent = DqnAgent::new(policy, config.agent.clone(), config.seed);
        // Food placement and exploration draw from separate streams
        let env = SnakeEnvironment::headless(config.game.clone(), config.seed.wrapping_add(1));

        Self {
            agent,
            env,
            stats: TrainingStats::new(100),
            num_games: config.num_games,
            plot_interval: config.plot_interval.max(1),
            config,
            show_progress: true,
        }
    }

    /// Override the episode budget
    pub fn with_num_games(mut self, num_games: usize) -> Self {
        self.num_games = num_games;
        self
    }

    /// Override the progress log interval
    pub fn with_plot_interval(mut self, plot_interval: usize) -> Self {
        self.plot_interval = plot_interval.max(1);
        self
    }

    /// Enable or disable the terminal progress bar
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the training loop to completion
    pub fn run(&mut self) -> Result<TrainingReport> {
        self.log_header();

        let pb = if self.show_progress {
            let pb = ProgressBar::new(self.num_games as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .context("Invalid progress bar template")?
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for _ in 0..self.num_games {
            let (score, steps) = self.run_episode();
            let game = self.end_episode(score, steps);

            pb.set_message(format!("record {}", self.stats.record()));
            pb.inc(1);

            if game % self.plot_interval == 0 {
                info!("[Game {}/{}] {}", game, self.num_games, self.stats.format_summary());
            }
        }
        pb.finish_and_clear();

        let checkpoint = self.save_checkpoint("final");
        let curve = self.stats.curve(&self.config.experiment_name);
        let curve_path = self.config.curve_path();
        let curve_path = match curve.save(&curve_path) {
            Ok(()) => Some(curve_path),
            Err(err) => {
                error!("{:#}", err);
                None
            }
        };

        info!("Training complete: {}", self.stats.format_summary());

        Ok(TrainingReport {
            games: self.stats.total_episodes(),
            record: self.stats.record(),
            mean_score: self.stats.mean_score(),
            curve,
            checkpoint,
            curve_path,
        })
    }

    /// Play one game, learning after every step
    ///
    /// Returns the final score and the number of steps taken.
    fn run_episode(&mut self) -> (u32, usize) {
        self.env.reset();
        let mut steps = 0;

        loop {
            let state_old = self.agent.get_state(&self.env);
            let action = self.agent.get_action(&state_old);

            let (reward, done, score) = self.env.step(action);
            let state_new = self.agent.get_state(&self.env);
            steps += 1;

            let transition = Transition::new(state_old, action, reward, state_new, done);
            self.agent.train_short_memory(&transition);
            self.agent.remember(transition);

            if done {
                return (score, steps);
            }
        }
    }

    /// Bookkeeping after a game: long-memory update, stats and record checkpoint
    ///
    /// Returns the number of completed games.
    fn end_episode(&mut self, score: u32, steps: usize) -> usize {
        let game = self.agent.finish_episode();

        if let Some(loss) = self.agent.train_long_memory() {
            self.stats.record_loss(loss);
        }

        let is_record = self.stats.record_episode(score, steps);
        debug!(game, score, steps, epsilon = self.agent.epsilon(), "Game finished");

        if is_record {
            info!("New record {} at game {}", score, game);
            self.save_checkpoint("record");
        }

        game
    }

    /// Save the policy, logging instead of failing the run
    fn save_checkpoint(&self, reason: &str) -> Option<PathBuf> {
        let path = self.config.checkpoint_path();
        match self.agent.policy().save(&path) {
            Ok(()) => {
                info!("Checkpoint saved ({}): {:?}", reason, path);
                Some(path)
            }
            Err(err) => {
                error!("Failed to save checkpoint to {:?}: {:#}", path, err);
                None
            }
        }
    }

    fn log_header(&self) {
        let game = &self.config.game;
        let agent = &self.config.agent;
        info!(
            "DQN training '{}': {} games on a {}x{} grid",
            self.config.experiment_name, self.num_games, game.grid_width, game.grid_height
        );
        info!(
            "lr {} | gamma {} | memory {} | batch {} (min {}) | epsilon {} -> {} over {} games",
            agent.learning_rate,
            agent.gamma,
            agent.max_memory,
            agent.batch_size,
            agent.min_batch_size,
            agent.epsilon_start,
            agent.epsilon_min,
            agent.epsilon_decay_games
        );
        info!("Checkpoint: {:?}", self.config.checkpoint_path());
    }

    pub fn agent(&self) -> &DqnAgent<P> {
        &self.agent
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }
}
