//! Evaluation mode: greedy rollouts of a saved policy
//!
//! Loads one checkpoint, disables exploration and plays a fixed number of
//! games without touching the replay buffer or the weights. The summary is
//! written to `<logs>/<run>_metrics.json`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::ExperimentConfig;
use crate::metrics::EvaluationSummary;
use crate::rl::{DqnAgent, ExplorationSchedule, Policy, SnakeEnvironment, run_name_from_path};

/// Games played when the caller does not ask for a specific count
pub const DEFAULT_EVAL_GAMES: usize = 10;

/// Evaluation mode for a trained policy
pub struct EvaluateMode<P: Policy> {
    agent: DqnAgent<P>,
    env: SnakeEnvironment,
    run_name: String,
    num_games: usize,
    metrics_path: PathBuf,
}

impl<P: Policy> EvaluateMode<P> {
    /// Load a checkpoint into `policy` and prepare a greedy run
    ///
    /// Without an explicit `checkpoint`, the experiment's own checkpoint is
    /// used. A missing checkpoint is an error; evaluation never falls back to
    /// untrained weights.
    pub fn new(
        mut policy: P,
        config: &ExperimentConfig,
        checkpoint: Option<&Path>,
        num_games: usize,
    ) -> Result<Self> {
        let (checkpoint, run_name) = match checkpoint {
            Some(path) => (path.to_path_buf(), run_name_from_path(path)),
            None => (config.checkpoint_path(), config.experiment_name.clone()),
        };

        policy
            .load(&checkpoint)
            .with_context(|| format!("Failed to load checkpoint {:?}", checkpoint))?;
        info!("Loaded checkpoint {:?}", checkpoint);

        let agent = DqnAgent::new(policy, config.agent.clone(), config.seed)
            .with_exploration(ExplorationSchedule::greedy());
        let env = SnakeEnvironment::headless(config.game.clone(), config.seed);

        Ok(Self {
            agent,
            env,
            metrics_path: config.metrics_path(&run_name),
            run_name,
            num_games,
        })
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn metrics_path(&self) -> &Path {
        &self.metrics_path
    }

    /// Play every game and persist the summary
    ///
    /// A failure to write the metrics file is logged; the summary is still
    /// returned.
    pub fn run(&mut self) -> EvaluationSummary {
        info!("Evaluating '{}' over {} games", self.run_name, self.num_games);

        let scores: Vec<u32> = (0..self.num_games)
            .map(|game| {
                let score = self.play_game();
                info!("Game {}/{}: score {}", game + 1, self.num_games, score);
                score
            })
            .collect();

        let summary = EvaluationSummary::from_scores(self.run_name.clone(), scores);
        info!("{}", summary.format_summary());

        match summary.save_metrics(&self.metrics_path) {
            Ok(()) => info!("Metrics saved to {:?}", self.metrics_path),
            Err(err) => error!("{:#}", err),
        }

        summary
    }

    /// One greedy game; returns the final score
    fn play_game(&mut self) -> u32 {
        self.env.reset();
        loop {
            let state = self.agent.get_state(&self.env);
            let action = self.agent.get_action(&state);
            let (_, done, score) = self.env.step(action);
            if done {
                return score;
            }
        }
    }
}
