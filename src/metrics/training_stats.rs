//! Training statistics tracking for DQN
//!
//! This module tracks training progress: the full per-game score series, the
//! running mean the training curve is drawn from, a rolling window for
//! progress logs, and long-memory losses.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

use crate::rl::persistence::write_atomic;

/// Training statistics tracker
///
/// Keeps every episode score (for the curve artifact) plus rolling windows
/// of recent episodes for smoothed progress output.
///
/// # Example
///
/// ```rust
/// use dqn_snake::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// // Record two games; the first positive score is a new record
/// assert!(stats.record_episode(3, 120));
/// assert!(!stats.record_episode(1, 40));
///
/// assert_eq!(stats.record(), 3);
/// assert_eq!(stats.mean_scores(), &[3.0, 2.0]);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Score of every completed game, in order
    scores: Vec<u32>,

    /// Mean of all scores so far, one entry per completed game
    mean_scores: Vec<f32>,

    /// Episode scores (rolling window)
    recent_scores: VecDeque<u32>,

    /// Episode lengths in steps (rolling window)
    recent_lengths: VecDeque<usize>,

    /// Long-memory losses (rolling window)
    recent_losses: VecDeque<f32>,

    total_score: u64,
    total_steps: usize,

    /// Best score seen so far
    record: u32,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping `window_size` recent values for rolling averages
    pub fn new(window_size: usize) -> Self {
        Self {
            scores: Vec::new(),
            mean_scores: Vec::new(),
            recent_scores: VecDeque::with_capacity(window_size),
            recent_lengths: VecDeque::with_capacity(window_size),
            recent_losses: VecDeque::with_capacity(window_size),
            total_score: 0,
            total_steps: 0,
            record: 0,
            window_size,
        }
    }

    /// Record the completion of a game
    ///
    /// Returns `true` when `score` strictly beats every earlier score.
    pub fn record_episode(&mut self, score: u32, length: usize) -> bool {
        self.scores.push(score);
        self.total_score += u64::from(score);
        self.total_steps += length;
        self.mean_scores
            .push(self.total_score as f32 / self.scores.len() as f32);

        Self::push_deque(&mut self.recent_scores, score, self.window_size);
        Self::push_deque(&mut self.recent_lengths, length, self.window_size);

        let is_record = score > self.record;
        if is_record {
            self.record = score;
        }
        is_record
    }

    /// Record a long-memory training loss
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_deque(&mut self.recent_losses, loss, self.window_size);
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn mean_scores(&self) -> &[f32] {
        &self.mean_scores
    }

    /// Best score seen so far (0 before any game)
    pub fn record(&self) -> u32 {
        self.record
    }

    /// Mean of every score recorded so far
    pub fn mean_score(&self) -> f32 {
        self.mean_scores.last().copied().unwrap_or(0.0)
    }

    /// Mean score over the rolling window
    pub fn rolling_mean_score(&self) -> f32 {
        if self.recent_scores.is_empty() {
            0.0
        } else {
            self.recent_scores.iter().sum::<u32>() as f32 / self.recent_scores.len() as f32
        }
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        if self.recent_lengths.is_empty() {
            0.0
        } else {
            self.recent_lengths.iter().sum::<usize>() as f32 / self.recent_lengths.len() as f32
        }
    }

    /// Mean long-memory loss over the rolling window
    pub fn mean_loss(&self) -> f32 {
        if self.recent_losses.is_empty() {
            0.0
        } else {
            self.recent_losses.iter().sum::<f32>() / self.recent_losses.len() as f32
        }
    }

    pub fn total_episodes(&self) -> usize {
        self.scores.len()
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// Output: `Games: 50 | Steps: 4210 | Record: 7 | Mean: 1.84 | Recent: 2.60 | Len: 84.2 | Loss: 3.1203`
    pub fn format_summary(&self) -> String {
        format!(
            "Games: {} | Steps: {} | Record: {} | Mean: {:.2} | Recent: {:.2} | Len: {:.1} | Loss: {:.4}",
            self.total_episodes(),
            self.total_steps,
            self.record,
            self.mean_score(),
            self.rolling_mean_score(),
            self.mean_episode_length(),
            self.mean_loss(),
        )
    }

    /// Score series for the curve artifact
    pub fn curve(&self, experiment_name: &str) -> TrainingCurve {
        TrainingCurve {
            experiment_name: experiment_name.to_string(),
            scores: self.scores.clone(),
            mean_scores: self.mean_scores.clone(),
        }
    }

    /// Helper function to push to a deque with size limit
    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

/// Raw and running-mean score series of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCurve {
    pub experiment_name: String,
    pub scores: Vec<u32>,
    pub mean_scores: Vec<f32>,
}

impl TrainingCurve {
    /// Write the curve as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize training curve")?;
        write_atomic(path, &json)
            .with_context(|| format!("Failed to save training curve to {:?}", path))
    }
}
