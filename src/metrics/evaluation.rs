//! Summary statistics of an evaluation run

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rl::persistence::write_atomic;

/// Per-run score statistics, persisted as a flat JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub experiment_name: String,
    pub mean_score: f64,
    pub max_score: u32,
    pub min_score: u32,
    /// Population standard deviation
    pub std_dev: f64,
    pub raw_scores: Vec<u32>,
}

impl EvaluationSummary {
    /// Aggregate per-game scores; an empty run yields all zeros
    pub fn from_scores(experiment_name: impl Into<String>, scores: Vec<u32>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
        let variance = scores
            .iter()
            .map(|&s| (f64::from(s) - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            experiment_name: experiment_name.into(),
            mean_score: mean,
            max_score: scores.iter().copied().max().unwrap_or(0),
            min_score: scores.iter().copied().min().unwrap_or(0),
            std_dev: variance.sqrt(),
            raw_scores: scores,
        }
    }

    /// Write the summary as pretty JSON, creating parent directories
    pub fn save_metrics(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(self).context("Failed to serialize evaluation metrics")?;
        write_atomic(path, &json)
            .with_context(|| format!("Failed to save evaluation metrics to {:?}", path))
    }

    /// One-line human readable report
    pub fn format_summary(&self) -> String {
        format!(
            "{}: {} games | Mean: {:.2} | Max: {} | Min: {} | Std: {:.2}",
            self.experiment_name,
            self.raw_scores.len(),
            self.mean_score,
            self.max_score,
            self.min_score,
            self.std_dev,
        )
    }
}
