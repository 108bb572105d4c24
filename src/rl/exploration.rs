use serde::{Deserialize, Serialize};

/// Linear ε decay over completed games, floored at a minimum rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    /// ε before the first completed game
    pub start: f64,
    /// Lower bound reached after `decay_games` games
    pub min: f64,
    /// Number of games over which ε falls from `start` to `min`
    pub decay_games: usize,
}

impl ExplorationSchedule {
    pub fn new(start: f64, min: f64, decay_games: usize) -> Self {
        Self {
            start,
            min,
            decay_games,
        }
    }

    /// Schedule that never explores
    pub fn greedy() -> Self {
        Self::new(0.0, 0.0, 0)
    }

    /// Exploration probability after `n_games` completed games
    pub fn epsilon(&self, n_games: usize) -> f64 {
        if self.decay_games == 0 || n_games >= self.decay_games {
            return self.min;
        }
        let progress = n_games as f64 / self.decay_games as f64;
        (self.start + (self.min - self.start) * progress).max(self.min)
    }
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self::new(0.4, 0.01, 80)
    }
}
