use serde::{Deserialize, Serialize};

/// Configuration for the game rules and rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Rewards
    /// Reward for eating food
    pub food_reward: f32,
    /// Reward added to every non-terminal step (shaping, zero by default)
    pub step_reward: f32,
    /// Reward for dying or being truncated
    pub death_penalty: f32,

    /// Steps allowed without eating, per body segment, before truncation
    pub stall_factor: usize,

    /// Side length in pixels of one grid cell in visible mode
    pub block_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            food_reward: 10.0,
            step_reward: 0.0,
            death_penalty: -10.0,
            stall_factor: 100,
            block_size: 20,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Step budget without food for a snake of the given length
    pub fn stall_limit(&self, snake_length: usize) -> usize {
        snake_length.saturating_mul(self.stall_factor)
    }

    /// Check that the board can hold the starting snake and food
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        // The snake starts at the centre extending left
        if self.initial_snake_length > self.grid_width / 2 + 1 {
            return Err(format!(
                "initial_snake_length ({}) does not fit a grid of width {}",
                self.initial_snake_length, self.grid_width
            ));
        }

        if self.grid_width * self.grid_height <= self.initial_snake_length {
            return Err("grid has no room for food".to_string());
        }

        if self.stall_factor == 0 {
            return Err("stall_factor must be at least 1".to_string());
        }

        if self.block_size == 0 {
            return Err("block_size must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.stall_factor, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
    }

    #[test]
    fn test_stall_limit_scales_with_length() {
        let config = GameConfig::default();
        assert_eq!(config.stall_limit(3), 300);
        assert_eq!(config.stall_limit(4), 400);
    }

    #[test]
    fn test_validation_rejects_snake_wider_than_board() {
        let mut config = GameConfig::new(4, 4);
        config.initial_snake_length = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stall_limit_saturates() {
        let mut config = GameConfig::default();
        config.stall_factor = usize::MAX;
        assert!(config.validate().is_ok());
        assert_eq!(config.stall_limit(3), usize::MAX);
        assert_eq!(GameConfig::default().stall_limit(3), 300);
    }

    #[test]
    fn test_validation_rejects_zero_stall_factor() {
        let mut config = GameConfig::default();
        config.stall_factor = 0;
        assert!(config.validate().is_err());
    }
}
