//! Core game logic module for Snake
//!
//! This module contains all the game rules without any I/O or rendering dependencies.
//! It is driven by the RL environment for training, evaluation and demo recording.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{ACTION_COUNT, Direction, RelativeMove};
pub use config::GameConfig;
pub use engine::{GameEngine, StepInfo, StepResult, Termination};
pub use state::{CollisionType, GameState, Position, Snake};
