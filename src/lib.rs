//! DQN Snake - a Snake game and a deep Q-learning agent that learns to play it
//!
//! This library provides:
//! - Core game logic (game module)
//! - The environment, agent, replay buffer and Burn Q-network (rl module)
//! - Pixel frames and GIF recording for visible runs (render module)
//! - Training and evaluation statistics (metrics module)
//! - Experiment configuration (config module)
//! - The train, evaluate and demo harnesses (modes module)

pub mod config;
pub mod game;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
