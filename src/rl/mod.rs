//! Reinforcement learning side of the Snake game
//!
//! Provides:
//! - The episode environment wrapping the game engine
//! - 11-entry feature vectors describing danger, heading and food
//! - Experience replay and ε-greedy exploration
//! - A Burn Q-network behind the `Policy` trait, with checkpointing
//! - The DQN agent tying these together

pub mod agent;
pub mod backend;
pub mod config;
pub mod environment;
pub mod exploration;
pub mod features;
pub mod memory;
pub mod network;
pub mod persistence;
pub mod policy;

pub use agent::DqnAgent;
pub use backend::{TrainingBackend, default_device};
pub use config::AgentConfig;
pub use environment::{RenderMode, SnakeEnvironment};
pub use exploration::ExplorationSchedule;
pub use features::{FEATURE_COUNT, FeatureVector, extract_features};
pub use memory::{ReplayBuffer, Transition};
pub use network::{QNetwork, QNetworkConfig};
pub use persistence::{
    CheckpointError, CheckpointMetadata, checkpoint_path, load_checkpoint, load_metadata,
    run_name_from_path, save_checkpoint,
};
pub use policy::{ActionValues, Policy, QPolicy, best_action};
