pub mod demo;
pub mod evaluate;
pub mod train;

pub use demo::{DEFAULT_DEMO_CHECKPOINT, DemoMode, DemoReport};
pub use evaluate::{DEFAULT_EVAL_GAMES, EvaluateMode};
pub use train::{TrainMode, TrainingReport};
