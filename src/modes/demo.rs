//! Demo mode: record one greedy game of a saved policy as an animated GIF

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::ExperimentConfig;
use crate::render::VideoRecorder;
use crate::rl::{DqnAgent, ExplorationSchedule, Policy, RenderMode, SnakeEnvironment};

/// Checkpoint recorded when none is named
pub const DEFAULT_DEMO_CHECKPOINT: &str = "dqn_v1_production.mpk";

/// Playback rate of demo videos
pub const DEMO_FPS: u32 = 15;

/// Result of a recorded demo game
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub score: u32,
    pub steps: usize,
    pub frames: usize,
    pub video: PathBuf,
}

/// Plays exactly one visible, greedy game and saves the recording
pub struct DemoMode<P: Policy> {
    agent: DqnAgent<P>,
    env: SnakeEnvironment,
    recorder: VideoRecorder,
    video_path: PathBuf,
}

impl<P: Policy> DemoMode<P> {
    /// Load `<models>/<checkpoint_name>` into `policy`
    pub fn new(mut policy: P, config: &ExperimentConfig, checkpoint_name: &str) -> Result<Self> {
        let checkpoint = config.models_dir.join(checkpoint_name);
        policy
            .load(&checkpoint)
            .with_context(|| format!("Failed to load checkpoint {:?}", checkpoint))?;
        info!("Loaded checkpoint {:?}", checkpoint);

        let stem = Path::new(checkpoint_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| checkpoint_name.to_string());

        Ok(Self {
            agent: DqnAgent::new(policy, config.agent.clone(), config.seed)
                .with_exploration(ExplorationSchedule::greedy()),
            env: SnakeEnvironment::new(config.game.clone(), config.seed, RenderMode::Visible),
            recorder: VideoRecorder::new(DEMO_FPS),
            video_path: config.videos_dir.join(format!("demo_{stem}.gif")),
        })
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Play the game, capturing a frame after the reset and after every step
    pub fn run(&mut self) -> Result<DemoReport> {
        self.env.reset();
        self.capture();

        let mut steps = 0;
        let score = loop {
            let state = self.agent.get_state(&self.env);
            let action = self.agent.get_action(&state);
            let (_, done, score) = self.env.step(action);
            steps += 1;
            self.capture();

            if done {
                break score;
            }
        };
        info!("Game over after {} steps, score {}", steps, score);

        let frames = self.recorder.frame_count();
        self.recorder
            .save_video(&self.video_path)
            .with_context(|| format!("Failed to save demo video to {:?}", self.video_path))?;
        info!("Demo saved to {:?} ({} frames)", self.video_path, frames);

        Ok(DemoReport {
            score,
            steps,
            frames,
            video: self.video_path.clone(),
        })
    }

    fn capture(&mut self) {
        if let Some(frame) = self.env.frame() {
            self.recorder.capture_frame(frame);
        }
    }
}
