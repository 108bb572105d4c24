use super::features::{FeatureVector, extract_features};
use crate::game::{GameConfig, GameEngine, GameState, RelativeMove, StepResult};
use crate::render::FrameBuffer;

/// Whether the environment draws frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// No rendering work at all
    Headless,
    /// Redraw a pixel frame after every reset and step
    Visible,
}

/// Snake environment for reinforcement learning
///
/// Wraps the game engine and provides the episode interface the agent and
/// harnesses drive:
/// - `reset()` starts a fresh episode
/// - `step(action)` returns `(reward, done, score)`
/// - `frame()` exposes the pixel buffer in visible mode
///
/// Headless and visible environments built from the same config and seed
/// produce identical traces; only the frame buffer differs.
pub struct SnakeEnvironment {
    engine: GameEngine,
    state: GameState,
    frame: Option<FrameBuffer>,
}

impl SnakeEnvironment {
    /// Create a new Snake environment with a seeded food source
    pub fn new(config: GameConfig, seed: u64, mode: RenderMode) -> Self {
        let frame = match mode {
            RenderMode::Headless => None,
            RenderMode::Visible => Some(FrameBuffer::new(
                config.grid_width,
                config.grid_height,
                config.block_size,
            )),
        };
        let mut engine = GameEngine::new(config, seed);
        let state = engine.reset();

        let mut env = Self {
            engine,
            state,
            frame,
        };
        env.redraw();
        env
    }

    /// Convenience constructor for training and evaluation
    pub fn headless(config: GameConfig, seed: u64) -> Self {
        Self::new(config, seed, RenderMode::Headless)
    }

    /// Reset the environment to a fresh episode
    pub fn reset(&mut self) {
        self.state = self.engine.reset();
        self.redraw();
    }

    /// Apply one relative move
    ///
    /// Returns: (reward, done, score)
    pub fn step(&mut self, action: RelativeMove) -> (f32, bool, u32) {
        let result = self.step_detailed(action);
        (result.reward, result.terminated, result.score)
    }

    /// Apply one relative move and return the full step result
    pub fn step_detailed(&mut self, action: RelativeMove) -> StepResult {
        let result = self.engine.step(&mut self.state, action);
        self.redraw();
        result
    }

    /// Feature vector of the current state
    pub fn features(&self) -> FeatureVector {
        extract_features(&self.state)
    }

    /// Latest rendered frame, `None` in headless mode
    pub fn frame(&self) -> Option<&FrameBuffer> {
        self.frame.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.frame.is_some()
    }

    /// Get reference to current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for tests that stage specific boards
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    fn redraw(&mut self) {
        if let Some(frame) = self.frame.as_mut() {
            frame.draw(&self.state);
        }
    }
}
