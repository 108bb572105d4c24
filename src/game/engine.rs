use super::{
    action::{Direction, RelativeMove},
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Head left the board or ran into the body
    Collision(CollisionType),
    /// Too many steps without eating
    Stalled,
    /// The snake covers every cell, no room for food
    BoardFilled,
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Why the episode ended, if it did on this step
    pub termination: Option<Termination>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step
    pub reward: f32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Score after this step
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that handles all game logic
///
/// Food placement is the only source of randomness and draws from a seeded
/// ChaCha8 stream, so replaying the same actions from the same seed yields an
/// identical trace.
pub struct GameEngine {
    config: GameConfig,
    rng: ChaCha8Rng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration and food seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let mut state = GameState::new(
            snake,
            Position::new(0, 0),
            self.config.grid_width,
            self.config.grid_height,
        );
        state.food = self
            .spawn_food(&state)
            .expect("a validated board always has room for the first food");

        state
    }

    /// Execute one step of the game
    pub fn step(&mut self, state: &mut GameState, action: RelativeMove) -> StepResult {
        if !state.is_alive {
            return StepResult {
                reward: 0.0,
                terminated: true,
                score: state.score,
                info: StepInfo {
                    ate_food: false,
                    termination: None,
                },
            };
        }

        let direction = state.snake.direction.apply(action);
        let new_head = state.snake.head().moved_in_direction(direction);
        state.steps += 1;

        // Body stays where it is on collision, so it never leaves the board
        if let Some(collision_type) = state.collision_at(new_head) {
            state.is_alive = false;
            return self.finish(state, Termination::Collision(collision_type), false);
        }

        state.snake.direction = direction;
        let ate_food = new_head == state.food;
        state.snake.move_snake(ate_food);

        if ate_food {
            state.score += 1;
            state.steps_since_food = 0;

            return match self.spawn_food(state) {
                Some(food) => {
                    state.food = food;
                    StepResult {
                        reward: self.config.step_reward + self.config.food_reward,
                        terminated: false,
                        score: state.score,
                        info: StepInfo {
                            ate_food: true,
                            termination: None,
                        },
                    }
                }
                None => {
                    state.is_alive = false;
                    self.finish(state, Termination::BoardFilled, true)
                }
            };
        }

        state.steps_since_food += 1;
        if state.steps_since_food as usize > self.config.stall_limit(state.snake.len()) {
            state.is_alive = false;
            return self.finish(state, Termination::Stalled, false);
        }

        StepResult {
            reward: self.config.step_reward,
            terminated: false,
            score: state.score,
            info: StepInfo {
                ate_food: false,
                termination: None,
            },
        }
    }

    fn finish(&self, state: &GameState, termination: Termination, ate_food: bool) -> StepResult {
        let reward = match termination {
            Termination::BoardFilled => self.config.step_reward + self.config.food_reward,
            Termination::Collision(_) | Termination::Stalled => self.config.death_penalty,
        };

        StepResult {
            reward,
            terminated: true,
            score: state.score,
            info: StepInfo {
                ate_food,
                termination: Some(termination),
            },
        }
    }

    /// Pick a food cell uniformly among the free cells, `None` if the board is full
    fn spawn_food(&mut self, state: &GameState) -> Option<Position> {
        let food = state.free_cells().choose(&mut self.rng).copied()?;
        assert!(
            !state.is_occupied_by_snake(food),
            "food spawned on an occupied cell {food:?}"
        );
        Some(food)
    }
}
