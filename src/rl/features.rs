use crate::game::{Direction, GameState, RelativeMove};

/// Number of entries in a feature vector
pub const FEATURE_COUNT: usize = 11;

/// Fixed-length encoding of a game state
///
/// Layout:
/// - 0..3: danger straight ahead, to the left, to the right
/// - 3..7: heading one-hot (left, right, up, down)
/// - 7..11: food is left of, right of, above, below the head
pub type FeatureVector = [f32; FEATURE_COUNT];

/// Encode a game state as a feature vector
///
/// Pure function of the state; calling it never mutates anything.
pub fn extract_features(state: &GameState) -> FeatureVector {
    let head = state.snake.head();
    let heading = state.snake.direction;
    let food = state.food;

    let danger = |action: RelativeMove| {
        let next = head.moved_in_direction(heading.apply(action));
        flag(state.collision_at(next).is_some())
    };

    [
        danger(RelativeMove::Straight),
        danger(RelativeMove::TurnLeft),
        danger(RelativeMove::TurnRight),
        flag(heading == Direction::Left),
        flag(heading == Direction::Right),
        flag(heading == Direction::Up),
        flag(heading == Direction::Down),
        flag(food.x < head.x),
        flag(food.x > head.x),
        flag(food.y < head.y),
        flag(food.y > head.y),
    ]
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}
