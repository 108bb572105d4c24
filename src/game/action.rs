use serde::{Deserialize, Serialize};

/// Compass direction the snake is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Heading after a clockwise quarter turn (y grows downward)
    pub fn turned_right(&self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Heading after a counter-clockwise quarter turn
    pub fn turned_left(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Apply a relative move to this heading
    pub fn apply(&self, action: RelativeMove) -> Direction {
        match action {
            RelativeMove::Straight => *self,
            RelativeMove::TurnLeft => self.turned_left(),
            RelativeMove::TurnRight => self.turned_right(),
        }
    }
}

/// Number of discrete actions available to the agent
pub const ACTION_COUNT: usize = 3;

/// Move relative to the current heading.
///
/// Reversing is not representable, so every action is legal in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeMove {
    Straight,
    TurnLeft,
    TurnRight,
}

impl RelativeMove {
    pub const ALL: [RelativeMove; ACTION_COUNT] = [
        RelativeMove::Straight,
        RelativeMove::TurnLeft,
        RelativeMove::TurnRight,
    ];

    /// Index of this move in action-value vectors
    pub fn index(&self) -> usize {
        match self {
            RelativeMove::Straight => 0,
            RelativeMove::TurnLeft => 1,
            RelativeMove::TurnRight => 2,
        }
    }

    /// Convert an action index back into a move, `None` if out of range
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// One-hot encoding over {straight, turn-left, turn-right}
    pub fn one_hot(&self) -> [f32; ACTION_COUNT] {
        let mut encoded = [0.0; ACTION_COUNT];
        encoded[self.index()] = 1.0;
        encoded
    }
}
