//! Experience replay for DQN training
//!
//! Transitions are kept in a fixed-capacity FIFO: once full, every insert
//! evicts the oldest transition. Batches are drawn uniformly without
//! replacement over whatever the buffer currently holds.

use rand::{Rng, seq::index};
use std::collections::VecDeque;

use super::features::FeatureVector;
use crate::game::RelativeMove;

/// One `(state, action, reward, next_state, done)` record
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: FeatureVector,
    pub action: RelativeMove,
    pub reward: f32,
    pub next_state: FeatureVector,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: FeatureVector,
        action: RelativeMove,
        reward: f32,
        next_state: FeatureVector,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            done,
        }
    }
}

/// Bounded ring buffer of past transitions
///
/// # Example
///
/// ```rust
/// use dqn_snake::rl::ReplayBuffer;
///
/// let mut buffer = ReplayBuffer::new(2);
/// buffer.push(1);
/// buffer.push(2);
/// assert_eq!(buffer.push(3), Some(1));
/// assert_eq!(buffer.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayBuffer<T = Transition> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> ReplayBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay buffer capacity must be positive");
        Self {
            // Grow lazily; the default capacity is large
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item when full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Draw up to `batch_size` distinct items uniformly at random
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<&T> {
        let amount = batch_size.min(self.items.len());
        index::sample(rng, self.items.len(), amount)
            .into_iter()
            .map(|i| &self.items[i])
            .collect()
    }

    /// Iterate over all items, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_push_below_capacity() {
        let mut buffer = ReplayBuffer::new(3);
        assert!(buffer.is_empty());
        assert_eq!(buffer.push(1), None);
        assert_eq!(buffer.push(2), None);
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = ReplayBuffer::new(5);
        for i in 0..100 {
            buffer.push(i);
            assert!(buffer.len() <= 5);
        }
        assert!(buffer.is_full());
    }

    #[test]
    fn test_full_buffer_evicts_oldest() {
        let mut buffer = ReplayBuffer::new(3);
        for i in 0..3 {
            buffer.push(i);
        }

        assert_eq!(buffer.push(3), Some(0));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(buffer.push(4), Some(1));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_sample_is_distinct_and_bounded() {
        let mut buffer = ReplayBuffer::new(50);
        for i in 0..50 {
            buffer.push(i);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let batch = buffer.sample(20, &mut rng);
        assert_eq!(batch.len(), 20);
        let unique: HashSet<_> = batch.iter().collect();
        assert_eq!(unique.len(), 20);

        // Asking for more than stored returns everything
        assert_eq!(buffer.sample(500, &mut rng).len(), 50);
    }

    #[test]
    fn test_sample_reaches_whole_buffer() {
        let mut buffer = ReplayBuffer::new(10);
        for i in 0..10 {
            buffer.push(i);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            for item in buffer.sample(2, &mut rng) {
                seen.insert(*item);
            }
        }
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_sample_empty_buffer() {
        let buffer: ReplayBuffer<u8> = ReplayBuffer::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(buffer.sample(8, &mut rng).is_empty());
    }

    #[test]
    fn test_transition_holds_one_hot_action() {
        let transition = Transition::new(
            [0.0; 11],
            RelativeMove::TurnRight,
            -10.0,
            [1.0; 11],
            true,
        );
        assert_eq!(transition.action.one_hot(), [0.0, 0.0, 1.0]);
        assert!(transition.done);
    }
}
