//! Deep Q-learning agent
//!
//! Owns the policy, the replay buffer and the completed-game counter that
//! drives ε. Learning happens in two modes:
//! - short memory: one update on the transition just observed
//! - long memory: one update on a batch drawn from the replay buffer, once per
//!   finished game

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::config::AgentConfig;
use super::environment::SnakeEnvironment;
use super::exploration::ExplorationSchedule;
use super::features::FeatureVector;
use super::memory::{ReplayBuffer, Transition};
use super::policy::{ActionValues, Policy, best_action};
use crate::game::{ACTION_COUNT, RelativeMove};

/// ε-greedy DQN agent generic over its value function
pub struct DqnAgent<P: Policy> {
    policy: P,
    memory: ReplayBuffer<Transition>,
    config: AgentConfig,
    exploration: ExplorationSchedule,
    /// Completed games; drives the exploration schedule
    n_games: usize,
    /// Source for exploration and replay sampling
    rng: ChaCha8Rng,
}

impl<P: Policy> DqnAgent<P> {
    /// Create an agent around `policy`
    ///
    /// `config` must have passed [`AgentConfig::validate`].
    pub fn new(policy: P, config: AgentConfig, seed: u64) -> Self {
        Self {
            policy,
            memory: ReplayBuffer::new(config.max_memory),
            exploration: config.exploration(),
            config,
            n_games: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Replace the exploration schedule
    pub fn with_exploration(mut self, exploration: ExplorationSchedule) -> Self {
        self.exploration = exploration;
        self
    }

    /// Feature vector of the environment's current state
    pub fn get_state(&self, env: &SnakeEnvironment) -> FeatureVector {
        env.features()
    }

    /// Current exploration probability
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon(self.n_games)
    }

    /// ε-greedy action selection
    pub fn get_action(&mut self, state: &FeatureVector) -> RelativeMove {
        if self.rng.gen::<f64>() < self.epsilon() {
            RelativeMove::ALL[self.rng.gen_range(0..ACTION_COUNT)]
        } else {
            self.greedy_action(state)
        }
    }

    /// Highest-valued action, never exploring
    pub fn greedy_action(&self, state: &FeatureVector) -> RelativeMove {
        best_action(&self.policy.predict(state))
    }

    /// Store a transition, evicting the oldest one when the buffer is full
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// One update on the transition just observed
    pub fn train_short_memory(&mut self, transition: &Transition) -> f32 {
        fit_transitions(&mut self.policy, self.config.gamma, &[transition])
    }

    /// One update over replayed experience
    ///
    /// With at least `min_batch_size` stored transitions, a uniform sample of
    /// up to `batch_size` is used; otherwise the whole buffer. Returns `None`
    /// when there is nothing to train on.
    pub fn train_long_memory(&mut self) -> Option<f32> {
        if self.memory.is_empty() {
            return None;
        }

        let batch: Vec<&Transition> = if self.memory.len() >= self.config.min_batch_size {
            self.memory.sample(self.config.batch_size, &mut self.rng)
        } else {
            self.memory.iter().collect()
        };

        let loss = fit_transitions(&mut self.policy, self.config.gamma, &batch);
        debug!(batch = batch.len(), loss, "Long-memory update");
        Some(loss)
    }

    /// Count a completed game; call after `done` and before the next reset
    pub fn finish_episode(&mut self) -> usize {
        self.n_games += 1;
        self.n_games
    }

    pub fn n_games(&self) -> usize {
        self.n_games
    }

    pub fn memory(&self) -> &ReplayBuffer<Transition> {
        &self.memory
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

/// Build bootstrapped targets for `batch` and fit the policy to them
///
/// Only the taken action's slot moves: it becomes `reward` for terminal
/// transitions and `reward + gamma * max_a Q(next_state, a)` otherwise.
fn fit_transitions<P: Policy>(policy: &mut P, gamma: f32, batch: &[&Transition]) -> f32 {
    let states: Vec<FeatureVector> = batch.iter().map(|t| t.state).collect();
    let next_states: Vec<FeatureVector> = batch.iter().map(|t| t.next_state).collect();

    let predictions = policy.predict_batch(&states);
    let next_values = policy.predict_batch(&next_states);

    let targets: Vec<(FeatureVector, ActionValues)> = batch
        .iter()
        .zip(predictions)
        .zip(next_values)
        .map(|((transition, mut target), next)| {
            let q_new = if transition.done {
                transition.reward
            } else {
                let max_next = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                transition.reward + gamma * max_next
            };
            target[transition.action.index()] = q_new;
            (transition.state, target)
        })
        .collect();

    policy.update(&targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::rl::features::FEATURE_COUNT;
    use crate::rl::policy::testing::ProbePolicy;
    use std::collections::HashSet;

    fn feature(first: [f32; 3]) -> FeatureVector {
        let mut state = [0.0; FEATURE_COUNT];
        state[..3].copy_from_slice(&first);
        state
    }

    fn agent(config: AgentConfig) -> DqnAgent<ProbePolicy> {
        DqnAgent::new(ProbePolicy::default(), config, 7)
    }

    fn small_config() -> AgentConfig {
        AgentConfig {
            max_memory: 20,
            batch_size: 6,
            min_batch_size: 4,
            ..Default::default()
        }
    }

    fn transition(i: usize) -> Transition {
        Transition::new(
            feature([i as f32, 0.0, 0.0]),
            RelativeMove::Straight,
            0.0,
            feature([0.0; 3]),
            false,
        )
    }

    #[test]
    fn test_get_state_matches_environment() {
        let env = SnakeEnvironment::headless(GameConfig::default(), 3);
        let agent = agent(AgentConfig::default());

        assert_eq!(agent.get_state(&env), env.features());
        // Reading state leaves the environment untouched
        assert_eq!(agent.get_state(&env), env.features());
    }

    #[test]
    fn test_greedy_agent_picks_argmax() {
        let mut agent = agent(AgentConfig::default()).with_exploration(ExplorationSchedule::greedy());

        for _ in 0..20 {
            assert_eq!(
                agent.get_action(&feature([0.0, 0.0, 1.0])),
                RelativeMove::TurnRight
            );
            assert_eq!(
                agent.get_action(&feature([0.0, 1.0, 0.0])),
                RelativeMove::TurnLeft
            );
        }
    }

    #[test]
    fn test_full_exploration_covers_all_moves() {
        let mut agent =
            agent(AgentConfig::default()).with_exploration(ExplorationSchedule::new(1.0, 1.0, 1));

        let seen: HashSet<_> = (0..200)
            .map(|_| agent.get_action(&feature([1.0, 0.0, 0.0])))
            .collect();
        assert_eq!(seen.len(), ACTION_COUNT);
    }

    #[test]
    fn test_epsilon_decays_with_games() {
        let mut agent = agent(AgentConfig::default());
        let start = agent.epsilon();

        for _ in 0..40 {
            agent.finish_episode();
        }
        assert_eq!(agent.n_games(), 40);
        assert!(agent.epsilon() < start);

        for _ in 0..100 {
            agent.finish_episode();
        }
        assert_eq!(agent.epsilon(), agent.config().epsilon_min);
    }

    #[test]
    fn test_short_memory_target_non_terminal() {
        let mut agent = agent(AgentConfig::default());
        let t = Transition::new(
            feature([0.2, 0.5, 0.1]),
            RelativeMove::TurnRight,
            1.0,
            feature([0.3, 0.9, 0.4]),
            false,
        );

        agent.train_short_memory(&t);

        let updates = &agent.policy().updates;
        assert_eq!(updates.len(), 1);
        let (state, target) = updates[0][0];
        assert_eq!(state, t.state);
        assert_eq!(target[0], 0.2);
        assert_eq!(target[1], 0.5);
        assert!((target[2] - (1.0 + 0.9 * 0.9)).abs() < 1e-6);
    }

    #[test]
    fn test_short_memory_target_terminal() {
        let mut agent = agent(AgentConfig::default());
        let t = Transition::new(
            feature([0.2, 0.5, 0.1]),
            RelativeMove::Straight,
            -10.0,
            feature([5.0, 5.0, 5.0]),
            true,
        );

        agent.train_short_memory(&t);

        let (_, target) = agent.policy().updates[0][0];
        assert_eq!(target, [-10.0, 0.5, 0.1]);
    }

    #[test]
    fn test_long_memory_empty_buffer() {
        let mut agent = agent(small_config());
        assert_eq!(agent.train_long_memory(), None);
        assert!(agent.policy().updates.is_empty());
    }

    #[test]
    fn test_long_memory_uses_whole_small_buffer() {
        let mut agent = agent(small_config());
        for i in 0..3 {
            agent.remember(transition(i));
        }

        assert!(agent.train_long_memory().is_some());
        assert_eq!(agent.policy().updates[0].len(), 3);
    }

    #[test]
    fn test_long_memory_samples_capped_batch() {
        let mut agent = agent(small_config());
        for i in 0..10 {
            agent.remember(transition(i));
        }

        agent.train_long_memory();

        let batch = &agent.policy().updates[0];
        assert_eq!(batch.len(), 6);
        let distinct: HashSet<u32> = batch.iter().map(|(s, _)| s[0] as u32).collect();
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn test_remember_respects_capacity() {
        let mut agent = agent(small_config());
        for i in 0..50 {
            agent.remember(transition(i));
        }

        assert_eq!(agent.memory().len(), 20);
        // Oldest were evicted first
        assert_eq!(agent.memory().iter().next().map(|t| t.state[0]), Some(30.0));
    }
}
