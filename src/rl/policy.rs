//! Trainable action-value function used by the agent
//!
//! The agent and both harnesses only talk to the [`Policy`] trait:
//! predict values for a feature vector, fit a batch of targets, save and load.
//! [`QPolicy`] is the Burn implementation backed by [`QNetwork`] and Adam.

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{
        ElementConversion, Tensor, TensorData,
        backend::{AutodiffBackend, Backend},
    },
};
use std::path::Path;

use super::config::AgentConfig;
use super::features::{FEATURE_COUNT, FeatureVector};
use super::network::{QNetwork, QNetworkConfig};
use super::persistence::{CheckpointError, CheckpointMetadata, load_checkpoint, save_checkpoint};
use crate::game::{ACTION_COUNT, RelativeMove};

/// One value estimate per relative move, indexed by [`RelativeMove::index`]
pub type ActionValues = [f32; ACTION_COUNT];

/// Function approximator mapping states to per-action values
pub trait Policy {
    /// Value estimate for every action in `state`
    fn predict(&self, state: &FeatureVector) -> ActionValues;

    /// Value estimates for many states at once
    fn predict_batch(&self, states: &[FeatureVector]) -> Vec<ActionValues> {
        states.iter().map(|state| self.predict(state)).collect()
    }

    /// Fit predictions towards `(state, target)` pairs with one gradient step
    ///
    /// Returns the mean-squared error measured before the step.
    fn update(&mut self, batch: &[(FeatureVector, ActionValues)]) -> f32;

    /// Persist the parameters to `destination`
    fn save(&self, destination: &Path) -> Result<()>;

    /// Replace the parameters with those stored at `source`
    fn load(&mut self, source: &Path) -> Result<()>;
}

/// Move with the highest value; ties resolve to the lowest index
pub fn best_action(values: &ActionValues) -> RelativeMove {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    RelativeMove::ALL[best]
}

/// Burn-backed Q-value policy
///
/// Training runs on the autodiff backend `B`; predictions use the inner
/// backend so no gradient graph is built while playing.
pub struct QPolicy<B: AutodiffBackend> {
    network: QNetwork<B>,
    optim: OptimizerAdaptor<Adam, QNetwork<B>, B>,
    network_config: QNetworkConfig,
    learning_rate: f64,
    /// Gradient steps applied so far, stored in checkpoints
    updates: usize,
    device: B::Device,
}

impl<B: AutodiffBackend> QPolicy<B> {
    /// Create a randomly initialized policy
    pub fn new(network_config: QNetworkConfig, learning_rate: f64, device: B::Device) -> Self {
        Self {
            network: network_config.init(&device),
            optim: AdamConfig::new().init(),
            network_config,
            learning_rate,
            updates: 0,
            device,
        }
    }

    /// Policy sized and tuned from the agent hyperparameters
    pub fn from_config(config: &AgentConfig, device: B::Device) -> Self {
        Self::new(
            QNetworkConfig::new(config.hidden_size),
            config.learning_rate,
            device,
        )
    }

    pub fn network_config(&self) -> QNetworkConfig {
        self.network_config
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl<B: AutodiffBackend> Policy for QPolicy<B> {
    fn predict(&self, state: &FeatureVector) -> ActionValues {
        self.predict_batch(std::slice::from_ref(state))[0]
    }

    fn predict_batch(&self, states: &[FeatureVector]) -> Vec<ActionValues> {
        if states.is_empty() {
            return Vec::new();
        }

        let network = self.network.clone().valid();
        let input = states_tensor::<B::InnerBackend>(states, &self.device);
        let values = network
            .forward(input)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .expect("converted tensor data holds f32 values");

        values
            .chunks_exact(ACTION_COUNT)
            .map(|row| [row[0], row[1], row[2]])
            .collect()
    }

    fn update(&mut self, batch: &[(FeatureVector, ActionValues)]) -> f32 {
        if batch.is_empty() {
            return 0.0;
        }

        let states: Vec<FeatureVector> = batch.iter().map(|(state, _)| *state).collect();
        let targets: Vec<f32> = batch
            .iter()
            .flat_map(|(_, target)| target.iter().copied())
            .collect();

        let inputs = states_tensor::<B>(&states, &self.device);
        let targets = Tensor::<B, 2>::from_data(
            TensorData::new(targets, [batch.len(), ACTION_COUNT]),
            &self.device,
        );

        // MSE: mean((prediction - target)^2)
        let diff = self.network.forward(inputs) - targets;
        let loss = (diff.clone() * diff).mean();
        let loss_value = loss.clone().into_scalar().elem::<f32>();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.learning_rate, self.network.clone(), grads);
        self.updates += 1;

        loss_value
    }

    fn save(&self, destination: &Path) -> Result<()> {
        let metadata = CheckpointMetadata::new(self.network_config, self.updates);
        save_checkpoint(&self.network, &metadata, destination)
    }

    fn load(&mut self, source: &Path) -> Result<()> {
        let (network, metadata) = load_checkpoint::<B>(source, &self.device)?;
        if metadata.network != self.network_config {
            return Err(CheckpointError::ShapeMismatch {
                path: source.to_path_buf(),
                found: metadata.network,
                expected: self.network_config,
            }
            .into());
        }

        self.network = network;
        self.updates = metadata.updates;
        // Optimizer moments belong to the replaced weights
        self.optim = AdamConfig::new().init();

        Ok(())
    }
}

/// Stack feature vectors into a `[n, FEATURE_COUNT]` tensor
fn states_tensor<B: Backend>(states: &[FeatureVector], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f32> = states
        .iter()
        .flat_map(|state| state.iter().copied())
        .collect();
    Tensor::from_data(TensorData::new(flat, [states.len(), FEATURE_COUNT]), device)
}
