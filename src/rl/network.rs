//! Q-value network for the Snake DQN agent
//!
//! A small fully connected network mapping a feature vector to one value
//! estimate per relative move.
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 11]
//!   ↓ Linear(11 → hidden) + ReLU
//!   ↓ Linear(hidden → 3)
//! Output: [batch, 3] action values (straight, left, right)
//! ```
//!
//! # Example
//!
//! ```rust
//! use dqn_snake::rl::QNetworkConfig;
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new(256).init::<Backend>(&device);
//!
//! let states = Tensor::zeros([4, 11], &device);
//! let values = network.forward(states);
//!
//! assert_eq!(values.dims(), [4, 3]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};
use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;
use crate::game::ACTION_COUNT;

/// Configuration for the Q-network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNetworkConfig {
    /// Length of the feature vector (default: 11)
    pub input_size: usize,

    /// Hidden layer width
    pub hidden_size: usize,

    /// Number of actions (default: 3 relative moves)
    pub num_actions: usize,
}

impl QNetworkConfig {
    /// Create a configuration for the snake features with the given hidden width
    pub fn new(hidden_size: usize) -> Self {
        Self {
            input_size: FEATURE_COUNT,
            hidden_size,
            num_actions: ACTION_COUNT,
        }
    }

    /// Initialize the network with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            hidden: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            output: LinearConfig::new(self.hidden_size, self.num_actions).init(device),
        }
    }
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Two-layer perceptron producing per-action values
///
/// Generic over the Burn backend so the same module trains under
/// `Autodiff<NdArray>` and predicts on the plain `NdArray` backend.
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass
    ///
    /// * `states` - Tensor with shape `[batch, input_size]`
    ///
    /// Returns a tensor with shape `[batch, num_actions]`
    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(states));
        self.output.forward(x)
    }

    /// Shape read back from the weight matrices
    pub fn shape(&self) -> QNetworkConfig {
        let [input_size, hidden_size] = self.hidden.weight.dims();
        let [_, num_actions] = self.output.weight.dims();
        QNetworkConfig {
            input_size,
            hidden_size,
            num_actions,
        }
    }
}
