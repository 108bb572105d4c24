//! Backend type aliases and device management
//!
//! The Q-network is tiny (11 → 256 → 3), so the CPU NdArray backend is all the
//! agent needs. Training wraps it in `Autodiff`; prediction runs on the inner
//! backend through `AutodiffModule::valid`.
//!
//! # Example
//!
//! ```rust
//! use dqn_snake::rl::{default_device, QNetworkConfig, TrainingBackend};
//!
//! let device = default_device();
//! let network = QNetworkConfig::default().init::<TrainingBackend>(&device);
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend used by the agent's policy (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Get the default device for computation (CPU)
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_device_calls() {
        let device1 = default_device();
        let device2 = default_device();
        assert_eq!(
            std::mem::discriminant(&device1),
            std::mem::discriminant(&device2)
        );
    }
}
