//! Two-layer feed-forward network trained by backpropagation with momentum.
//!
//! The network is `input -> sigmoid hidden -> output`, where the output activation and loss
//! are chosen by an [`OutputHead`]: ReLU with squared error for regression, softmax with
//! negative log-likelihood for classification.

// Modules
pub mod activations;
mod error;
pub mod momentum;
pub mod network;
pub mod network_config;
pub mod output_head;
pub mod parameters;

pub use activations::{ActivationFunction, ActivationType, RELU, SIGMOID, SOFTMAX};
pub use error::{NetworkError, Result};
pub use matrix::Matrix;
pub use momentum::{Gradients, MomentumState};
pub use network::{ForwardPass, Network};
pub use network_config::{NetworkConfig, NetworkConfigBuilder};
pub use output_head::{OutputHead, PROBABILITY_FLOOR};
pub use parameters::NetworkParameters;
