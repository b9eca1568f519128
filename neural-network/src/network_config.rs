use crate::error::{NetworkError, Result};
use crate::output_head::OutputHead;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Shape and optimiser settings of a two-layer network.
///
/// # Example
///
/// ```
/// use neural_network::{NetworkConfig, NetworkConfigBuilder, OutputHead};
///
/// let config = NetworkConfigBuilder::default()
///     .head(OutputHead::Regression)
///     .hidden_nodes(16)
///     .learning_rate(0.1)
///     .momentum(0.9)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Builder)]
#[builder(derive(Debug))]
pub struct NetworkConfig {
    /// Output activation and loss pairing.
    pub head: OutputHead,

    /// Width of the sigmoid hidden layer.
    pub hidden_nodes: usize,

    /// Step size for gradient descent.
    pub learning_rate: f64,

    /// Fraction of the previous update added to each step.
    pub momentum: f64,

    /// Seed for weight initialisation. `None` draws from OS entropy.
    #[serde(default)]
    #[builder(setter(strip_option), default)]
    pub seed: Option<u64>,
}

impl NetworkConfig {
    /// Loads a network configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: NetworkConfig = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_nodes == 0 {
            return Err(NetworkError::InvalidConfig(
                "hidden_nodes must be > 0".to_owned(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.momentum.is_finite() && self.momentum >= 0.0) {
            return Err(NetworkError::InvalidConfig(format!(
                "momentum must be finite and >= 0, got {}",
                self.momentum
            )));
        }
        Ok(())
    }
}

/// Classification head, 512 hidden nodes, learning rate 0.5, momentum 0.8.
impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            head: OutputHead::Classification,
            hidden_nodes: 512,
            learning_rate: 0.5,
            momentum: 0.8,
            seed: None,
        }
    }
}

impl fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} network: {} hidden nodes, learning rate {}, momentum {}",
            self.head, self.hidden_nodes, self.learning_rate, self.momentum
        )
    }
}
