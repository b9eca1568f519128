use crate::error::{Result, TrainingError};
use neural_network::{NetworkConfig, OutputHead};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// An `f64` carries no more significant decimal digits than this.
const MAX_LOSS_DECIMALS: i32 = 15;

/// Configuration parameters for the training loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Maximum number of training epochs
    pub epochs: usize,
    /// Number of epochs to wait for a new best validation loss before stopping
    pub early_stopping_patience: usize,
    /// Size of each mini-batch
    pub batch_size: usize,
    /// Reshuffle the training rows every mini-batch epoch
    pub shuffle: bool,
    /// Only stop early once the best validation loss is below this value
    pub stop_below: Option<f64>,
    /// Decimal places the validation loss is rounded to before comparison
    pub loss_decimals: Option<i32>,
    /// Seed for mini-batch shuffling
    pub shuffle_seed: Option<u64>,
    /// Draw an epoch progress bar
    pub show_progress: bool,
}

impl TrainingConfig {
    /// Loads a training configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "batch_size must be > 0".to_owned(),
            ));
        }
        let valid_decimals = 0..=MAX_LOSS_DECIMALS;
        if let Some(decimals) = self.loss_decimals.filter(|d| !valid_decimals.contains(d)) {
            return Err(TrainingError::InvalidConfig(format!(
                "loss_decimals must be between 0 and {MAX_LOSS_DECIMALS}, got {decimals}"
            )));
        }
        if let Some(threshold) = self.stop_below.filter(|t| !t.is_finite()) {
            return Err(TrainingError::InvalidConfig(format!(
                "stop_below must be finite, got {threshold}"
            )));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Preset::ClassificationBasic.training_config()
    }
}

/// The historical training setups, one checkpoint file each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Regression,
    ClassificationBasic,
    ClassificationAdvanced,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::Regression,
        Preset::ClassificationBasic,
        Preset::ClassificationAdvanced,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Regression => "regression",
            Preset::ClassificationBasic => "classification-basic",
            Preset::ClassificationAdvanced => "classification-advanced",
        }
    }

    pub fn head(&self) -> OutputHead {
        match self {
            Preset::Regression => OutputHead::Regression,
            Preset::ClassificationBasic | Preset::ClassificationAdvanced => {
                OutputHead::Classification
            }
        }
    }

    pub fn network_config(&self) -> NetworkConfig {
        let hidden_nodes = match self {
            Preset::Regression => 128,
            Preset::ClassificationBasic | Preset::ClassificationAdvanced => 512,
        };
        NetworkConfig {
            head: self.head(),
            hidden_nodes,
            learning_rate: 0.5,
            momentum: 0.8,
            seed: None,
        }
    }

    pub fn training_config(&self) -> TrainingConfig {
        match self {
            Preset::Regression => TrainingConfig {
                epochs: 10000,
                early_stopping_patience: 500,
                batch_size: 32,
                shuffle: true,
                stop_below: None,
                loss_decimals: Some(7),
                shuffle_seed: None,
                show_progress: true,
            },
            Preset::ClassificationBasic | Preset::ClassificationAdvanced => TrainingConfig {
                epochs: 2000,
                early_stopping_patience: if *self == Preset::ClassificationBasic {
                    5
                } else {
                    25
                },
                batch_size: 32,
                shuffle: true,
                stop_below: Some(0.8),
                loss_decimals: Some(4),
                shuffle_seed: None,
                show_progress: true,
            },
        }
    }

    pub fn checkpoint_file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}', expected one of: {}", names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 2000);
        assert_eq!(config.early_stopping_patience, 5);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.stop_below, Some(0.8));
        assert_eq!(config.loss_decimals, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_regression_preset() {
        let network = Preset::Regression.network_config();
        let training = Preset::Regression.training_config();

        assert_eq!(network.head, OutputHead::Regression);
        assert_eq!(network.hidden_nodes, 128);
        assert_eq!(network.learning_rate, 0.5);
        assert_eq!(network.momentum, 0.8);
        assert_eq!(training.epochs, 10000);
        assert_eq!(training.early_stopping_patience, 500);
        assert_eq!(training.loss_decimals, Some(7));
        assert_eq!(Preset::Regression.checkpoint_file_name(), "regression.json");
    }

    #[test]
    fn test_classification_presets_differ_in_patience() {
        let basic = Preset::ClassificationBasic.training_config();
        let advanced = Preset::ClassificationAdvanced.training_config();

        assert_eq!(basic.early_stopping_patience, 5);
        assert_eq!(advanced.early_stopping_patience, 25);
        assert_eq!(
            TrainingConfig {
                early_stopping_patience: 5,
                ..advanced
            },
            basic
        );
        assert_eq!(
            Preset::ClassificationAdvanced.checkpoint_file_name(),
            "classification-advanced.json"
        );
    }

    #[test]
    fn test_preset_from_str() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
        assert!("classification".parse::<Preset>().is_err());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("training.json");
        fs::write(&path, r#"{"epochs": 12, "shuffle_seed": 4, "show_progress": false}"#).unwrap();

        let config = TrainingConfig::load(&path).unwrap();
        assert_eq!(config.epochs, 12);
        assert_eq!(config.shuffle_seed, Some(4));
        assert!(!config.show_progress);
        assert_eq!(config.batch_size, 32);
    }

    #[test]
    fn test_load_rejects_out_of_range_loss_decimals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("training.json");
        for decimals in ["400", "-1"] {
            fs::write(&path, format!(r#"{{"loss_decimals": {decimals}}}"#)).unwrap();
            assert!(matches!(
                TrainingConfig::load(&path),
                Err(TrainingError::InvalidConfig(_))
            ));
        }

        fs::write(&path, r#"{"loss_decimals": 15}"#).unwrap();
        assert_eq!(TrainingConfig::load(&path).unwrap().loss_decimals, Some(15));
    }

    #[test]
    fn test_load_rejects_zero_batch_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("training.json");
        fs::write(&path, r#"{"batch_size": 0}"#).unwrap();

        assert!(matches!(
            TrainingConfig::load(&path),
            Err(TrainingError::InvalidConfig(_))
        ));
    }
}
