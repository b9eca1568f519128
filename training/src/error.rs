use neural_network::NetworkError;
use thiserror::Error;

/// Errors that can occur while training or evaluating a network
#[derive(Debug, Error)]
pub enum TrainingError {
    /// Errors raised by the network itself
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// Inputs and targets do not pair up
    #[error("Data mismatch: {0}")]
    DataMismatch(String),
    /// Training was requested on an engine restored from a checkpoint
    #[error("Engine was restored from a checkpoint and holds no training data")]
    NotTrainable,
    /// The operation is not available for this output head
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    /// A training hyperparameter is out of range
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper for standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainingError>;
