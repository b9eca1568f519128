use thiserror::Error;

/// Errors raised by the network and its persisted parameters.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Matrix dimensions do not agree with the network or with each other
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// A batch with no rows was supplied
    #[error("Empty batch: {0}")]
    EmptyBatch(&'static str),
    /// The loss evaluated to NaN or infinity
    #[error("Non-finite {kind} loss ({loss}); the network has become numerically unstable")]
    NonFiniteLoss { kind: &'static str, loss: f64 },
    /// A hyperparameter is out of range
    #[error("Invalid network configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper for standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Wrapper for JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
