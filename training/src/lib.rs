//! Training infrastructure for the two-layer network: datasets, mini-batches, early
//! stopping, checkpointing, and the [`Trainer`] that ties them together.
mod batches;
mod checkpoint;
mod dataset;
mod early_stopping;
mod error;
pub mod metrics;
mod training;
mod training_config;
mod training_history;

pub use batches::MiniBatches;
pub use checkpoint::{CheckpointStore, FileCheckpoint};
pub use dataset::Dataset;
pub use early_stopping::{EarlyStopping, EpochOutcome, RunState, round_loss};
pub use error::{Result, TrainingError};
pub use metrics::{ClassMetrics, Evaluation, Report};
pub use training::Trainer;
pub use training_config::{Preset, TrainingConfig};
pub use training_history::{CheckpointFailure, TrainingHistory};

pub mod prelude {
    pub use crate::Dataset;
    pub use crate::FileCheckpoint;
    pub use crate::Preset;
    pub use crate::Trainer;
    pub use crate::TrainingConfig;
    pub use crate::TrainingHistory;
}
