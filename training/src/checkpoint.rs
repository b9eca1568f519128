//! Where the best parameters of a run are written.
use neural_network::{NetworkParameters, Result};
use std::path::{Path, PathBuf};

/// Destination for improved parameters.
///
/// The trainer calls [`CheckpointStore::save`] whenever the validation loss reaches a new
/// best. A failed save is reported to the trainer, which logs it and keeps training.
pub trait CheckpointStore {
    fn save(&mut self, parameters: &NetworkParameters) -> Result<()>;

    /// Human readable location, used in log messages.
    fn describe(&self) -> String;
}

/// Writes checkpoints as JSON to a single file, replacing it atomically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<NetworkParameters> {
        NetworkParameters::load(&self.path)
    }
}

impl CheckpointStore for FileCheckpoint {
    fn save(&mut self, parameters: &NetworkParameters) -> Result<()> {
        parameters.save(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
