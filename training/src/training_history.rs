use serde::{Deserialize, Serialize};
use std::fmt;

/// A checkpoint that could not be written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointFailure {
    pub epoch: usize,
    pub message: String,
}

/// Training history containing metrics recorded during training
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Training loss for each epoch, averaged over batches in mini-batch mode
    pub train_losses: Vec<f64>,
    /// Rounded validation loss for each epoch
    pub validation_losses: Vec<f64>,
    /// Best validation loss achieved during training
    pub best_validation_loss: Option<f64>,
    /// Epoch where the best validation loss was achieved
    pub best_epoch: Option<usize>,
    /// Number of checkpoints successfully written
    pub checkpoints_written: usize,
    /// Epoch at which early stopping fired, if it did
    pub stopped_early_at: Option<usize>,
    pub checkpoint_failures: Vec<CheckpointFailure>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_epoch(&mut self, epoch: usize, train_loss: f64, validation_loss: f64) {
        self.train_losses.push(train_loss);
        self.validation_losses.push(validation_loss);

        if self
            .best_validation_loss
            .is_none_or(|best| validation_loss < best)
        {
            self.best_validation_loss = Some(validation_loss);
            self.best_epoch = Some(epoch);
        }
    }

    pub fn record_checkpoint_failure(&mut self, epoch: usize, message: String) {
        self.checkpoint_failures.push(CheckpointFailure { epoch, message });
    }

    pub fn epochs_run(&self) -> usize {
        self.train_losses.len()
    }
}

impl fmt::Display for TrainingHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training History Summary:")?;
        writeln!(f, "------------------------")?;
        writeln!(f, "Epochs run: {}", self.epochs_run())?;
        if let (Some(loss), Some(epoch)) = (self.best_validation_loss, self.best_epoch) {
            writeln!(f, "Best validation loss: {loss:.7} (epoch {epoch})")?;
        }
        if let Some(loss) = self.train_losses.last() {
            writeln!(f, "Final training loss: {loss:.7}")?;
        }
        writeln!(f, "Checkpoints written: {}", self.checkpoints_written)?;
        if let Some(epoch) = self.stopped_early_at {
            writeln!(f, "Stopped early at epoch {epoch}")?;
        }
        if !self.checkpoint_failures.is_empty() {
            writeln!(
                f,
                "Checkpoint failures: {}",
                self.checkpoint_failures.len()
            )?;
        }

        // Print loss progression at 25% intervals
        let len = self.train_losses.len();
        if len >= 4 {
            writeln!(f, "\nLoss progression:")?;
            for i in 0..=3 {
                let idx = i * (len - 1) / 3;
                if let (Some(train), Some(validation)) =
                    (self.train_losses.get(idx), self.validation_losses.get(idx))
                {
                    writeln!(f, "Epoch {idx}: train {train:.4}, validation {validation:.4}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_recording() {
        let mut history = TrainingHistory::new();

        history.record_epoch(0, 0.9, 0.85);
        history.record_epoch(1, 0.6, 0.5);
        history.record_epoch(2, 0.4, 0.55);

        assert_eq!(history.train_losses, vec![0.9, 0.6, 0.4]);
        assert_eq!(history.validation_losses, vec![0.85, 0.5, 0.55]);
        assert_eq!(history.best_validation_loss, Some(0.5));
        assert_eq!(history.best_epoch, Some(1));
        assert_eq!(history.epochs_run(), 3);
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = TrainingHistory::new();
        assert!(history.train_losses.is_empty());
        assert_eq!(history.best_epoch, None);
        assert_eq!(history.checkpoints_written, 0);
    }

    #[test]
    fn test_summary_mentions_failures_and_early_stop() {
        let mut history = TrainingHistory::new();
        for epoch in 0..5 {
            history.record_epoch(epoch, 1.0, 1.0);
        }
        history.stopped_early_at = Some(4);
        history.record_checkpoint_failure(0, "disk full".to_owned());

        let summary = history.to_string();
        assert!(summary.contains("Stopped early at epoch 4"));
        assert!(summary.contains("Checkpoint failures: 1"));
        assert!(summary.contains("Loss progression"));
    }

    #[test]
    fn test_history_serializes() {
        let mut history = TrainingHistory::new();
        history.record_epoch(0, 0.25, 0.5);

        let json = serde_json::to_string(&history).unwrap();
        let restored: TrainingHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);
    }
}
