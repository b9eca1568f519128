//! Best-loss tracking and the early stopping rule.
use serde::{Deserialize, Serialize};

/// Progress of the current training run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub best_validation_loss: f64,
    pub best_epoch: usize,
    pub current_epoch: usize,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            best_validation_loss: f64::INFINITY,
            best_epoch: 0,
            current_epoch: 0,
        }
    }
}

/// What the trainer should do after an epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochOutcome {
    /// The loss beat every earlier epoch, so the parameters should be checkpointed.
    pub improved: bool,
    pub stop: bool,
}

/// Stops once `patience` epochs have passed without a new best validation loss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyStopping {
    pub patience: usize,
    /// When set, stopping is additionally gated on the best loss being below this value.
    pub stop_below: Option<f64>,
}

impl EarlyStopping {
    pub fn new(patience: usize, stop_below: Option<f64>) -> Self {
        Self {
            patience,
            stop_below,
        }
    }

    /// Folds the validation loss of `epoch` (numbered from 0) into `state`.
    pub fn record(&self, state: &mut RunState, epoch: usize, validation_loss: f64) -> EpochOutcome {
        state.current_epoch = epoch;
        let improved = validation_loss < state.best_validation_loss;
        if improved {
            state.best_validation_loss = validation_loss;
            state.best_epoch = epoch;
        }

        let exhausted = epoch > state.best_epoch + self.patience;
        let gate_open = self
            .stop_below
            .is_none_or(|threshold| state.best_validation_loss < threshold);

        EpochOutcome {
            improved,
            stop: exhausted && gate_open,
        }
    }
}

/// Rounds `loss` half away from zero to `decimals` places.
pub fn round_loss(loss: f64, decimals: Option<i32>) -> f64 {
    match decimals {
        Some(decimals) => {
            let factor = 10f64.powi(decimals);
            (loss * factor).round() / factor
        }
        None => loss,
    }
}
