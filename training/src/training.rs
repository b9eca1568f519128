//! Training loop for the two-layer network.
//!
//! This module provides:
//! - Full-batch and mini-batch training with momentum updates
//! - Early stopping on the validation loss
//! - Checkpointing of every new best set of parameters
//! - Progress visualization using progress bars

use crate::batches::MiniBatches;
use crate::checkpoint::{CheckpointStore, FileCheckpoint};
use crate::dataset::Dataset;
use crate::early_stopping::{EarlyStopping, RunState, round_loss};
use crate::error::{Result, TrainingError};
use crate::metrics::{Evaluation, Report, explained_variance, precision_recall_fscore_support};
use crate::training_config::TrainingConfig;
use crate::training_history::TrainingHistory;
use indicatif::{ProgressBar, ProgressStyle};
use matrix::Matrix;
use neural_network::{Network, NetworkConfig, NetworkError, OutputHead};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct TrainingData {
    train: Dataset,
    validation: Option<Dataset>,
}

impl TrainingData {
    /// The validation set, or the training set when none was supplied.
    fn evaluation_set(&self) -> &Dataset {
        self.validation.as_ref().unwrap_or(&self.train)
    }
}

/// Trainer owns a network, its data and the checkpoint it writes to.
///
/// A trainer built with [`Trainer::new`] can train. One built with [`Trainer::restore`]
/// only holds parameters loaded from a checkpoint and can predict.
pub struct Trainer {
    network: Network,
    config: TrainingConfig,
    data: Option<TrainingData>,
    checkpoint: Box<dyn CheckpointStore>,
    state: RunState,
    history: TrainingHistory,
}

impl Trainer {
    /// Creates a trainer with fresh random weights sized from the data.
    ///
    /// # Arguments
    /// * `network_config` - Head, hidden width and optimiser settings
    /// * `config` - Training loop settings
    /// * `train` - Rows the network is fitted to
    /// * `validation` - Rows used for early stopping; the training rows are used when `None`
    /// * `checkpoint` - Receives the parameters whenever the validation loss improves
    pub fn new(
        network_config: &NetworkConfig,
        config: TrainingConfig,
        train: Dataset,
        validation: Option<Dataset>,
        checkpoint: Box<dyn CheckpointStore>,
    ) -> Result<Self> {
        config.validate()?;
        if train.is_empty() {
            return Err(TrainingError::DataMismatch(
                "training set has no rows".to_owned(),
            ));
        }
        if let Some(validation) = &validation {
            if validation.is_empty() {
                return Err(TrainingError::DataMismatch(
                    "validation set has no rows".to_owned(),
                ));
            }
            if validation.input_dim() != train.input_dim()
                || validation.target_dim() != train.target_dim()
            {
                return Err(TrainingError::DataMismatch(format!(
                    "validation set is {}->{} wide, training set is {}->{}",
                    validation.input_dim(),
                    validation.target_dim(),
                    train.input_dim(),
                    train.target_dim()
                )));
            }
        }

        let network = Network::new(network_config, train.input_dim(), train.target_dim())?;
        info!(
            network = %network_config,
            rows = train.len(),
            checkpoint = %checkpoint.describe(),
            "created trainer"
        );

        Ok(Self {
            network,
            config,
            data: Some(TrainingData { train, validation }),
            checkpoint,
            state: RunState::default(),
            history: TrainingHistory::new(),
        })
    }

    /// Loads previously checkpointed parameters. The result can predict but not train.
    pub fn restore<P: AsRef<Path>>(
        network_config: &NetworkConfig,
        config: TrainingConfig,
        path: P,
    ) -> Result<Self> {
        let checkpoint = FileCheckpoint::new(path.as_ref());
        let network = Network::from_parameters(network_config, checkpoint.load()?)?;
        info!(checkpoint = %checkpoint.describe(), "restored network");

        Ok(Self {
            network,
            config,
            data: None,
            checkpoint: Box::new(checkpoint),
            state: RunState::default(),
            history: TrainingHistory::new(),
        })
    }

    pub fn is_trainable(&self) -> bool {
        self.data.is_some()
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn run_state(&self) -> &RunState {
        &self.state
    }

    /// Returns the training history of the most recent run
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Trains on the whole training set as one batch per epoch.
    pub fn train(&mut self) -> Result<&TrainingHistory> {
        if self.data.is_none() {
            return Err(TrainingError::NotTrainable);
        }
        let progress = self.start_run("full batch");

        for epoch in 0..self.config.epochs {
            let Some(data) = self.data.as_ref() else {
                return Err(TrainingError::NotTrainable);
            };
            let train_loss = self
                .network
                .train_step(data.train.inputs(), data.train.targets())?;
            if self.finish_epoch(epoch, train_loss, &progress)? {
                break;
            }
        }

        self.finish_run(&progress);
        Ok(&self.history)
    }

    /// Trains in mini-batches of `batch_size` rows, one momentum update per batch.
    ///
    /// Only the classification head supports mini-batches.
    pub fn train_minibatch(&mut self) -> Result<&TrainingHistory> {
        if self.data.is_none() {
            return Err(TrainingError::NotTrainable);
        }
        if self.network.head() != OutputHead::Classification {
            return Err(TrainingError::Unsupported(format!(
                "mini-batch training needs a classification head, not {}",
                self.network.head()
            )));
        }
        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let progress = self.start_run("mini-batch");

        for epoch in 0..self.config.epochs {
            let Some(data) = self.data.as_ref() else {
                return Err(TrainingError::NotTrainable);
            };
            let (inputs, targets) = (data.train.inputs(), data.train.targets());
            let batches = if self.config.shuffle {
                MiniBatches::shuffled(inputs, targets, self.config.batch_size, &mut rng)?
            } else {
                MiniBatches::sequential(inputs, targets, self.config.batch_size)?
            };

            let mut total = 0.0;
            let mut count = 0usize;
            for (batch_inputs, batch_targets) in batches {
                total += self.network.train_step(&batch_inputs, &batch_targets)?;
                count += 1;
            }
            let train_loss = total / count.max(1) as f64;

            if self.finish_epoch(epoch, train_loss, &progress)? {
                break;
            }
        }

        self.finish_run(&progress);
        Ok(&self.history)
    }

    /// Loss on the validation set, or on the training set when there is none.
    pub fn test(&self) -> Result<f64> {
        let data = self.data.as_ref().ok_or(TrainingError::NotTrainable)?;
        let set = data.evaluation_set();
        let (loss, _) = self.network.evaluate(set.inputs(), set.targets())?;
        Ok(loss)
    }

    /// Loss and a task-specific report for an arbitrary dataset.
    pub fn test_with(&self, dataset: &Dataset) -> Result<Evaluation> {
        let (loss, output) = self.network.evaluate(dataset.inputs(), dataset.targets())?;
        let report = match self.network.head() {
            OutputHead::Classification => Report::Classification(precision_recall_fscore_support(
                &dataset.targets().argmax_rows(),
                &output.argmax_rows(),
                self.network.output_dim(),
            )),
            OutputHead::Regression => Report::Regression {
                explained_variance: explained_variance(dataset.targets(), &output),
            },
        };
        Ok(Evaluation { loss, report })
    }

    /// Network output for `inputs`. Never changes the parameters or momentum.
    pub fn predict(&self, inputs: &Matrix) -> Result<Matrix> {
        Ok(self.network.predict(inputs)?)
    }

    fn start_run(&mut self, mode: &str) -> ProgressBar {
        self.state = RunState::default();
        self.history = TrainingHistory::new();
        info!(
            mode,
            epochs = self.config.epochs,
            patience = self.config.early_stopping_patience,
            "starting training"
        );

        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(self.config.epochs as u64);
        progress.set_style(create_progress_style(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} Epoch {msg}",
        ));
        progress
    }

    /// Evaluates, checkpoints on improvement and decides whether to stop.
    fn finish_epoch(
        &mut self,
        epoch: usize,
        train_loss: f64,
        progress: &ProgressBar,
    ) -> Result<bool> {
        let validation_loss = round_loss(self.test()?, self.config.loss_decimals);
        if !validation_loss.is_finite() {
            return Err(NetworkError::NonFiniteLoss {
                kind: "rounded validation",
                loss: validation_loss,
            }
            .into());
        }
        let rule = EarlyStopping::new(self.config.early_stopping_patience, self.config.stop_below);
        let outcome = rule.record(&mut self.state, epoch, validation_loss);
        debug!(epoch, train_loss, validation_loss, improved = outcome.improved, "epoch finished");

        if outcome.improved {
            match self.checkpoint.save(self.network.parameters()) {
                Ok(()) => {
                    self.history.checkpoints_written += 1;
                    info!(
                        epoch,
                        validation_loss,
                        checkpoint = %self.checkpoint.describe(),
                        "validation loss improved, saved checkpoint"
                    );
                }
                Err(err) => {
                    warn!(
                        epoch,
                        checkpoint = %self.checkpoint.describe(),
                        error = %err,
                        "failed to write checkpoint, continuing"
                    );
                    self.history.record_checkpoint_failure(epoch, err.to_string());
                }
            }
        }

        self.history.record_epoch(epoch, train_loss, validation_loss);
        progress.set_message(format!(
            "- Train loss: {train_loss:.4}, Validation loss: {validation_loss:.4}"
        ));
        progress.inc(1);

        if outcome.stop {
            info!(
                epoch,
                best_epoch = self.state.best_epoch,
                best_validation_loss = self.state.best_validation_loss,
                "early stopping"
            );
            self.history.stopped_early_at = Some(epoch);
        }
        Ok(outcome.stop)
    }

    fn finish_run(&self, progress: &ProgressBar) {
        match self.history.stopped_early_at {
            Some(epoch) => progress.finish_with_message(format!(
                "Early stopping at epoch {epoch} with best validation loss: {:.4}",
                self.state.best_validation_loss
            )),
            None => progress.finish_with_message("Training completed!"),
        }
        info!(
            epochs = self.history.epochs_run(),
            checkpoints = self.history.checkpoints_written,
            "training finished"
        );
    }
}

fn create_progress_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
