//! Output activation and loss, paired per prediction task.
//!
//! The regression head predicts a non-negative scalar through a ReLU and reports half the
//! mean squared error. The classification head produces softmax probabilities and reports
//! the mean negative log-likelihood of the target class.
//!
//! Both heads back-propagate the same output error signal, `(output - target) / N`. It is the
//! exact gradient of softmax with negative log-likelihood. For the ReLU head it is only exact
//! where the pre-activation is positive; that simplification is kept deliberately.
use crate::activations::{ActivationFunction, RELU, SOFTMAX};
use crate::error::{NetworkError, Result};
use matrix::Matrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probabilities are clamped to at least this value before taking the logarithm.
pub const PROBABILITY_FLOOR: f64 = 1e-12;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputHead {
    /// ReLU output with half mean squared error
    Regression,
    /// Softmax output with negative log-likelihood
    Classification,
}

impl OutputHead {
    pub fn activation(&self) -> &'static dyn ActivationFunction {
        match self {
            OutputHead::Regression => &RELU,
            OutputHead::Classification => &SOFTMAX,
        }
    }

    /// Loss of `output` against `targets`, averaged over the batch.
    ///
    /// # Errors
    /// Returns [`NetworkError::NonFiniteLoss`] instead of a NaN or infinite loss.
    pub fn loss(&self, output: &Matrix, targets: &Matrix) -> Result<f64> {
        let loss = match self {
            OutputHead::Regression => mean_squared_error(output, targets),
            OutputHead::Classification => negative_log_likelihood(output, targets),
        };
        if loss.is_finite() {
            Ok(loss)
        } else {
            Err(NetworkError::NonFiniteLoss {
                kind: self.loss_name(),
                loss,
            })
        }
    }

    /// Error signal at the output layer, `(output - targets) / N`.
    pub fn output_delta(&self, output: &Matrix, targets: &Matrix) -> Matrix {
        let samples = targets.rows().max(1) as f64;
        output.subtract(targets).scale(1.0 / samples)
    }

    pub fn loss_name(&self) -> &'static str {
        match self {
            OutputHead::Regression => "mean squared error",
            OutputHead::Classification => "negative log-likelihood",
        }
    }
}

impl fmt::Display for OutputHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputHead::Regression => write!(f, "regression"),
            OutputHead::Classification => write!(f, "classification"),
        }
    }
}

/// `0.5 * mean((output - targets)^2)`
fn mean_squared_error(output: &Matrix, targets: &Matrix) -> f64 {
    0.5 * output.subtract(targets).map(|d| d * d).mean()
}

/// Mean of `-ln(p)` where `p` is the probability given to each row's target class.
fn negative_log_likelihood(output: &Matrix, targets: &Matrix) -> f64 {
    let classes = targets.argmax_rows();
    if classes.is_empty() {
        return 0.0;
    }
    let total: f64 = classes
        .iter()
        .enumerate()
        .map(|(row, &class)| {
            let probability = output.get(row, class).unwrap_or(0.0);
            -probability.clamp(PROBABILITY_FLOOR, 1.0).ln()
        })
        .sum();
    total / classes.len() as f64
}
