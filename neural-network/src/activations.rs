use matrix::Matrix;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivationType {
    Sigmoid,
    Relu,
    Softmax,
}

/// A layer activation applied to a whole batch, one sample per row.
pub trait ActivationFunction: Send + Sync {
    fn apply(&self, input: &Matrix) -> Matrix;

    fn activation_type(&self) -> ActivationType;
}

#[derive(Clone, Copy, Debug)]
pub struct Sigmoid;

impl Sigmoid {
    /// Derivative expressed in terms of the already activated output.
    #[must_use]
    pub fn derivative(&self, activated: &Matrix) -> Matrix {
        activated.map(|h| h * (1.0 - h))
    }
}

impl ActivationFunction for Sigmoid {
    fn apply(&self, input: &Matrix) -> Matrix {
        input.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    fn activation_type(&self) -> ActivationType {
        ActivationType::Sigmoid
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Relu;

impl ActivationFunction for Relu {
    fn apply(&self, input: &Matrix) -> Matrix {
        input.map(|x| x.max(0.0))
    }

    fn activation_type(&self) -> ActivationType {
        ActivationType::Relu
    }
}

/// Row-wise softmax. The row maximum is subtracted before exponentiating.
#[derive(Clone, Copy, Debug)]
pub struct Softmax;

impl ActivationFunction for Softmax {
    fn apply(&self, input: &Matrix) -> Matrix {
        let exponentials = input
            .subtract_column_vector(&input.row_max())
            .map(f64::exp);
        exponentials.divide_column_vector(&exponentials.row_sum())
    }

    fn activation_type(&self) -> ActivationType {
        ActivationType::Softmax
    }
}

pub const SIGMOID: Sigmoid = Sigmoid;
pub const RELU: Relu = Relu;
pub const SOFTMAX: Softmax = Softmax;
