//! Classical momentum gradient descent.
use crate::parameters::NetworkParameters;
use matrix::Matrix;

/// Raw gradients of the loss with respect to each parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    pub w1: Matrix,
    pub w2: Matrix,
    pub b1: Matrix,
    pub b2: Matrix,
}

/// Previous update of each parameter, lives only as long as the network it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentumState {
    w1: Matrix,
    w2: Matrix,
    b1: Matrix,
    b2: Matrix,
}

impl MomentumState {
    pub fn zeros_like(parameters: &NetworkParameters) -> Self {
        let zeros = |m: &Matrix| Matrix::zeros(m.rows(), m.cols());
        Self {
            w1: zeros(&parameters.w1),
            w2: zeros(&parameters.w2),
            b1: zeros(&parameters.b1),
            b2: zeros(&parameters.b2),
        }
    }

    /// Updates every parameter with `param -= lr * grad + momentum * previous`.
    ///
    /// The value carried into the next step is `lr * grad` alone, without the momentum
    /// term. All four new parameters are computed before any of them is written.
    pub fn apply(
        &mut self,
        parameters: &mut NetworkParameters,
        gradients: &Gradients,
        learning_rate: f64,
        momentum: f64,
    ) {
        let (w1, prev_w1) =
            momentum_step(&parameters.w1, &gradients.w1, &self.w1, learning_rate, momentum);
        let (w2, prev_w2) =
            momentum_step(&parameters.w2, &gradients.w2, &self.w2, learning_rate, momentum);
        let (b1, prev_b1) =
            momentum_step(&parameters.b1, &gradients.b1, &self.b1, learning_rate, momentum);
        let (b2, prev_b2) =
            momentum_step(&parameters.b2, &gradients.b2, &self.b2, learning_rate, momentum);

        parameters.w1 = w1;
        parameters.w2 = w2;
        parameters.b1 = b1;
        parameters.b2 = b2;
        *self = Self {
            w1: prev_w1,
            w2: prev_w2,
            b1: prev_b1,
            b2: prev_b2,
        };
    }

    pub fn w1(&self) -> &Matrix {
        &self.w1
    }

    pub fn w2(&self) -> &Matrix {
        &self.w2
    }

    pub fn b1(&self) -> &Matrix {
        &self.b1
    }

    pub fn b2(&self) -> &Matrix {
        &self.b2
    }
}

/// Returns the updated parameter and the scaled gradient to remember for the next step.
fn momentum_step(
    parameter: &Matrix,
    gradient: &Matrix,
    previous: &Matrix,
    learning_rate: f64,
    momentum: f64,
) -> (Matrix, Matrix) {
    let scaled = gradient.scale(learning_rate);
    let step = scaled.add(&previous.scale(momentum));
    (parameter.subtract(&step), scaled)
}
