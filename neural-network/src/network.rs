use crate::activations::{ActivationFunction, SIGMOID};
use crate::error::{NetworkError, Result};
use crate::momentum::{Gradients, MomentumState};
use crate::network_config::NetworkConfig;
use crate::output_head::OutputHead;
use crate::parameters::NetworkParameters;
use matrix::{Matrix, seeded_rng};
use std::path::Path;

/// Activations produced by one forward pass, consumed by the backward pass that follows.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardPass {
    /// Sigmoid hidden layer, `N x hidden`
    pub hidden: Matrix,
    /// Output of the head activation, `N x output_dim`
    pub output: Matrix,
}

/// A two-layer feed-forward network trained by backpropagation with momentum.
///
/// The hidden layer is always a sigmoid; the output activation and loss are chosen by the
/// [`OutputHead`]. Inputs are batches with one sample per row.
///
/// # Examples
///
/// ```
/// use neural_network::{Network, NetworkConfig, OutputHead};
/// use matrix::matrix;
///
/// let config = NetworkConfig {
///     head: OutputHead::Classification,
///     hidden_nodes: 4,
///     seed: Some(1),
///     ..NetworkConfig::default()
/// };
/// let mut network = Network::new(&config, 2, 2).unwrap();
///
/// let inputs = matrix![0.0, 1.0; 1.0, 0.0];
/// let targets = matrix![1.0, 0.0; 0.0, 1.0];
/// network.train_step(&inputs, &targets).unwrap();
///
/// let probabilities = network.predict(&inputs).unwrap();
/// assert_eq!(probabilities.shape(), (2, 2));
/// ```
#[derive(Clone, Debug)]
pub struct Network {
    parameters: NetworkParameters,
    momentum_state: MomentumState,
    head: OutputHead,
    learning_rate: f64,
    momentum: f64,
}

impl Network {
    /// Creates a network with standard-normal weights and zero biases.
    pub fn new(config: &NetworkConfig, input_dim: usize, output_dim: usize) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let parameters =
            NetworkParameters::random(input_dim, config.hidden_nodes, output_dim, &mut rng);
        Self::from_parameters(config, parameters)
    }

    /// Wraps previously trained parameters.
    ///
    /// Layer widths come from `parameters`; `config.hidden_nodes` is not consulted.
    /// Momentum starts from zero.
    pub fn from_parameters(config: &NetworkConfig, parameters: NetworkParameters) -> Result<Self> {
        config.validate()?;
        parameters.validate()?;
        Ok(Self {
            momentum_state: MomentumState::zeros_like(&parameters),
            parameters,
            head: config.head,
            learning_rate: config.learning_rate,
            momentum: config.momentum,
        })
    }

    /// Restores a network from a checkpoint written by [`Network::save`].
    pub fn load<P: AsRef<Path>>(config: &NetworkConfig, path: P) -> Result<Self> {
        Self::from_parameters(config, NetworkParameters::load(path)?)
    }

    /// Saves the current parameters.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.parameters.save(path)
    }

    /// Runs the inputs through both layers.
    ///
    /// `hidden = sigmoid(inputs . w1 + b1)`, `output = head(hidden . w2 + b2)`.
    pub fn forward(&self, inputs: &Matrix) -> Result<ForwardPass> {
        self.parameters.check_inputs(inputs)?;
        let hidden = SIGMOID.apply(
            &inputs
                .dot_multiply(&self.parameters.w1)
                .add_row_vector(&self.parameters.b1),
        );
        let output = self.head.activation().apply(
            &hidden
                .dot_multiply(&self.parameters.w2)
                .add_row_vector(&self.parameters.b2),
        );
        Ok(ForwardPass { hidden, output })
    }

    /// Loss of a forward pass output against `targets`.
    pub fn loss(&self, output: &Matrix, targets: &Matrix) -> Result<f64> {
        self.parameters.check_targets(output, targets)?;
        self.head.loss(output, targets)
    }

    /// Gradients of the loss for the batch that produced `pass`.
    pub fn gradients(
        &self,
        inputs: &Matrix,
        pass: &ForwardPass,
        targets: &Matrix,
    ) -> Result<Gradients> {
        self.check_batch(inputs, pass, targets)?;
        let output_delta = self.head.output_delta(&pass.output, targets);
        let hidden_delta = output_delta
            .dot_multiply(&self.parameters.w2.transpose())
            .elementwise_multiply(&SIGMOID.derivative(&pass.hidden));

        Ok(Gradients {
            w2: pass.hidden.transpose().dot_multiply(&output_delta),
            b2: output_delta.sum_columns(),
            w1: inputs.transpose().dot_multiply(&hidden_delta),
            b1: hidden_delta.sum_columns(),
        })
    }

    /// Applies one momentum update computed from `pass`.
    ///
    /// `pass` must come from [`Network::forward`] on the same `inputs` with the current
    /// parameters.
    pub fn backpropagate(
        &mut self,
        inputs: &Matrix,
        pass: &ForwardPass,
        targets: &Matrix,
    ) -> Result<()> {
        let gradients = self.gradients(inputs, pass, targets)?;
        self.momentum_state.apply(
            &mut self.parameters,
            &gradients,
            self.learning_rate,
            self.momentum,
        );
        Ok(())
    }

    /// Forward pass, loss and backward pass over one batch. Returns the loss before the update.
    ///
    /// A non-finite loss aborts the step before the parameters are touched.
    pub fn train_step(&mut self, inputs: &Matrix, targets: &Matrix) -> Result<f64> {
        self.parameters.check_inputs(inputs)?;
        self.parameters.check_targets(inputs, targets)?;
        let pass = self.forward(inputs)?;
        let loss = self.head.loss(&pass.output, targets)?;
        self.backpropagate(inputs, &pass, targets)?;
        Ok(loss)
    }

    /// Loss of the network on a batch, without updating anything.
    pub fn evaluate(&self, inputs: &Matrix, targets: &Matrix) -> Result<(f64, Matrix)> {
        self.parameters.check_targets(inputs, targets)?;
        let pass = self.forward(inputs)?;
        let loss = self.head.loss(&pass.output, targets)?;
        Ok((loss, pass.output))
    }

    /// Raw network output: class probabilities or the regression value, one row per sample.
    pub fn predict(&self, inputs: &Matrix) -> Result<Matrix> {
        Ok(self.forward(inputs)?.output)
    }

    pub fn parameters(&self) -> &NetworkParameters {
        &self.parameters
    }

    pub fn momentum_state(&self) -> &MomentumState {
        &self.momentum_state
    }

    pub fn head(&self) -> OutputHead {
        self.head
    }

    pub fn input_dim(&self) -> usize {
        self.parameters.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.parameters.output_dim
    }

    fn check_batch(&self, inputs: &Matrix, pass: &ForwardPass, targets: &Matrix) -> Result<()> {
        self.parameters.check_inputs(inputs)?;
        self.parameters.check_targets(inputs, targets)?;
        self.parameters.check_targets(inputs, &pass.output)?;
        if pass.hidden.shape() != (inputs.rows(), self.parameters.hidden_dim()) {
            return Err(NetworkError::ShapeMismatch(format!(
                "hidden activations are {}x{}, expected {}x{}",
                pass.hidden.rows(),
                pass.hidden.cols(),
                inputs.rows(),
                self.parameters.hidden_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use matrix::matrix;
    use tempfile::NamedTempFile;

    /// Helper function to create a small seeded network for testing
    fn create_test_network(head: OutputHead, output_dim: usize) -> Network {
        let config = NetworkConfig {
            head,
            hidden_nodes: 3,
            learning_rate: 0.5,
            momentum: 0.8,
            seed: Some(42),
        };
        Network::new(&config, 2, output_dim).unwrap()
    }

    /// Helper function to create XOR training data
    fn create_xor_data() -> (Matrix, Matrix) {
        let inputs = matrix![
            0.0, 0.0;
            0.0, 1.0;
            1.0, 0.0;
            1.0, 1.0
        ];
        let targets = matrix![
            1.0, 0.0;
            0.0, 1.0;
            0.0, 1.0;
            1.0, 0.0
        ];
        (inputs, targets)
    }

    #[test]
    fn test_network_creation() {
        let network = create_test_network(OutputHead::Classification, 2);
        let parameters = network.parameters();

        assert_eq!(parameters.w1.shape(), (2, 3));
        assert_eq!(parameters.b1.shape(), (1, 3));
        assert_eq!(parameters.w2.shape(), (3, 2));
        assert_eq!(parameters.b2.shape(), (1, 2));
        assert_eq!(network.input_dim(), 2);
        assert_eq!(network.output_dim(), 2);
    }

    #[test]
    fn test_forward_output_shape() {
        for (head, output_dim) in [(OutputHead::Regression, 1), (OutputHead::Classification, 4)] {
            let network = create_test_network(head, output_dim);
            let inputs = Matrix::zeros(7, 2);

            let pass = network.forward(&inputs).unwrap();
            assert_eq!(pass.hidden.shape(), (7, 3));
            assert_eq!(pass.output.shape(), (7, output_dim));
        }
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let network = create_test_network(OutputHead::Regression, 1);

        assert!(matches!(
            network.forward(&Matrix::zeros(2, 3)),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_softmax_output() {
        let network = create_test_network(OutputHead::Classification, 3);
        let output = network.predict(&matrix![0.5, -0.2; 3.0, 1.0]).unwrap();

        for row in 0..output.rows() {
            let sum: f64 = output.row(row).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-9);
            assert!(output.row(row).iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_regression_output_is_non_negative() {
        let network = create_test_network(OutputHead::Regression, 1);
        let output = network
            .predict(&matrix![1.0, 1.0; -5.0, 5.0; 3.0, -2.0])
            .unwrap();

        assert!(output.values().iter().all(|&value| value >= 0.0));
    }

    #[test]
    fn test_gradients_match_hand_computation() {
        let config = NetworkConfig {
            head: OutputHead::Regression,
            hidden_nodes: 1,
            learning_rate: 1.0,
            momentum: 0.0,
            seed: None,
        };
        let parameters = NetworkParameters {
            w1: matrix![0.0],
            w2: matrix![2.0],
            b1: matrix![0.0],
            b2: matrix![0.0],
            input_dim: 1,
            output_dim: 1,
        };
        let network = Network::from_parameters(&config, parameters).unwrap();
        let inputs = matrix![1.0];
        let targets = matrix![0.0];

        // hidden = sigmoid(0) = 0.5, output = relu(0.5 * 2) = 1
        let pass = network.forward(&inputs).unwrap();
        assert_eq!(pass.hidden, matrix![0.5]);
        assert_eq!(pass.output, matrix![1.0]);

        // delta2 = 1, hidden delta = 1 * 2 * 0.25 = 0.5
        let gradients = network.gradients(&inputs, &pass, &targets).unwrap();
        assert_eq!(gradients.w2, matrix![0.5]);
        assert_eq!(gradients.b2, matrix![1.0]);
        assert_eq!(gradients.w1, matrix![0.5]);
        assert_eq!(gradients.b1, matrix![0.5]);
    }

    #[test]
    fn test_backpropagation_changes_parameters() {
        let mut network = create_test_network(OutputHead::Classification, 2);
        let initial = network.parameters().clone();
        let (inputs, targets) = create_xor_data();

        let pass = network.forward(&inputs).unwrap();
        network.backpropagate(&inputs, &pass, &targets).unwrap();

        assert_ne!(network.parameters().w1, initial.w1);
        assert_ne!(network.parameters().w2, initial.w2);
        assert_ne!(network.parameters().b1, initial.b1);
        assert_ne!(network.parameters().b2, initial.b2);
    }

    #[test]
    fn test_backpropagation_is_deterministic() {
        let pristine = create_test_network(OutputHead::Classification, 2);
        let (inputs, targets) = create_xor_data();

        let mut first = pristine.clone();
        let mut second = pristine.clone();
        for network in [&mut first, &mut second] {
            let pass = network.forward(&inputs).unwrap();
            network.backpropagate(&inputs, &pass, &targets).unwrap();
        }

        assert_eq!(first.parameters(), second.parameters());
        assert_eq!(first.momentum_state(), second.momentum_state());
    }

    #[test]
    fn test_backpropagation_rejects_row_mismatch() {
        let mut network = create_test_network(OutputHead::Classification, 2);
        let (inputs, _) = create_xor_data();
        let pass = network.forward(&inputs).unwrap();
        let before = network.parameters().clone();

        let result = network.backpropagate(&inputs, &pass, &Matrix::zeros(3, 2));

        assert!(matches!(result, Err(NetworkError::ShapeMismatch(_))));
        assert_eq!(network.parameters(), &before);
    }

    #[test]
    fn test_predict_does_not_touch_momentum() {
        let mut network = create_test_network(OutputHead::Classification, 2);
        let (inputs, targets) = create_xor_data();
        network.train_step(&inputs, &targets).unwrap();
        let momentum = network.momentum_state().clone();
        let parameters = network.parameters().clone();

        let first = network.predict(&inputs).unwrap();
        let second = network.predict(&inputs).unwrap();

        assert_eq!(first, second);
        assert_eq!(network.momentum_state(), &momentum);
        assert_eq!(network.parameters(), &parameters);
    }

    #[test]
    fn test_train_xor() {
        let config = NetworkConfig {
            head: OutputHead::Classification,
            hidden_nodes: 8,
            learning_rate: 0.5,
            momentum: 0.8,
            seed: Some(3),
        };
        let mut network = Network::new(&config, 2, 2).unwrap();
        let (inputs, targets) = create_xor_data();

        let initial_loss = network.evaluate(&inputs, &targets).unwrap().0;
        for _ in 0..2000 {
            network.train_step(&inputs, &targets).unwrap();
        }
        let (final_loss, output) = network.evaluate(&inputs, &targets).unwrap();

        assert!(final_loss < initial_loss);
        assert_eq!(output.argmax_rows(), targets.argmax_rows());
    }

    #[test]
    fn test_regression_loss_decreases() {
        let config = NetworkConfig {
            head: OutputHead::Regression,
            hidden_nodes: 8,
            learning_rate: 0.1,
            momentum: 0.5,
            seed: Some(11),
        };
        let mut network = Network::new(&config, 2, 1).unwrap();
        let inputs = matrix![0.0, 0.0; 0.0, 1.0; 1.0, 0.0; 1.0, 1.0];
        let targets = matrix![2.0; 5.0; 5.0; 8.0];

        let initial_loss = network.evaluate(&inputs, &targets).unwrap().0;
        for _ in 0..500 {
            network.train_step(&inputs, &targets).unwrap();
        }
        let final_loss = network.evaluate(&inputs, &targets).unwrap().0;

        assert!(final_loss < initial_loss);
    }

    #[test]
    fn test_save_and_load() {
        let network = create_test_network(OutputHead::Classification, 2);
        let temp_file = NamedTempFile::new().unwrap();

        network.save(temp_file.path()).unwrap();
        let config = NetworkConfig {
            hidden_nodes: 99,
            ..NetworkConfig::default()
        };
        let loaded = Network::load(&config, temp_file.path()).unwrap();

        assert_eq!(loaded.parameters(), network.parameters());
        assert_eq!(loaded.parameters().hidden_dim(), 3);
        let zeros = MomentumState::zeros_like(loaded.parameters());
        assert_eq!(loaded.momentum_state(), &zeros);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = NetworkConfig {
            hidden_nodes: 0,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            Network::new(&config, 2, 2),
            Err(NetworkError::InvalidConfig(_))
        ));
    }
}
