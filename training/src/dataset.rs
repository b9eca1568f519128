use crate::error::{Result, TrainingError};
use matrix::Matrix;

/// Inputs paired row-for-row with their targets.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    inputs: Matrix,
    targets: Matrix,
}

impl Dataset {
    /// # Errors
    /// Returns [`TrainingError::DataMismatch`] when the row counts differ.
    pub fn new(inputs: Matrix, targets: Matrix) -> Result<Self> {
        if inputs.rows() != targets.rows() {
            return Err(TrainingError::DataMismatch(format!(
                "{} input rows but {} target rows",
                inputs.rows(),
                targets.rows()
            )));
        }
        Ok(Self { inputs, targets })
    }

    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    pub fn targets(&self) -> &Matrix {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_dim(&self) -> usize {
        self.inputs.cols()
    }

    pub fn target_dim(&self) -> usize {
        self.targets.cols()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            inputs: self.inputs.select_rows(indices),
            targets: self.targets.select_rows(indices),
        }
    }
}
