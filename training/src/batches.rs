//! Mini-batch iteration over a dataset.
use crate::error::{Result, TrainingError};
use matrix::Matrix;
use rand::Rng;
use rand::seq::SliceRandom;

/// Yields `(inputs, targets)` batches of at most `batch_size` rows.
///
/// Every row appears in exactly one batch per pass. Only the last batch may be short.
#[derive(Debug)]
pub struct MiniBatches<'a> {
    inputs: &'a Matrix,
    targets: &'a Matrix,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<'a> MiniBatches<'a> {
    /// Batches in row order, or in a fresh permutation when `rng` is given.
    ///
    /// # Errors
    /// Returns [`TrainingError::InvalidConfig`] for a zero batch size and
    /// [`TrainingError::DataMismatch`] when inputs and targets disagree on row count.
    pub fn new<R: Rng + ?Sized>(
        inputs: &'a Matrix,
        targets: &'a Matrix,
        batch_size: usize,
        rng: Option<&mut R>,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(TrainingError::InvalidConfig(
                "batch_size must be > 0".to_owned(),
            ));
        }
        if inputs.rows() != targets.rows() {
            return Err(TrainingError::DataMismatch(format!(
                "{} input rows but {} target rows",
                inputs.rows(),
                targets.rows()
            )));
        }
        let mut order: Vec<usize> = (0..inputs.rows()).collect();
        if let Some(rng) = rng {
            order.shuffle(rng);
        }
        Ok(Self {
            inputs,
            targets,
            order,
            batch_size,
            position: 0,
        })
    }

    pub fn sequential(inputs: &'a Matrix, targets: &'a Matrix, batch_size: usize) -> Result<Self> {
        Self::new::<rand::rngs::StdRng>(inputs, targets, batch_size, None)
    }

    pub fn shuffled<R: Rng + ?Sized>(
        inputs: &'a Matrix,
        targets: &'a Matrix,
        batch_size: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Self::new(inputs, targets, batch_size, Some(rng))
    }
}

impl Iterator for MiniBatches<'_> {
    type Item = (Matrix, Matrix);

    fn next(&mut self) -> Option<Self::Item> {
        let end = (self.position + self.batch_size).min(self.order.len());
        let indices = self.order.get(self.position..end)?;
        if indices.is_empty() {
            return None;
        }
        self.position = end;
        Some((
            self.inputs.select_rows(indices),
            self.targets.select_rows(indices),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.order.len().saturating_sub(self.position);
        let batches = remaining.div_ceil(self.batch_size);
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for MiniBatches<'_> {}
