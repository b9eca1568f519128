use ndarray::{Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random number generator used for weight initialisation.
pub type MatrixRng = StdRng;

/// Returns a generator seeded from `seed`, or from OS entropy when `seed` is `None`.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> MatrixRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// A dense row-major `f64` matrix.
///
/// Every sample is a row: a batch of `N` samples with `D` features is an `N x D` matrix.
/// Operand shape violations panic, callers are expected to validate at their API boundary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Matrix {
    pub(crate) data: Array2<f64>,
}

impl Matrix {
    #[must_use]
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Data length must match rows * cols"
        );
        let data = Array2::from_shape_vec((rows, cols), data).unwrap_or_default();
        Self { data }
    }

    /// Builds a matrix from equally sized rows.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "Inconsistent number of elements in the matrix rows"
        );
        let data = rows.iter().flatten().copied().collect();
        Self::new(rows.len(), cols, data)
    }

    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Samples every element from the standard normal distribution.
    #[must_use]
    pub fn random_normal(rows: usize, cols: usize, rng: &mut MatrixRng) -> Self {
        Self {
            data: Array2::random_using((rows, cols), StandardNormal, rng),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    #[inline(always)]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    #[inline(always)]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// Element at `(row, col)`, or `None` when either index is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    #[must_use]
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).to_vec()
    }

    /// Elements in row-major order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    #[must_use]
    pub fn elementwise_multiply(&self, other: &Matrix) -> Matrix {
        self.assert_same_shape(other);
        Matrix::from(&self.data * &other.data)
    }

    #[must_use]
    pub fn dot_multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.cols(),
            other.rows(),
            "Invalid matrix dimensions for multiplication"
        );
        Matrix::from(self.data.dot(&other.data))
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        Matrix::from(self.data.t().to_owned())
    }

    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Matrix::from(self.data.mapv(f))
    }

    #[must_use]
    pub fn add(&self, other: &Matrix) -> Matrix {
        self.assert_same_shape(other);
        Matrix::from(&self.data + &other.data)
    }

    #[must_use]
    pub fn subtract(&self, other: &Matrix) -> Matrix {
        self.assert_same_shape(other);
        Matrix::from(&self.data - &other.data)
    }

    #[must_use]
    pub fn scale(&self, factor: f64) -> Matrix {
        Matrix::from(&self.data * factor)
    }

    /// Adds a `1 x cols` row vector to every row.
    #[must_use]
    pub fn add_row_vector(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows(), 1, "Row vector must have exactly one row");
        assert_eq!(self.cols(), row.cols(), "Matrix columns must match");
        Matrix::from(&self.data + &row.data)
    }

    /// Subtracts entry `i` of the `rows x 1` column vector from every element of row `i`.
    #[must_use]
    pub fn subtract_column_vector(&self, column: &Matrix) -> Matrix {
        assert_eq!(column.cols(), 1, "Column vector must have exactly one column");
        assert_eq!(self.rows(), column.rows(), "Matrix rows must match");
        Matrix::from(&self.data - &column.data)
    }

    /// Divides every element of row `i` by entry `i` of the `rows x 1` column vector.
    #[must_use]
    pub fn divide_column_vector(&self, column: &Matrix) -> Matrix {
        assert_eq!(column.cols(), 1, "Column vector must have exactly one column");
        assert_eq!(self.rows(), column.rows(), "Matrix rows must match");
        Matrix::from(&self.data / &column.data)
    }

    /// Sums each column, giving a `1 x cols` row vector.
    #[must_use]
    pub fn sum_columns(&self) -> Matrix {
        Matrix::from(self.data.sum_axis(Axis(0)).insert_axis(Axis(0)))
    }

    /// Sums each row, giving a `rows x 1` column vector.
    #[must_use]
    pub fn row_sum(&self) -> Matrix {
        Matrix::from(self.data.sum_axis(Axis(1)).insert_axis(Axis(1)))
    }

    /// Maximum of each row, giving a `rows x 1` column vector.
    #[must_use]
    pub fn row_max(&self) -> Matrix {
        let max = self
            .data
            .map_axis(Axis(1), |row| row.fold(f64::NEG_INFINITY, |a, &b| a.max(b)));
        Matrix::from(max.insert_axis(Axis(1)))
    }

    /// Column index of the largest element in each row. The first index wins ties.
    #[must_use]
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.data
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |(best, max), (idx, &value)| {
                        if value > max { (idx, value) } else { (best, max) }
                    })
                    .0
            })
            .collect()
    }

    /// Copies the given rows, in the given order, into a new matrix.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        Matrix::from(self.data.select(Axis(0), indices))
    }

    /// Mean of all elements, `0.0` for an empty matrix.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.data.mean().unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    fn assert_same_shape(&self, other: &Matrix) {
        assert_eq!(self.rows(), other.rows(), "Matrix rows must match");
        assert_eq!(self.cols(), other.cols(), "Matrix columns must match");
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::zeros(0, 0)
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(data: Array2<f64>) -> Self {
        Matrix { data }
    }
}

/// A single column, one row per element.
impl From<Vec<f64>> for Matrix {
    fn from(vec: Vec<f64>) -> Self {
        let rows = vec.len();
        Matrix::new(rows, 1, vec)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.rows() {
            for value in row {
                write!(f, "{:8.4}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
