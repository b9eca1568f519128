//! Weights and biases of the two-layer network, persisted and restored as one unit.
use crate::error::{NetworkError, Result};
use matrix::{Matrix, MatrixRng};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of an `input -> hidden -> output` network.
///
/// Samples are rows, so `w1` is `input_dim x hidden` and biases are `1 x width` row vectors.
/// `input_dim` and `output_dim` are stored alongside the matrices so a restored network can
/// reject data of the wrong width.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NetworkParameters {
    pub w1: Matrix,
    pub w2: Matrix,
    pub b1: Matrix,
    pub b2: Matrix,
    pub input_dim: usize,
    pub output_dim: usize,
}

impl NetworkParameters {
    /// Standard-normal weights and zero biases.
    pub fn random(
        input_dim: usize,
        hidden_nodes: usize,
        output_dim: usize,
        rng: &mut MatrixRng,
    ) -> Self {
        let w1 = Matrix::random_normal(input_dim, hidden_nodes, rng);
        let w2 = Matrix::random_normal(hidden_nodes, output_dim, rng);
        Self {
            w1,
            w2,
            b1: Matrix::zeros(1, hidden_nodes),
            b2: Matrix::zeros(1, output_dim),
            input_dim,
            output_dim,
        }
    }

    pub fn hidden_dim(&self) -> usize {
        self.w1.cols()
    }

    /// Checks that every matrix agrees with the recorded dimensions.
    pub fn validate(&self) -> Result<()> {
        let hidden = self.hidden_dim();
        let expected = [
            ("w1", self.w1.shape(), (self.input_dim, hidden)),
            ("b1", self.b1.shape(), (1, hidden)),
            ("w2", self.w2.shape(), (hidden, self.output_dim)),
            ("b2", self.b2.shape(), (1, self.output_dim)),
        ];
        for (name, actual, wanted) in expected {
            if actual != wanted {
                return Err(NetworkError::ShapeMismatch(format!(
                    "{name} is {}x{}, expected {}x{}",
                    actual.0, actual.1, wanted.0, wanted.1
                )));
            }
        }
        if self.input_dim == 0 || hidden == 0 || self.output_dim == 0 {
            return Err(NetworkError::ShapeMismatch(format!(
                "network dimensions must be non-zero, got {}x{}x{}",
                self.input_dim, hidden, self.output_dim
            )));
        }
        Ok(())
    }

    /// Rejects inputs whose width differs from `input_dim`, or that have no rows.
    pub fn check_inputs(&self, inputs: &Matrix) -> Result<()> {
        if inputs.rows() == 0 {
            return Err(NetworkError::EmptyBatch("inputs have no rows"));
        }
        if inputs.cols() != self.input_dim {
            return Err(NetworkError::ShapeMismatch(format!(
                "inputs have {} columns, network expects {}",
                inputs.cols(),
                self.input_dim
            )));
        }
        Ok(())
    }

    /// Rejects targets that do not pair row-for-row with `inputs` or have the wrong width.
    pub fn check_targets(&self, inputs: &Matrix, targets: &Matrix) -> Result<()> {
        if inputs.rows() != targets.rows() {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} input rows but {} target rows",
                inputs.rows(),
                targets.rows()
            )));
        }
        if targets.cols() != self.output_dim {
            return Err(NetworkError::ShapeMismatch(format!(
                "targets have {} columns, network expects {}",
                targets.cols(),
                self.output_dim
            )));
        }
        Ok(())
    }

    /// Saves the parameters as JSON.
    ///
    /// The file is written next to `path` first and then renamed over it, so a reader never
    /// observes a partially written checkpoint.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let staging = staging_path(path);
        fs::write(&staging, json)?;
        fs::rename(&staging, path)?;
        Ok(())
    }

    /// Loads parameters saved with [`NetworkParameters::save`] and validates their shapes.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let parameters: NetworkParameters = serde_json::from_str(&json)?;
        parameters.validate()?;
        Ok(parameters)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("parameters"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix::{matrix, seeded_rng};
    use tempfile::tempdir;

    fn create_test_parameters() -> NetworkParameters {
        NetworkParameters::random(3, 4, 2, &mut seeded_rng(Some(42)))
    }

    #[test]
    fn test_random_shapes() {
        let parameters = create_test_parameters();

        assert_eq!(parameters.w1.shape(), (3, 4));
        assert_eq!(parameters.b1, Matrix::zeros(1, 4));
        assert_eq!(parameters.w2.shape(), (4, 2));
        assert_eq!(parameters.b2, Matrix::zeros(1, 2));
        assert_eq!(parameters.hidden_dim(), 4);
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_shapes() {
        let mut parameters = create_test_parameters();
        parameters.output_dim = 3;

        assert!(matches!(
            parameters.validate(),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_check_inputs_and_targets() {
        let parameters = create_test_parameters();
        let inputs = Matrix::zeros(5, 3);

        assert!(parameters.check_inputs(&inputs).is_ok());
        assert!(parameters.check_inputs(&Matrix::zeros(5, 2)).is_err());
        assert!(matches!(
            parameters.check_inputs(&Matrix::zeros(0, 3)),
            Err(NetworkError::EmptyBatch(_))
        ));
        assert!(parameters.check_targets(&inputs, &Matrix::zeros(5, 2)).is_ok());
        assert!(parameters.check_targets(&inputs, &Matrix::zeros(4, 2)).is_err());
        assert!(parameters.check_targets(&inputs, &Matrix::zeros(5, 1)).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        let parameters = create_test_parameters();

        parameters.save(&path).unwrap();
        let loaded = NetworkParameters::load(&path).unwrap();

        assert_eq!(loaded, parameters);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_save_is_byte_for_byte_stable() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        let parameters = create_test_parameters();

        parameters.save(&first).unwrap();
        NetworkParameters::load(&first)
            .unwrap()
            .save(&second)
            .unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn test_save_overwrites_previous_checkpoint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        let mut parameters = create_test_parameters();

        parameters.save(&path).unwrap();
        parameters.b2 = matrix![0.5, -0.5];
        parameters.save(&path).unwrap();

        assert_eq!(NetworkParameters::load(&path).unwrap().b2, matrix![0.5, -0.5]);
    }

    #[test]
    fn test_load_rejects_inconsistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        let mut parameters = create_test_parameters();
        parameters.input_dim = 9;
        fs::write(&path, serde_json::to_string(&parameters).unwrap()).unwrap();

        assert!(matches!(
            NetworkParameters::load(&path),
            Err(NetworkError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            NetworkParameters::load(dir.path().join("missing.json")),
            Err(NetworkError::Io(_))
        ));
    }
}
