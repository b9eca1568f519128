//! Stable string-to-index encoding of categorical columns.
use crate::error::{Result, TicketError};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Class value to index, ordered by value.
pub type LabelMapping = BTreeMap<String, usize>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderMode {
    /// Build the mapping from the values and store it
    Fit,
    /// Reuse a stored mapping
    Load,
}

/// Encodes columns and keeps one mapping file per column in `dir`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelEncoder {
    dir: PathBuf,
}

impl LabelEncoder {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `label_encoder_<first word of column>.json` inside the encoder directory.
    pub fn mapping_path(&self, column: &str) -> PathBuf {
        let stem = column.split(' ').next().unwrap_or(column);
        self.dir.join(format!("label_encoder_{stem}.json"))
    }

    /// Maps sorted distinct values to `0..k` and stores the mapping.
    pub fn fit(&self, values: &[String], column: &str) -> Result<LabelMapping> {
        let classes: BTreeSet<&String> = values.iter().collect();
        let mapping: LabelMapping = classes
            .into_iter()
            .enumerate()
            .map(|(index, value)| (value.clone(), index))
            .collect();
        let path = self.mapping_path(column);
        fs::write(&path, serde_json::to_string_pretty(&mapping)?)?;
        debug!(column, classes = mapping.len(), path = %path.display(), "fitted label encoder");
        Ok(mapping)
    }

    pub fn load_mapping(&self, column: &str) -> Result<LabelMapping> {
        let json = fs::read_to_string(self.mapping_path(column))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn encode(&self, values: &[String], column: &str, mode: EncoderMode) -> Result<Vec<usize>> {
        let mapping = match mode {
            EncoderMode::Fit => self.fit(values, column)?,
            EncoderMode::Load => self.load_mapping(column)?,
        };
        values
            .iter()
            .map(|value| {
                mapping
                    .get(value)
                    .copied()
                    .ok_or_else(|| TicketError::UnknownLabel {
                        column: column.to_owned(),
                        value: value.clone(),
                    })
            })
            .collect()
    }

    /// The stored value for `code`, the inverse of [`LabelEncoder::encode`].
    pub fn decode(&self, code: usize, column: &str) -> Result<String> {
        let mapping = self.load_mapping(column)?;
        mapping
            .into_iter()
            .find_map(|(value, index)| (index == code).then_some(value))
            .ok_or_else(|| TicketError::UnknownLabel {
                column: column.to_owned(),
                value: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_fit_sorts_distinct_values() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let encoder = LabelEncoder::new(temp.path());

        let codes = encoder.encode(
            &strings(&["Printing", "Networks", "Printing", "Admin"]),
            "Response Team",
            EncoderMode::Fit,
        )?;

        assert_eq!(codes, vec![2, 1, 2, 0]);
        assert!(temp.path().join("label_encoder_Response.json").exists());
        Ok(())
    }

    #[test]
    fn test_load_reuses_stored_mapping() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let encoder = LabelEncoder::new(temp.path());
        encoder.encode(&strings(&["No", "Yes"]), "Login", EncoderMode::Fit)?;

        // "Yes" alone would be class 0 if the mapping were rebuilt
        let codes = encoder.encode(&strings(&["Yes"]), "Login", EncoderMode::Load)?;
        assert_eq!(codes, vec![1]);
        Ok(())
    }

    #[test]
    fn test_unknown_value_in_load_mode() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let encoder = LabelEncoder::new(temp.path());
        encoder.encode(&strings(&["No", "Yes"]), "Login", EncoderMode::Fit)?;

        match encoder.encode(&strings(&["Maybe"]), "Login", EncoderMode::Load) {
            Err(TicketError::UnknownLabel { column, value }) => {
                assert_eq!(column, "Login");
                assert_eq!(value, "Maybe");
            }
            other => panic!("Expected UnknownLabel, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_decode() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let encoder = LabelEncoder::new(temp.path());
        encoder.encode(&strings(&["Beta", "Alpha"]), "Response Team", EncoderMode::Fit)?;

        assert_eq!(encoder.decode(1, "Response Team")?, "Beta");
        assert!(encoder.decode(5, "Response Team").is_err());
        Ok(())
    }

    #[test]
    fn test_load_without_fit_fails() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let temp = assert_fs::TempDir::new()?;
        let encoder = LabelEncoder::new(temp.path());

        assert!(matches!(
            encoder.encode(&strings(&["Yes"]), "Staff", EncoderMode::Load),
            Err(TicketError::Io(_))
        ));
        Ok(())
    }
}
