use thiserror::Error;
use training::TrainingError;

/// Errors that can occur while reading, encoding or querying ticket data
#[derive(Debug, Error)]
pub enum TicketError {
    /// Wrapper for standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Wrapper for JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Errors from building datasets or training
    #[error(transparent)]
    Training(#[from] TrainingError),
    /// A required column is absent from the table
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// A value that the stored encoder has never seen
    #[error("Unknown label '{value}' in column {column}")]
    UnknownLabel { column: String, value: String },
    /// A class index outside the one-hot width
    #[error("Label {code} does not fit in {classes} classes")]
    LabelOutOfRange { code: usize, classes: usize },
    /// Anything other than a recognised yes/no answer
    #[error("Invalid answer '{0}', expected Yes/yes/y or No/no/n")]
    InvalidAnswer(String),
    /// An answer for a feature that does not exist
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),
    /// Split fractions outside `[0, 1)` or summing to 1 or more
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
}

pub type Result<T> = std::result::Result<T, TicketError>;
