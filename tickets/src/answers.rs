//! Yes/no answers describing a new ticket.
use crate::error::{Result, TicketError};
use crate::label_encoder::{EncoderMode, LabelEncoder};
use crate::ticket_table::FEATURE_COLUMNS;
use matrix::Matrix;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// The cell value used in the ticket CSV.
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Yes",
            Answer::No => "No",
        }
    }

    /// The more common answer for a feature whose encoded mean is `mean`.
    pub fn majority(mean: f64) -> Self {
        if mean < 0.5 {
            Answer::No
        } else {
            Answer::Yes
        }
    }
}

impl FromStr for Answer {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Yes" | "yes" | "y" => Ok(Answer::Yes),
            "No" | "no" | "n" => Ok(Answer::No),
            other => Err(TicketError::InvalidAnswer(other.to_owned())),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parses `Feature=answer`, e.g. `Wireless=y`.
pub fn parse_assignment(s: &str) -> Result<(String, Answer)> {
    let (feature, answer) = s
        .split_once('=')
        .ok_or_else(|| TicketError::InvalidAnswer(s.to_owned()))?;
    let feature = feature.trim();
    if !FEATURE_COLUMNS.contains(&feature) {
        return Err(TicketError::UnknownFeature(feature.to_owned()));
    }
    Ok((feature.to_owned(), answer.trim().parse()?))
}

/// One answer per feature column.
///
/// Features without an answer take the majority value of the training data, given as the
/// mean of each encoded feature column.
pub fn complete_answers(given: &[(String, Answer)], feature_means: &[f64]) -> Result<Vec<Answer>> {
    if let Some((unknown, _)) = given
        .iter()
        .find(|(feature, _)| !FEATURE_COLUMNS.contains(&feature.as_str()))
    {
        return Err(TicketError::UnknownFeature(unknown.clone()));
    }

    Ok(FEATURE_COLUMNS
        .iter()
        .enumerate()
        .map(|(index, name)| {
            given
                .iter()
                .rev()
                .find(|(feature, _)| feature == name)
                .map(|(_, answer)| *answer)
                .unwrap_or_else(|| {
                    Answer::majority(feature_means.get(index).copied().unwrap_or(0.0))
                })
        })
        .collect())
}

/// Encodes a full set of answers into a `1 x 9` input row with the stored encoders.
pub fn encode_answers(answers: &[Answer], encoder: &LabelEncoder) -> Result<Matrix> {
    let mut values = Vec::with_capacity(FEATURE_COLUMNS.len());
    for (name, answer) in FEATURE_COLUMNS.iter().zip(answers) {
        let codes = encoder.encode(&[answer.label().to_owned()], name, EncoderMode::Load)?;
        values.extend(codes.into_iter().map(|code| code as f64));
    }
    if values.len() != FEATURE_COLUMNS.len() {
        return Err(TicketError::InvalidAnswer(format!(
            "expected {} answers, got {}",
            FEATURE_COLUMNS.len(),
            answers.len()
        )));
    }
    Ok(Matrix::new(1, values.len(), values))
}
