//! Turns a ticket table into numeric features and targets.
use crate::error::{Result, TicketError};
use crate::label_encoder::{EncoderMode, LabelEncoder};
use crate::ticket_table::{FEATURE_COLUMNS, LABEL_COLUMN, TicketTable};
use matrix::Matrix;
use neural_network::OutputHead;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use training::Dataset;

/// What the encoded targets describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// One-hot response team
    Classification,
    /// Days needed to resolve the ticket
    Regression,
}

impl From<OutputHead> for Task {
    fn from(head: OutputHead) -> Self {
        match head {
            OutputHead::Classification => Task::Classification,
            OutputHead::Regression => Task::Regression,
        }
    }
}

/// One row per code, with a 1 in the code's column. `num_classes` defaults to `max + 1`.
pub fn one_hot(codes: &[usize], num_classes: Option<usize>) -> Result<Matrix> {
    let classes = num_classes.unwrap_or_else(|| codes.iter().max().map_or(0, |max| max + 1));
    if let Some(&code) = codes.iter().find(|&&code| code >= classes) {
        return Err(TicketError::LabelOutOfRange { code, classes });
    }
    let values = codes
        .iter()
        .flat_map(|&code| (0..classes).map(move |class| if class == code { 1.0 } else { 0.0 }))
        .collect();
    Ok(Matrix::new(codes.len(), classes, values))
}

/// `3 * (sum of the first nine encoded features) + 2`
pub fn days_to_resolve(features: &[f64]) -> f64 {
    3.0 * features.iter().take(FEATURE_COLUMNS.len()).sum::<f64>() + 2.0
}

/// Train, validation and test partitions of the encoded tickets.
#[derive(Clone, Debug)]
pub struct Split {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
}

/// Label-encoded features with targets for one task.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedTickets {
    pub features: Matrix,
    pub targets: Matrix,
    pub task: Task,
}

impl EncodedTickets {
    /// Encodes every feature column, plus the response team for classification.
    ///
    /// In [`EncoderMode::Fit`] the mappings are rebuilt from this table and stored;
    /// in [`EncoderMode::Load`] the stored mappings are applied.
    pub fn from_table(
        table: &TicketTable,
        encoder: &LabelEncoder,
        mode: EncoderMode,
        task: Task,
    ) -> Result<Self> {
        let rows = table.len();
        let mut columns = Vec::with_capacity(FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            columns.push(encoder.encode(&table.column(name)?, name, mode)?);
        }
        let values: Vec<f64> = (0..rows)
            .flat_map(|row| {
                columns
                    .iter()
                    .map(move |column| column.get(row).map_or(0.0, |&code| code as f64))
            })
            .collect();
        let features = Matrix::new(rows, FEATURE_COLUMNS.len(), values);

        let targets = match task {
            Task::Classification => {
                let codes = encoder.encode(&table.column(LABEL_COLUMN)?, LABEL_COLUMN, mode)?;
                let classes = encoder.load_mapping(LABEL_COLUMN)?.len();
                one_hot(&codes, Some(classes))?
            }
            Task::Regression => Matrix::from(
                (0..rows)
                    .map(|row| days_to_resolve(&features.row(row)))
                    .collect::<Vec<f64>>(),
            ),
        };

        Ok(Self {
            features,
            targets,
            task,
        })
    }

    pub fn len(&self) -> usize {
        self.features.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dataset(&self) -> Result<Dataset> {
        Ok(Dataset::new(self.features.clone(), self.targets.clone())?)
    }

    /// Mean of each encoded feature column.
    pub fn feature_means(&self) -> Vec<f64> {
        let rows = self.features.rows().max(1) as f64;
        self.features
            .sum_columns()
            .values()
            .into_iter()
            .map(|total| total / rows)
            .collect()
    }

    /// Shuffles the rows with `seed` and cuts off the test and validation shares.
    ///
    /// Shares are rounded to whole rows; the training set gets the remainder.
    pub fn split(&self, validation_fraction: f64, test_fraction: f64, seed: u64) -> Result<Split> {
        let in_range = |f: f64| (0.0..1.0).contains(&f);
        if !in_range(validation_fraction)
            || !in_range(test_fraction)
            || validation_fraction + test_fraction >= 1.0
        {
            return Err(TicketError::InvalidSplit(format!(
                "validation {validation_fraction} and test {test_fraction} \
                 must each be in [0, 1) and sum to less than 1"
            )));
        }

        let rows = self.len();
        let mut order: Vec<usize> = (0..rows).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let test_rows = (rows as f64 * test_fraction).round() as usize;
        let validation_rows = (rows as f64 * validation_fraction).round() as usize;
        let (test, rest) = order.split_at(test_rows.min(rows));
        let (validation, train) = rest.split_at(validation_rows.min(rest.len()));

        let all = self.dataset()?;
        Ok(Split {
            train: all.select(train),
            validation: all.select(validation),
            test: all.select(test),
        })
    }
}
