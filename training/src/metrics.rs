//! Reporting metrics for evaluated models.
use matrix::Matrix;
use serde::Serialize;
use std::fmt;

/// Precision, recall, F1 and support of one class.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class: usize,
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
    pub support: usize,
}

/// Per-class metrics for `classes` classes. A zero denominator yields 0.
pub fn precision_recall_fscore_support(
    y_true: &[usize],
    y_pred: &[usize],
    classes: usize,
) -> Vec<ClassMetrics> {
    let mut true_positives = vec![0usize; classes];
    let mut predicted = vec![0usize; classes];
    let mut support = vec![0usize; classes];

    for (&actual, &guess) in y_true.iter().zip(y_pred) {
        if let Some(count) = support.get_mut(actual) {
            *count += 1;
        }
        if let Some(count) = predicted.get_mut(guess) {
            *count += 1;
        }
        if let Some(count) = true_positives.get_mut(actual).filter(|_| actual == guess) {
            *count += 1;
        }
    }

    true_positives
        .into_iter()
        .zip(predicted)
        .zip(support)
        .enumerate()
        .map(|(class, ((hits, predicted), support))| {
            let precision = ratio(hits, predicted);
            let recall = ratio(hits, support);
            let f_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                class,
                precision,
                recall,
                f_score,
                support,
            }
        })
        .collect()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// `1 - Var(y - y_hat) / Var(y)`, averaged over output columns.
///
/// A column with constant targets scores 1 when predicted exactly and 0 otherwise.
pub fn explained_variance(y_true: &Matrix, y_pred: &Matrix) -> f64 {
    let columns = y_true.cols().min(y_pred.cols());
    if columns == 0 || y_true.rows() == 0 {
        return 0.0;
    }
    let residuals = y_true.subtract(y_pred);
    let total: f64 = (0..columns)
        .map(|col| {
            let target_variance = column_variance(y_true, col);
            let residual_variance = column_variance(&residuals, col);
            if target_variance == 0.0 {
                if residual_variance == 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                1.0 - residual_variance / target_variance
            }
        })
        .sum();
    total / columns as f64
}

fn column_variance(matrix: &Matrix, col: usize) -> f64 {
    let column: Vec<f64> = (0..matrix.rows()).filter_map(|r| matrix.get(r, col)).collect();
    if column.is_empty() {
        return 0.0;
    }
    let count = column.len() as f64;
    let mean = column.iter().sum::<f64>() / count;
    column.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count
}

/// Task-specific report attached to an [`Evaluation`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    Classification(Vec<ClassMetrics>),
    Regression { explained_variance: f64 },
}

/// Loss of a dataset plus the matching report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub loss: f64,
    pub report: Report,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loss: {:.7}", self.loss)?;
        match &self.report {
            Report::Classification(classes) => {
                writeln!(
                    f,
                    "{:>8} {:>10} {:>10} {:>10} {:>8}",
                    "class", "precision", "recall", "f1-score", "support"
                )?;
                for m in classes {
                    writeln!(
                        f,
                        "{:>8} {:>10.2} {:>10.2} {:>10.2} {:>8}",
                        m.class, m.precision, m.recall, m.f_score, m.support
                    )?;
                }
            }
            Report::Regression { explained_variance } => {
                writeln!(f, "Explained variance: {explained_variance:.4}")?;
            }
        }
        Ok(())
    }
}
