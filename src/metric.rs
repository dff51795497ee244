use thiserror::Error;

use crate::Valuation;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricError {
    #[error("valuations name different outputs: {left:?} vs {right:?}")]
    OutputMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
    #[error("output '{name}' has {left} values on one side and {right} on the other")]
    LengthMismatch {
        name: String,
        left: usize,
        right: usize,
    },
    #[error("valuations have no outputs to compare")]
    Empty,
}

/// Mean squared error of two equal-length sequences.
pub fn mse(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    sum / a.len() as f64
}

/// Mean over outputs of the per-output mean squared error.
pub fn valuation_mse(a: &Valuation, b: &Valuation) -> Result<f64, MetricError> {
    if !a.keys().eq(b.keys()) {
        return Err(MetricError::OutputMismatch {
            left: a.keys().cloned().collect(),
            right: b.keys().cloned().collect(),
        });
    }
    if a.is_empty() {
        return Err(MetricError::Empty);
    }
    let mut total = 0.0;
    for (name, left) in a {
        let right = &b[name];
        if left.len() != right.len() {
            return Err(MetricError::LengthMismatch {
                name: name.clone(),
                left: left.len(),
                right: right.len(),
            });
        }
        total += mse(left, right);
    }
    Ok(total / a.len() as f64)
}
