//! Accuracy metrics over aligned `(actual, predicted)` sequences.
//!
//! Every metric rejects mismatched lengths (`MetricError::Shape`) and empty
//! input (`MetricError::Validation`) instead of coercing them.

use crate::domain::Scores;
use crate::error::MetricError;

fn check_inputs(actual: &[f64], predicted: &[f64]) -> Result<(), MetricError> {
    if actual.len() != predicted.len() {
        return Err(MetricError::Shape {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(MetricError::Validation("cannot score empty sequences".to_string()));
    }
    Ok(())
}

/// Mean absolute percentage error, in percent.
///
/// Indices where `actual == 0` are excluded from both the sum and the count.
/// This biases the score when zeros are frequent; attendance counts are
/// positive by construction, so it only matters for external callers.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64, MetricError> {
    check_inputs(actual, predicted)?;
    let (sum, n) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, n), (a, p)| (sum + ((a - p) / a).abs(), n + 1));
    if n == 0 {
        return Err(MetricError::Validation(
            "MAPE is undefined when every actual value is zero".to_string(),
        ));
    }
    Ok(sum / n as f64 * 100.0)
}

/// Root mean squared error over all indices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, MetricError> {
    check_inputs(actual, predicted)?;
    let sse: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    Ok((sse / actual.len() as f64).sqrt())
}

/// Mean absolute error over all indices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64, MetricError> {
    check_inputs(actual, predicted)?;
    let sae: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum();
    Ok(sae / actual.len() as f64)
}

/// All scores for one model.
pub fn score(actual: &[f64], predicted: &[f64]) -> Result<Scores, MetricError> {
    Ok(Scores {
        mape: mape(actual, predicted)?,
        rmse: rmse(actual, predicted)?,
        mae: mae(actual, predicted)?,
    })
}
