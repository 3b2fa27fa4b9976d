//! Fit/validation split of the feature table.

use chrono::NaiveDate;

use crate::domain::FeatureRow;
use crate::error::AppError;

/// The last `n` feature rows are the validation window; the rest is the fit window.
#[derive(Debug, Clone, Copy)]
pub struct ValidationSplit<'a> {
    pub fit: &'a [FeatureRow],
    pub valid: &'a [FeatureRow],
}

impl<'a> ValidationSplit<'a> {
    pub fn last_months(rows: &'a [FeatureRow], n: usize) -> Result<Self, AppError> {
        if n == 0 {
            return Err(AppError::new(2, "Validation window must contain at least one month."));
        }
        if n >= rows.len() {
            return Err(AppError::new(
                3,
                format!(
                    "Validation window of {n} months leaves no fit rows (feature table has {} rows).",
                    rows.len()
                ),
            ));
        }
        let (fit, valid) = rows.split_at(rows.len() - n);
        Ok(Self { fit, valid })
    }

    pub fn valid_dates(&self) -> Vec<NaiveDate> {
        self.valid.iter().map(|r| r.date).collect()
    }

    pub fn valid_actuals(&self) -> Vec<f64> {
        self.valid.iter().map(|r| r.y).collect()
    }
}
