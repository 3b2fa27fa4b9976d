//! Forecaster interface and built-in reference forecasters.
//!
//! A forecaster sees the fit window of the feature table and must return one
//! prediction per validation row, in validation order. Everything else about
//! it is opaque to the evaluator.
//!
//! Validation rows carry their own lag/rolling features (built from actuals),
//! so these baselines produce one-step-ahead predictions.

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{FeatureColumn, FeatureRow};
use crate::error::ModelError;
use crate::math::ols::{Standardizer, design_matrix, linear_predict, solve_least_squares};

pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    fn fit_predict(&self, fit: &[FeatureRow], valid: &[FeatureRow]) -> Result<Vec<f64>, ModelError>;
}

/// Same month last year: `ŷ[t] = y[t - 12]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalNaive;

impl Forecaster for SeasonalNaive {
    fn name(&self) -> &str {
        "Seasonal-Naive"
    }

    fn fit_predict(&self, _fit: &[FeatureRow], valid: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        Ok(valid.iter().map(|r| r.lag_12).collect())
    }
}

/// Linear regression of `y` on a fixed set of standardized feature columns.
#[derive(Debug, Clone)]
pub struct FeatureRegression {
    pub columns: Vec<FeatureColumn>,
}

/// Minimum number of extra fit rows beyond parameter count.
const MIN_N_BUFFER: usize = 5;

impl Default for FeatureRegression {
    fn default() -> Self {
        Self {
            columns: vec![
                FeatureColumn::Lag1,
                FeatureColumn::Lag12,
                FeatureColumn::Roll12Mean,
                FeatureColumn::MonthSin,
                FeatureColumn::MonthCos,
                FeatureColumn::HasPublicHoliday,
            ],
        }
    }
}

impl FeatureRegression {
    fn regressors(&self, row: &FeatureRow) -> Vec<f64> {
        self.columns.iter().map(|&c| row.value(c)).collect()
    }
}

impl Forecaster for FeatureRegression {
    fn name(&self) -> &str {
        "Feature-OLS"
    }

    fn fit_predict(&self, fit: &[FeatureRow], valid: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        let k = self.columns.len() + 1;
        if fit.len() < k + MIN_N_BUFFER {
            return Err(ModelError::Underdetermined {
                model: self.name().to_string(),
                n: fit.len(),
                k,
            });
        }

        let raw: Vec<Vec<f64>> = fit.iter().map(|r| self.regressors(r)).collect();
        let scaler = Standardizer::fit(&raw).ok_or_else(|| ModelError::Input {
            model: self.name().to_string(),
            reason: "empty fit window".to_string(),
        })?;
        let rows: Vec<Vec<f64>> = raw.iter().map(|r| scaler.transform(r)).collect();
        let y = DVector::from_iterator(fit.len(), fit.iter().map(|r| r.y));

        let beta = solve_least_squares(&design_matrix(&rows), &y).ok_or_else(|| ModelError::Singular {
            model: self.name().to_string(),
        })?;
        debug!(model = self.name(), beta = ?beta.as_slice(), "fitted coefficients");

        Ok(valid
            .iter()
            .map(|r| linear_predict(&beta, &scaler.transform(&self.regressors(r))))
            .collect())
    }
}

/// Built-in forecasters in leaderboard input order.
///
/// `regressors` overrides the linear model's columns when non-empty.
pub fn reference_forecasters(regressors: &[FeatureColumn]) -> Vec<Box<dyn Forecaster>> {
    let regression = if regressors.is_empty() {
        FeatureRegression::default()
    } else {
        FeatureRegression {
            columns: regressors.to_vec(),
        }
    };
    vec![Box::new(SeasonalNaive), Box::new(regression)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CleanSeries, FeatureConfig, MonthlyPoint};
    use crate::features::{EnglandWalesHolidays, build_feature_table};
    use chrono::{Months, NaiveDate};

    fn seasonal_rows(n: usize) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| {
                let season = (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                let wobble = 5_000.0 * ((i * 7919) % 13) as f64 / 13.0;
                MonthlyPoint {
                    date: start + Months::new(i as u32),
                    y: 1_500_000.0 + 2_000.0 * i as f64 + 80_000.0 * season + wobble,
                }
            })
            .collect();
        let series = CleanSeries::new(points).unwrap();
        build_feature_table(&series, &EnglandWalesHolidays, &FeatureConfig::default())
            .unwrap()
            .rows
    }

    #[test]
    fn seasonal_naive_repeats_last_year() {
        let rows = seasonal_rows(30);
        let preds = SeasonalNaive.fit_predict(&rows[..10], &rows[10..]).unwrap();
        for (p, r) in preds.iter().zip(&rows[10..]) {
            assert_eq!(*p, r.lag_12);
        }
    }

    #[test]
    fn regression_tracks_trend_plus_season() {
        let rows = seasonal_rows(96);
        let (fit, valid) = rows.split_at(rows.len() - 12);
        let preds = FeatureRegression::default().fit_predict(fit, valid).unwrap();
        assert_eq!(preds.len(), 12);
        for (p, r) in preds.iter().zip(valid) {
            assert!((p - r.y).abs() / r.y < 0.02, "pred {p} vs actual {}", r.y);
        }
    }

    #[test]
    fn custom_regressors_replace_the_defaults() {
        let rows = seasonal_rows(60);
        let (fit, valid) = rows.split_at(rows.len() - 12);
        let models = reference_forecasters(&[FeatureColumn::Lag12]);
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].name(), "Feature-OLS");
        assert_eq!(models[1].fit_predict(fit, valid).unwrap().len(), 12);

        // One regressor plus intercept needs only 2 + 5 fit rows.
        let short = &rows[..8];
        assert!(models[1].fit_predict(&short[..7], &short[7..]).is_ok());
        assert!(reference_forecasters(&[])[1].fit_predict(&short[..7], &short[7..]).is_err());
    }

    #[test]
    fn regression_needs_enough_rows() {
        let rows = seasonal_rows(20);
        let err = FeatureRegression::default().fit_predict(&rows[..4], &rows[4..]).unwrap_err();
        assert!(matches!(err, ModelError::Underdetermined { n: 4, k: 7, .. }));
    }
}
