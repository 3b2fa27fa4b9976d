//! Shared load -> features -> evaluate workflow.
//!
//! Each `run_*` returns everything a front-end needs to print or export, so
//! `app.rs` only deals with presentation.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::domain::{EvalConfig, FeatureConfig, FeatureTable, LoadConfig, ModelPredictions};
use crate::error::AppError;
use crate::evaluate::{Leaderboard, evaluate_models};
use crate::features::{EnglandWalesHolidays, build_feature_table};
use crate::io::ingest::{LoadReport, load_series};
use crate::io::predictions::read_predictions;
use crate::models::{ValidationSplit, reference_forecasters};

/// Outputs of `erf features`.
#[derive(Debug, Clone)]
pub struct FeatureRun {
    pub load: LoadReport,
    pub table: FeatureTable,
}

/// Outputs of `erf evaluate`.
#[derive(Debug, Clone)]
pub struct EvalRun {
    pub load: LoadReport,
    pub table: FeatureTable,
    pub valid_dates: Vec<NaiveDate>,
    pub valid_actuals: Vec<f64>,
    /// Every evaluated model, baselines first, in input order.
    pub predictions: Vec<ModelPredictions>,
    /// Baselines that could not be fitted, with the reason.
    pub skipped: Vec<(String, String)>,
    pub leaderboard: Leaderboard,
}

pub fn run_load(config: &LoadConfig) -> Result<LoadReport, AppError> {
    Ok(load_series(config)?)
}

pub fn run_features(load: &LoadConfig, features: &FeatureConfig) -> Result<FeatureRun, AppError> {
    let load = run_load(load)?;
    let table = build_feature_table(&load.series, &EnglandWalesHolidays, features)?;
    Ok(FeatureRun { load, table })
}

#[instrument(skip_all, fields(valid_months = config.valid_months, external = config.predictions.len()))]
pub fn run_evaluation(config: &EvalConfig) -> Result<EvalRun, AppError> {
    let FeatureRun { load, table } = run_features(&config.load, &config.features)?;

    let split = ValidationSplit::last_months(&table.rows, config.valid_months)?;
    let valid_dates = split.valid_dates();
    let valid_actuals = split.valid_actuals();
    info!(
        fit_rows = split.fit.len(),
        valid_rows = split.valid.len(),
        "split feature table"
    );

    let mut predictions = Vec::new();
    let mut skipped = Vec::new();

    if config.baselines {
        for model in reference_forecasters(&config.regressors) {
            match model.fit_predict(split.fit, split.valid) {
                Ok(values) => predictions.push(ModelPredictions {
                    model: model.name().to_string(),
                    values,
                }),
                Err(err) => {
                    warn!(model = model.name(), %err, "skipping baseline");
                    skipped.push((model.name().to_string(), err.to_string()));
                }
            }
        }
    }

    for source in &config.predictions {
        predictions.push(read_predictions(source, &valid_dates)?);
    }

    if predictions.is_empty() {
        return Err(AppError::new(
            3,
            "No models to evaluate (baselines disabled or failed, and no --predictions given).",
        ));
    }

    let leaderboard = evaluate_models(&valid_actuals, &predictions)?;

    Ok(EvalRun {
        load,
        table,
        valid_dates,
        valid_actuals,
        predictions,
        skipped,
        leaderboard,
    })
}
