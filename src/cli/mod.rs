//! Command-line parsing for the `erf` tool.
//!
//! Argument parsing and command dispatch stay separate from the loading,
//! feature and evaluation code; `app.rs` turns these structs into configs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{FeatureColumn, GapPolicy, LoadConfig, PredictionSource};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "erf", version, about = "A&E attendance series loader, feature builder and forecast evaluator")]
pub struct Cli {
    /// Debug-level logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the raw export and print the clean monthly series summary.
    Load(LoadArgs),
    /// Build the feature table.
    Features(FeaturesArgs),
    /// Score models on the validation window and print the leaderboard.
    Evaluate(EvaluateArgs),
    /// Write a synthetic raw export.
    Sample(SampleArgs),
}

/// Where the raw export lives and how to find its header.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Raw attendance export (CSV).
    #[arg(long, env = "ERF_SOURCE", value_name = "PATH")]
    pub source: PathBuf,

    /// Leading rows searched for the `Period` header.
    #[arg(long, default_value_t = LoadConfig::DEFAULT_HEADER_SEARCH_ROWS)]
    pub search_rows: usize,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the clean series as `Date,y` CSV.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// What to do when the series skips months.
    #[arg(long, value_enum, default_value_t = GapPolicy::Reject)]
    pub gap_policy: GapPolicy,

    /// Write the feature table as CSV.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, value_enum, default_value_t = GapPolicy::Reject)]
    pub gap_policy: GapPolicy,

    /// Months at the end of the feature table held out for validation.
    #[arg(long, default_value_t = 12)]
    pub valid_months: usize,

    /// External predictions as `NAME=PATH` (repeatable).
    #[arg(long = "predictions", value_name = "NAME=PATH", value_parser = parse_prediction_source)]
    pub predictions: Vec<PredictionSource>,

    /// Skip the built-in reference forecasters.
    #[arg(long)]
    pub no_baselines: bool,

    /// Regressors of the built-in linear model, comma-separated feature
    /// column names (e.g. `lag_1,lag_12,month_sin`).
    #[arg(long, value_name = "COLUMNS", value_delimiter = ',', value_parser = parse_feature_column)]
    pub regressors: Vec<FeatureColumn>,

    /// Print a KPI line for this model.
    #[arg(long, value_name = "NAME")]
    pub highlight: Option<String>,

    /// Render an ASCII plot of actuals vs predictions.
    #[arg(long)]
    pub plot: bool,

    /// Months of history shown in the plot.
    #[arg(long, default_value_t = 48)]
    pub months: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the leaderboard (CSV, or JSON for a `.json` path).
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Write validation actuals and per-model predictions as CSV.
    #[arg(long, value_name = "PATH")]
    pub export_predictions: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// First month (`YYYY-MM`).
    #[arg(long, default_value = "2010-08", value_parser = parse_month)]
    pub start: NaiveDate,

    /// Number of months to generate.
    #[arg(long, default_value_t = 160)]
    pub months: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Parse `NAME=PATH`.
pub fn parse_prediction_source(s: &str) -> Result<PredictionSource, String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got '{s}'"));
    }
    Ok(PredictionSource {
        model: name.to_string(),
        path: PathBuf::from(path),
    })
}

/// Parse a feature column by its exported name.
pub fn parse_feature_column(s: &str) -> Result<FeatureColumn, String> {
    FeatureColumn::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = FeatureColumn::ALL.iter().map(|c| c.name()).collect();
        format!("unknown feature column '{s}' (expected one of: {})", names.join(", "))
    })
}

/// Parse `YYYY-MM` (or a full date) to the first of the month.
pub fn parse_month(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map(crate::domain::month_start)
        .map_err(|_| format!("expected YYYY-MM, got '{s}'"))
}
