//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the loader, feature builder and evaluator
//! - exported to CSV/JSON
//! - rebuilt cheaply whenever parameters change

use std::path::PathBuf;

use chrono::{Datelike, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One month of the target series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub y: f64,
}

/// A clean monthly series.
///
/// Invariants (checked by [`CleanSeries::new`]):
/// - every date is the first day of its month
/// - dates are strictly increasing (so no duplicate months)
/// - every value is finite and > 0
///
/// Gap-freeness is *not* an invariant; see [`CleanSeries::gaps`].
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSeries {
    points: Vec<MonthlyPoint>,
}

/// Two consecutive series months that are not one calendar month apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub after: NaiveDate,
    pub next: NaiveDate,
}

impl CleanSeries {
    pub fn new(points: Vec<MonthlyPoint>) -> Result<Self, SeriesError> {
        for p in &points {
            if p.date.day() != 1 {
                return Err(SeriesError::NotMonthStart(p.date));
            }
            if !(p.y.is_finite() && p.y > 0.0) {
                return Err(SeriesError::InvalidValue {
                    date: p.date,
                    value: p.y,
                });
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Every place where the next row is not the next calendar month.
    pub fn gaps(&self) -> Vec<Gap> {
        self.points
            .windows(2)
            .filter(|pair| next_month(pair[0].date) != Some(pair[1].date))
            .map(|pair| Gap {
                after: pair[0].date,
                next: pair[1].date,
            })
            .collect()
    }
}

/// Truncate a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

/// One row of the supervised-learning table.
///
/// Field names double as the exported column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    pub y: f64,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub month_sin: f64,
    pub month_cos: f64,
    pub lag_1: f64,
    pub lag_2: f64,
    pub lag_3: f64,
    pub lag_12: f64,
    pub roll3_mean: f64,
    pub roll6_mean: f64,
    pub roll12_mean: f64,
    pub roll3_std: f64,
    pub roll6_std: f64,
    pub roll12_std: f64,
    pub mom_1: f64,
    pub mom_yoy: f64,
    #[serde(with = "bool_as_int")]
    pub has_public_holiday: bool,
}

/// Numeric feature columns usable as model regressors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Year,
    Month,
    Quarter,
    MonthSin,
    MonthCos,
    Lag1,
    Lag2,
    Lag3,
    Lag12,
    Roll3Mean,
    Roll6Mean,
    Roll12Mean,
    Roll3Std,
    Roll6Std,
    Roll12Std,
    Mom1,
    MomYoy,
    HasPublicHoliday,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 18] = [
        FeatureColumn::Year,
        FeatureColumn::Month,
        FeatureColumn::Quarter,
        FeatureColumn::MonthSin,
        FeatureColumn::MonthCos,
        FeatureColumn::Lag1,
        FeatureColumn::Lag2,
        FeatureColumn::Lag3,
        FeatureColumn::Lag12,
        FeatureColumn::Roll3Mean,
        FeatureColumn::Roll6Mean,
        FeatureColumn::Roll12Mean,
        FeatureColumn::Roll3Std,
        FeatureColumn::Roll6Std,
        FeatureColumn::Roll12Std,
        FeatureColumn::Mom1,
        FeatureColumn::MomYoy,
        FeatureColumn::HasPublicHoliday,
    ];

    /// Exported column name.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Year => "year",
            FeatureColumn::Month => "month",
            FeatureColumn::Quarter => "quarter",
            FeatureColumn::MonthSin => "month_sin",
            FeatureColumn::MonthCos => "month_cos",
            FeatureColumn::Lag1 => "lag_1",
            FeatureColumn::Lag2 => "lag_2",
            FeatureColumn::Lag3 => "lag_3",
            FeatureColumn::Lag12 => "lag_12",
            FeatureColumn::Roll3Mean => "roll3_mean",
            FeatureColumn::Roll6Mean => "roll6_mean",
            FeatureColumn::Roll12Mean => "roll12_mean",
            FeatureColumn::Roll3Std => "roll3_std",
            FeatureColumn::Roll6Std => "roll6_std",
            FeatureColumn::Roll12Std => "roll12_std",
            FeatureColumn::Mom1 => "mom_1",
            FeatureColumn::MomYoy => "mom_yoy",
            FeatureColumn::HasPublicHoliday => "has_public_holiday",
        }
    }

    /// Inverse of [`FeatureColumn::name`], case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl FeatureRow {
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Year => self.year as f64,
            FeatureColumn::Month => self.month as f64,
            FeatureColumn::Quarter => self.quarter as f64,
            FeatureColumn::MonthSin => self.month_sin,
            FeatureColumn::MonthCos => self.month_cos,
            FeatureColumn::Lag1 => self.lag_1,
            FeatureColumn::Lag2 => self.lag_2,
            FeatureColumn::Lag3 => self.lag_3,
            FeatureColumn::Lag12 => self.lag_12,
            FeatureColumn::Roll3Mean => self.roll3_mean,
            FeatureColumn::Roll6Mean => self.roll6_mean,
            FeatureColumn::Roll12Mean => self.roll12_mean,
            FeatureColumn::Roll3Std => self.roll3_std,
            FeatureColumn::Roll6Std => self.roll6_std,
            FeatureColumn::Roll12Std => self.roll12_std,
            FeatureColumn::Mom1 => self.mom_1,
            FeatureColumn::MomYoy => self.mom_yoy,
            FeatureColumn::HasPublicHoliday => {
                if self.has_public_holiday {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Feature table plus how many head rows were truncated for missing history.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub dropped_rows: usize,
}

impl FeatureTable {
    /// Column order of the exported table.
    pub fn column_names() -> Vec<&'static str> {
        let mut names = vec!["Date", "y"];
        names.extend(FeatureColumn::ALL.iter().map(|c| c.name()));
        names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How the feature builder treats a series with missing months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    /// Refuse to build features from a series with missing months.
    Reject,
    /// Take lags as "k rows back" regardless of gaps (warns per gap).
    RowOffset,
}

/// Accuracy scores for one model over the validation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Percent.
    #[serde(rename = "MAPE")]
    pub mape: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAE")]
    pub mae: f64,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(flatten)]
    pub scores: Scores,
}

/// Predictions of one model, aligned with the validation dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPredictions {
    pub model: String,
    pub values: Vec<f64>,
}

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub source: PathBuf,
    /// How many leading rows to search for the `Period` header.
    pub header_search_rows: usize,
}

impl LoadConfig {
    pub const DEFAULT_HEADER_SEARCH_ROWS: usize = 50;

    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            header_search_rows: Self::DEFAULT_HEADER_SEARCH_ROWS,
        }
    }
}

/// Feature builder settings.
#[derive(Debug, Clone, Copy)]
pub struct FeatureConfig {
    pub gap_policy: GapPolicy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            gap_policy: GapPolicy::Reject,
        }
    }
}

/// An external prediction file supplied on the command line (`NAME=PATH`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionSource {
    pub model: String,
    pub path: PathBuf,
}

/// A full evaluation run's configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub load: LoadConfig,
    pub features: FeatureConfig,
    pub valid_months: usize,
    pub predictions: Vec<PredictionSource>,
    /// Include the built-in reference forecasters.
    pub baselines: bool,
    /// Regressors of the built-in linear model; empty means its defaults.
    pub regressors: Vec<FeatureColumn>,
    pub highlight: Option<String>,

    pub plot: bool,
    pub plot_months: usize,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_leaderboard: Option<PathBuf>,
    pub export_predictions: Option<PathBuf>,
}

mod bool_as_int {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn clean_series_rejects_unsorted_dates() {
        let points = vec![
            MonthlyPoint { date: d(2020, 2), y: 1.0 },
            MonthlyPoint { date: d(2020, 1), y: 1.0 },
        ];
        assert!(matches!(
            CleanSeries::new(points),
            Err(SeriesError::NotIncreasing { .. })
        ));
    }

    #[test]
    fn clean_series_rejects_mid_month_and_non_positive() {
        let mid = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert!(CleanSeries::new(vec![MonthlyPoint { date: mid, y: 1.0 }]).is_err());
        assert!(CleanSeries::new(vec![MonthlyPoint { date: d(2020, 1), y: 0.0 }]).is_err());
    }

    #[test]
    fn gaps_are_reported_across_year_boundaries() {
        let series = CleanSeries::new(vec![
            MonthlyPoint { date: d(2019, 11), y: 1.0 },
            MonthlyPoint { date: d(2019, 12), y: 1.0 },
            MonthlyPoint { date: d(2020, 1), y: 1.0 },
            MonthlyPoint { date: d(2020, 3), y: 1.0 },
        ])
        .unwrap();
        assert_eq!(
            series.gaps(),
            vec![Gap {
                after: d(2020, 1),
                next: d(2020, 3)
            }]
        );
    }

    #[test]
    fn column_names_match_export_layout() {
        let names = FeatureTable::column_names();
        assert_eq!(names.len(), 20);
        assert_eq!(names[0], "Date");
        assert_eq!(names[9], "lag_3");
        assert_eq!(names[10], "lag_12");
        assert_eq!(names[19], "has_public_holiday");
    }

    #[test]
    fn feature_columns_round_trip_through_their_names() {
        for column in FeatureColumn::ALL {
            assert_eq!(FeatureColumn::from_name(column.name()), Some(column));
        }
        assert_eq!(FeatureColumn::from_name(" Lag_12 "), Some(FeatureColumn::Lag12));
        assert_eq!(FeatureColumn::from_name("y"), None);
    }
}
