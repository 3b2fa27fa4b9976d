//! Feature table assembly.
//!
//! Lags are taken in **rows**, not calendar months: `lag_k` at row `t` is
//! `y[t - k]`. That equals the value k calendar months earlier only when the
//! series has no missing months, so the builder checks for gaps first and,
//! under `GapPolicy::Reject`, refuses gappy input.
//!
//! Rows whose lag/rolling/momentum features need history before the series
//! start are dropped (never imputed). With a maximum lag of 12 that is the
//! first 12 rows.

use chrono::{Datelike, NaiveDate};
use tracing::{info, instrument, warn};

use crate::domain::{CleanSeries, FeatureConfig, FeatureRow, FeatureTable, GapPolicy};
use crate::error::FeatureError;
use crate::features::calendar::calendar_features;
use crate::features::holidays::{HolidayCalendar, HolidayMonths};
use crate::math::stats::{lag, mean, relative_change, sample_std, trailing_window};

/// Lag offsets (rows).
pub const LAGS: [usize; 4] = [1, 2, 3, 12];

/// Rolling window lengths (rows).
pub const WINDOWS: [usize; 3] = [3, 6, 12];

/// Rows of history needed before the first complete feature row.
pub const MAX_HISTORY: usize = 12;

/// Build the feature table for `series`.
#[instrument(skip_all, fields(months = series.len(), gap_policy = ?config.gap_policy))]
pub fn build_feature_table(
    series: &CleanSeries,
    calendar: &dyn HolidayCalendar,
    config: &FeatureConfig,
) -> Result<FeatureTable, FeatureError> {
    let gaps = series.gaps();
    if let Some(first) = gaps.first() {
        match config.gap_policy {
            GapPolicy::Reject => {
                return Err(FeatureError::Gap {
                    after: first.after,
                    next: first.next,
                });
            }
            GapPolicy::RowOffset => {
                for gap in &gaps {
                    warn!(after = %gap.after, next = %gap.next, "missing months; lags shift across this gap");
                }
            }
        }
    }

    let holiday_months = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => HolidayMonths::build(calendar, first.year(), last.year()),
        _ => HolidayMonths::default(),
    };

    let values = series.values();
    let mut rows = Vec::with_capacity(values.len().saturating_sub(MAX_HISTORY));
    let mut dropped_rows = 0usize;

    for (t, point) in series.points().iter().enumerate() {
        match feature_row(&values, t, point.date, &holiday_months) {
            Some(row) => rows.push(row),
            None => dropped_rows += 1,
        }
    }

    info!(rows = rows.len(), dropped_rows, "built feature table");
    Ok(FeatureTable { rows, dropped_rows })
}

/// All features for row `t`, or `None` if any needs missing history.
fn feature_row(
    values: &[f64],
    t: usize,
    date: NaiveDate,
    holiday_months: &HolidayMonths,
) -> Option<FeatureRow> {
    let y = values[t];
    let cal = calendar_features(date);

    let [lag_1, lag_2, lag_3, lag_12] = LAGS.map(|k| lag(values, t, k));
    let [(roll3_mean, roll3_std), (roll6_mean, roll6_std), (roll12_mean, roll12_std)] =
        WINDOWS.map(|w| rolling(values, t, w));

    Some(FeatureRow {
        date,
        y,
        year: cal.year,
        month: cal.month,
        quarter: cal.quarter,
        month_sin: cal.month_sin,
        month_cos: cal.month_cos,
        lag_1: lag_1?,
        lag_2: lag_2?,
        lag_3: lag_3?,
        lag_12: lag_12?,
        roll3_mean: roll3_mean?,
        roll6_mean: roll6_mean?,
        roll12_mean: roll12_mean?,
        roll3_std: roll3_std?,
        roll6_std: roll6_std?,
        roll12_std: roll12_std?,
        mom_1: relative_change(y, lag_1)?,
        mom_yoy: relative_change(y, lag_12)?,
        has_public_holiday: holiday_months.contains(cal.year, cal.month),
    })
}

/// Mean and sample std over the `w` rows before `t`.
fn rolling(values: &[f64], t: usize, w: usize) -> (Option<f64>, Option<f64>) {
    match trailing_window(values, t, w) {
        Some(window) => (mean(window), sample_std(window)),
        None => (None, None),
    }
}
