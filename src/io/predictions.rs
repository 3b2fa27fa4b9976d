//! External prediction files.
//!
//! Forecasters that live outside this crate hand over their validation
//! predictions as a two-column CSV:
//!
//! ```text
//! Date,y_hat_sarimax
//! 2023-01-01,2150342.5
//! ```
//!
//! The prediction column is the first header starting with `y_hat`, else the
//! first column that is neither `Date` nor `y`. Other columns are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ModelPredictions, PredictionSource, month_start};
use crate::error::AppError;

/// Read a prediction file and align it with the validation dates.
pub fn read_predictions(source: &PredictionSource, dates: &[NaiveDate]) -> Result<ModelPredictions, AppError> {
    let file = File::open(&source.path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open predictions '{}': {e}", source.path.display()),
        )
    })?;
    let by_date = parse_prediction_csv(file, &source.path)?;
    align_predictions(&source.model, &by_date, dates, &source.path)
}

fn parse_prediction_csv<R: std::io::Read>(reader: R, path: &Path) -> Result<HashMap<NaiveDate, f64>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read headers of '{}': {e}", path.display())))?
        .clone();

    let date_col = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case("date"))
        .ok_or_else(|| AppError::new(2, format!("'{}' has no `Date` column.", path.display())))?;
    let value_col = headers
        .iter()
        .position(|h| h.to_ascii_lowercase().starts_with("y_hat"))
        .or_else(|| {
            (0..headers.len()).find(|&i| i != date_col && !headers[i].eq_ignore_ascii_case("y"))
        })
        .ok_or_else(|| AppError::new(2, format!("'{}' has no prediction column.", path.display())))?;

    let mut out = HashMap::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("{}:{line}: CSV parse error: {e}", path.display())))?;
        let raw_date = record.get(date_col).unwrap_or("");
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_date(raw_date)
            .ok_or_else(|| AppError::new(2, format!("{}:{line}: invalid date '{raw_date}'", path.display())))?;
        let value = record
            .get(value_col)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| AppError::new(2, format!("{}:{line}: invalid prediction value", path.display())))?;
        out.entry(month_start(date)).or_insert(value);
    }
    debug!(path = %path.display(), rows = out.len(), "read predictions");
    Ok(out)
}

fn align_predictions(
    model: &str,
    by_date: &HashMap<NaiveDate, f64>,
    dates: &[NaiveDate],
    path: &Path,
) -> Result<ModelPredictions, AppError> {
    let values = dates
        .iter()
        .map(|d| {
            by_date.get(d).copied().ok_or_else(|| {
                AppError::new(
                    2,
                    format!("'{}' has no prediction for validation month {d}.", path.display()),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ModelPredictions {
        model: model.to_string(),
        values,
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Accept date-times as written by dataframe exports (`2023-01-01 00:00:00`).
    let s = s.split([' ', 'T']).next().unwrap_or(s);
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn picks_y_hat_column_and_normalizes_dates() {
        let data = "Date,y,y_hat_sarimax\n2023-01-15,10,11.5\n2023-02-01 00:00:00,20,19\n";
        let map = parse_prediction_csv(data.as_bytes(), Path::new("p.csv")).unwrap();
        assert_eq!(map.get(&d(2023, 1)), Some(&11.5));
        assert_eq!(map.get(&d(2023, 2)), Some(&19.0));
    }

    #[test]
    fn actuals_column_is_never_read_as_predictions() {
        let data = "Date,y,forecast\n2023-01-01,100,90\n";
        let map = parse_prediction_csv(data.as_bytes(), Path::new("p.csv")).unwrap();
        assert_eq!(map.get(&d(2023, 1)), Some(&90.0));

        let only_actuals = "Date,Y\n2023-01-01,100\n";
        let err = parse_prediction_csv(only_actuals.as_bytes(), Path::new("p.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn alignment_requires_every_validation_month() {
        let data = "Date,pred\n2023-01-01,1\n";
        let map = parse_prediction_csv(data.as_bytes(), Path::new("p.csv")).unwrap();
        let ok = align_predictions("m", &map, &[d(2023, 1)], Path::new("p.csv")).unwrap();
        assert_eq!(ok.values, vec![1.0]);
        let err = align_predictions("m", &map, &[d(2023, 1), d(2023, 2)], Path::new("p.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
