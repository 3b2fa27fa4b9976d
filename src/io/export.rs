//! Exports: clean series, feature table, leaderboard, validation predictions.
//!
//! CSV is the default; the leaderboard can also be written as JSON when the
//! path ends in `.json`.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domain::{CleanSeries, FeatureTable, ModelPredictions};
use crate::error::AppError;
use crate::evaluate::Leaderboard;

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn write_rows<T: Serialize>(path: &Path, what: &str, rows: impl IntoIterator<Item = T>) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, what)?);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write {what} row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush {what}: {e}")))?;
    info!(path = %path.display(), "wrote {what}");
    Ok(())
}

/// `Date,y`, one row per month.
pub fn write_series_csv(path: &Path, series: &CleanSeries) -> Result<(), AppError> {
    write_rows(path, "series CSV", series.points())
}

/// The feature table in its documented column order.
pub fn write_feature_csv(path: &Path, table: &FeatureTable) -> Result<(), AppError> {
    write_rows(path, "feature CSV", &table.rows)
}

/// `Model,MAPE,RMSE,MAE`, best first. JSON when the extension is `.json`.
pub fn write_leaderboard(path: &Path, leaderboard: &Leaderboard) -> Result<(), AppError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let file = create(path, "leaderboard JSON")?;
        serde_json::to_writer_pretty(file, leaderboard.rows())
            .map_err(|e| AppError::new(2, format!("Failed to write leaderboard JSON: {e}")))?;
        info!(path = %path.display(), "wrote leaderboard JSON");
        return Ok(());
    }
    // csv cannot serialize the flattened `Scores`, so spell the row out.
    let rows = leaderboard.rows().iter().map(|r| LeaderboardRow {
        model: &r.model,
        mape: r.scores.mape,
        rmse: r.scores.rmse,
        mae: r.scores.mae,
    });
    write_rows(path, "leaderboard CSV", rows)
}

#[derive(Serialize)]
struct LeaderboardRow<'a> {
    #[serde(rename = "Model")]
    model: &'a str,
    #[serde(rename = "MAPE")]
    mape: f64,
    #[serde(rename = "RMSE")]
    rmse: f64,
    #[serde(rename = "MAE")]
    mae: f64,
}

/// `Date,y,<model>...` over the validation window.
pub fn write_validation_csv(
    path: &Path,
    dates: &[NaiveDate],
    actuals: &[f64],
    predictions: &[ModelPredictions],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(create(path, "predictions CSV")?);
    let mut header = vec!["Date".to_string(), "y".to_string()];
    header.extend(predictions.iter().map(|p| p.model.clone()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write predictions CSV header: {e}")))?;

    for (i, (date, actual)) in dates.iter().zip(actuals).enumerate() {
        let mut record = vec![date.to_string(), actual.to_string()];
        record.extend(
            predictions
                .iter()
                .map(|p| p.values.get(i).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write predictions CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush predictions CSV: {e}")))?;
    info!(path = %path.display(), models = predictions.len(), "wrote validation predictions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonthlyPoint, Scores};

    #[test]
    fn series_csv_has_date_and_y_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        let series = CleanSeries::new(vec![MonthlyPoint {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            y: 2_000_000.0,
        }])
        .unwrap();
        write_series_csv(&path, &series).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Date,y\n2020-01-01,2000000.0\n");
    }

    #[test]
    fn leaderboard_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let board = Leaderboard::from_scores(vec![(
            "Seasonal-Naive".to_string(),
            Scores { mape: 4.5, rmse: 100.0, mae: 80.0 },
        )]);

        let csv_path = dir.path().join("board.csv");
        write_leaderboard(&csv_path, &board).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("Model,MAPE,RMSE,MAE\n"));
        assert!(text.contains("Seasonal-Naive,4.5,100.0,80.0"));

        let json_path = dir.path().join("board.json");
        write_leaderboard(&json_path, &board).unwrap();
        let value: serde_json::Value = serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
        assert_eq!(value[0]["Model"], "Seasonal-Naive");
        assert_eq!(value[0]["MAPE"], 4.5);
    }
}
