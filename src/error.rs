//! Error types.
//!
//! `AppError` is what the binary reports (message + process exit code). The
//! library layers return the typed enums below and convert at the boundary:
//!
//! - `2`: input/format problems (bad source layout, unreadable files)
//! - `3`: not enough data to do what was asked
//! - `4`: numeric/runtime failures

use std::path::PathBuf;

use chrono::NaiveDate;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// The raw source no longer matches the layout the loader understands.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// No row within the search window has `Period` in its first cell.
    #[error("no header row with 'Period' in the first column within the first {searched} rows (first cells seen: {first_cells:?})")]
    HeaderNotFound {
        searched: usize,
        first_cells: Vec<String>,
    },

    /// The header row has no column naming total attendances.
    #[error("no 'Total Attendances' column found. Got: {columns:?}")]
    AttendanceColumnNotFound { columns: Vec<String> },
}

/// A single cell that could not be used. Recorded per row, never fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    #[error("missing {column} cell")]
    MissingCell { column: &'static str },

    #[error("unparseable period label '{0}'")]
    UnparseablePeriod(String),

    #[error("non-numeric attendance value '{0}'")]
    NonNumericValue(String),

    #[error("non-positive attendance value {0}")]
    NonPositiveValue(f64),
}

/// Fatal errors while loading a raw source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open source '{path}'")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read CSV record {record} of '{path}'")]
    Csv {
        path: PathBuf,
        record: usize,
        source: csv::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("no usable rows remain after parsing ({skipped} rows skipped)")]
    NoUsableRows { skipped: usize },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// A `CleanSeries` invariant does not hold.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("date {0} is not the first day of its month")]
    NotMonthStart(NaiveDate),

    #[error("dates must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: NaiveDate, next: NaiveDate },

    #[error("value {value} at {date} must be finite and > 0")]
    InvalidValue { date: NaiveDate, value: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    /// Lags are taken in rows; a missing month would silently shift them.
    #[error("series is not gap-free: {after} is followed by {next} (use --gap-policy row-offset to accept)")]
    Gap { after: NaiveDate, next: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("actual and predicted lengths differ ({actual} vs {predicted})")]
    Shape { actual: usize, predicted: usize },

    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("{model}: underdetermined fit (n={n} rows for k={k} parameters)")]
    Underdetermined { model: String, n: usize, k: usize },

    #[error("{model}: least squares system could not be solved")]
    Singular { model: String },

    #[error("{model}: {reason}")]
    Input { model: String, reason: String },
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        let code = match err {
            LoadError::NoUsableRows { .. } => 3,
            _ => 2,
        };
        AppError::new(code, error_chain(&err))
    }
}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<MetricError> for AppError {
    fn from(err: MetricError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let code = match err {
            ModelError::Underdetermined { .. } => 3,
            ModelError::Singular { .. } => 4,
            ModelError::Input { .. } => 2,
        };
        AppError::new(code, err.to_string())
    }
}

/// Render an error and its sources as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(&format!(": {inner}"));
        source = inner.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_errors_map_to_exit_code_two_and_list_columns() {
        let err = LoadError::Format(FormatError::AttendanceColumnNotFound {
            columns: vec!["Period".to_string(), "Type 1".to_string()],
        });
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().contains("Type 1"));
    }

    #[test]
    fn empty_load_is_insufficient_data() {
        let app: AppError = LoadError::NoUsableRows { skipped: 4 }.into();
        assert_eq!(app.exit_code(), 3);
    }
}
