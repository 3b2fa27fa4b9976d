//! Raw export ingest and normalization.
//!
//! This module turns a semi-structured attendance export into a clean,
//! month-start `CleanSeries`.
//!
//! Design goals:
//! - **Strict structure**: the header row and attendance column must be found,
//!   otherwise the load fails with a `FormatError` describing what was seen.
//! - **Lenient cells**: a bad period label or value only skips its row
//!   (footnotes and blank lines are common in historical exports), and every
//!   skip is recorded.
//! - **Deterministic**: same input, same series.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::domain::{CleanSeries, LoadConfig, MonthlyPoint, month_start};
use crate::error::{CellError, FormatError, LoadError};
use crate::io::raw::RawTable;

/// Period label layouts in priority order (year-first before month-first).
const PERIOD_FORMATS: [&str; 4] = ["%y-%b", "%Y-%b", "%b-%y", "%b-%Y"];

/// A row that was dropped during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based record number in the raw table.
    pub line: usize,
    pub reason: CellError,
}

/// Outcome of matching header names against the attendance predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMatch {
    Unique(usize),
    /// Several columns match; `chosen` is the leftmost.
    Ambiguous { chosen: usize, others: Vec<usize> },
    Missing,
}

impl ColumnMatch {
    pub fn chosen(&self) -> Option<usize> {
        match self {
            ColumnMatch::Unique(idx) => Some(*idx),
            ColumnMatch::Ambiguous { chosen, .. } => Some(*chosen),
            ColumnMatch::Missing => None,
        }
    }
}

/// Ingest output: the series plus everything needed to sanity-check it.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub series: CleanSeries,
    /// 0-based index of the header row in the raw table.
    pub header_row: usize,
    pub attendance_column: String,
    /// Other matching columns when the match was ambiguous.
    pub ambiguous_columns: Vec<String>,
    /// Data rows below the header.
    pub rows_scanned: usize,
    pub skipped: Vec<SkippedRow>,
    pub duplicates_dropped: usize,
}

/// Load and normalize a raw export from disk.
#[instrument(skip(config), fields(source = %config.source.display()))]
pub fn load_series(config: &LoadConfig) -> Result<LoadReport, LoadError> {
    let table = RawTable::read_csv(&config.source)?;
    load_from_table(&table, config.header_search_rows)
}

/// Load and normalize an in-memory raw table.
pub fn load_from_table(table: &RawTable, header_search_rows: usize) -> Result<LoadReport, LoadError> {
    let header_row = find_header_row(table, header_search_rows)?;
    let headers = &table.rows()[header_row];

    let column_match = select_attendance_column(headers);
    let Some(value_col) = column_match.chosen() else {
        return Err(FormatError::AttendanceColumnNotFound {
            columns: headers.clone(),
        }
        .into());
    };
    let ambiguous_columns = match &column_match {
        ColumnMatch::Ambiguous { others, .. } => {
            let names: Vec<String> = others.iter().map(|&i| headers[i].clone()).collect();
            warn!(
                chosen = %headers[value_col],
                others = ?names,
                "several attendance columns match; using the leftmost"
            );
            names
        }
        _ => Vec::new(),
    };
    info!(header_row, column = %headers[value_col], "found header row");

    let mut observations = Vec::new();
    let mut skipped = Vec::new();
    let data_rows = &table.rows()[header_row + 1..];

    for (idx, row) in data_rows.iter().enumerate() {
        // +2: header_row is 0-based and the first data row follows it.
        let line = header_row + idx + 2;
        match parse_row(row, value_col) {
            Ok(obs) => observations.push(obs),
            Err(reason) => {
                debug!(line, %reason, "skipping row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    let (points, duplicates_dropped) = normalize_observations(observations);
    if points.is_empty() {
        return Err(LoadError::NoUsableRows {
            skipped: skipped.len(),
        });
    }
    if duplicates_dropped > 0 {
        warn!(duplicates_dropped, "dropped duplicate months (kept first occurrence)");
    }

    let series = CleanSeries::new(points)?;
    info!(
        months = series.len(),
        skipped = skipped.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "loaded series"
    );

    Ok(LoadReport {
        series,
        header_row,
        attendance_column: headers[value_col].clone(),
        ambiguous_columns,
        rows_scanned: data_rows.len(),
        skipped,
        duplicates_dropped,
    })
}

/// Find the first row (within `max_rows`) whose first cell is `period`.
pub fn find_header_row(table: &RawTable, max_rows: usize) -> Result<usize, FormatError> {
    let searched = max_rows.min(table.len());
    for i in 0..searched {
        let first = table.cell(i, 0).unwrap_or("");
        if normalize_header_name(first) == "period" {
            return Ok(i);
        }
    }
    Err(FormatError::HeaderNotFound {
        searched,
        first_cells: (0..searched)
            .map(|i| table.cell(i, 0).unwrap_or("").to_string())
            .collect(),
    })
}

/// Match columns naming total attendances (`total` and `attend`, any case).
pub fn select_attendance_column(headers: &[String]) -> ColumnMatch {
    let matches: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            let name = normalize_header_name(name);
            name.contains("total") && name.contains("attend")
        })
        .map(|(idx, _)| idx)
        .collect();

    match matches.as_slice() {
        [] => ColumnMatch::Missing,
        [only] => ColumnMatch::Unique(*only),
        [first, rest @ ..] => ColumnMatch::Ambiguous {
            chosen: *first,
            others: rest.to_vec(),
        },
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a UTF-8 BOM on the first cell.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

fn parse_row(row: &[String], value_col: usize) -> Result<(NaiveDate, f64), CellError> {
    let period = row
        .first()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(CellError::MissingCell { column: "period" })?;
    let date = parse_period(period).ok_or_else(|| CellError::UnparseablePeriod(period.to_string()))?;

    let raw_value = row
        .get(value_col)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(CellError::MissingCell { column: "attendance" })?;
    let value = parse_count(raw_value)?;
    if value <= 0.0 {
        return Err(CellError::NonPositiveValue(value));
    }
    Ok((date, value))
}

/// Parse a short period label such as `Aug-10`, `2010-Aug` or `Aug-2010`.
///
/// Returns the first day of the month, or `None` if no layout matches.
/// Two-digit years pivot at 69: `69`..`99` are 1969..1999, `00`..`68` are
/// 2000..2068.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    let with_day = format!("{label}-01");
    PERIOD_FORMATS.iter().find_map(|fmt| {
        let date = NaiveDate::parse_from_str(&with_day, &format!("{fmt}-%d")).ok()?;
        // chrono puts `69` in 2069.
        if fmt.contains("%y") && date.year() == 2069 {
            return date.with_year(1969);
        }
        Some(date)
    })
}

/// Parse a count cell, tolerating thousands separators and percent signs.
pub fn parse_count(raw: &str) -> Result<f64, CellError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '%').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(CellError::MissingCell { column: "attendance" });
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CellError::NonNumericValue(raw.to_string())),
    }
}

/// Month-start normalize, keep the first row per month, sort by date.
fn normalize_observations(observations: Vec<(NaiveDate, f64)>) -> (Vec<MonthlyPoint>, usize) {
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    let mut points = Vec::with_capacity(observations.len());

    for (date, y) in observations {
        let date = month_start(date);
        if !seen.insert(date) {
            duplicates += 1;
            continue;
        }
        points.push(MonthlyPoint { date, y });
    }

    points.sort_by_key(|p| p.date);
    (points, duplicates)
}
