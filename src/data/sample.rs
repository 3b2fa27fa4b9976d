//! Synthetic raw attendance exports.
//!
//! Produces a file shaped like the published monthly A&E export: title and
//! metadata rows, a `Period` header, per-department columns, a total column,
//! a percentage column, and trailing footnotes. Values are trend + annual
//! seasonality (winter trough, summer peak) scaled by days in the month, with
//! multiplicative Gaussian noise.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::{Datelike, Months, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::error::AppError;

/// Average month length used to scale monthly totals.
const AVG_DAYS_PER_MONTH: f64 = 30.436875;

/// Shares of the total by department type (type 1, type 2); type 3 is the rest.
const TYPE1_SHARE: f64 = 0.62;
const TYPE2_SHARE: f64 = 0.02;

pub const SAMPLE_HEADERS: [&str; 6] = [
    "Period",
    "Type 1 Departments - Major A&E",
    "Type 2 Departments - Single Specialty",
    "Type 3 Departments - Other A&E/Minor Injury Unit",
    "Total attendances",
    "Percentage in 4 hours or less (all)",
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// First month (any day; truncated to month start).
    pub start: NaiveDate,
    pub months: usize,
    pub seed: u64,
    /// Attendances per average-length month at `start`.
    pub level: f64,
    /// Growth per month (attendances).
    pub trend: f64,
    /// Relative seasonal amplitude.
    pub seasonal_amp: f64,
    /// Std dev of the multiplicative log-noise.
    pub noise_sd: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2010, 8, 1).unwrap_or(NaiveDate::MIN),
            months: 160,
            seed: 42,
            level: 1_780_000.0,
            trend: 2_500.0,
            seasonal_amp: 0.05,
            noise_sd: 0.015,
        }
    }
}

/// Generated export: raw rows (as written) plus the true totals.
#[derive(Debug, Clone)]
pub struct SampleExport {
    pub rows: Vec<Vec<String>>,
    pub totals: Vec<(NaiveDate, f64)>,
}

pub fn generate_sample(config: &SampleConfig) -> Result<SampleExport, AppError> {
    if config.months == 0 {
        return Err(AppError::new(2, "Sample month count must be > 0."));
    }
    if !(config.level.is_finite() && config.level > 0.0) {
        return Err(AppError::new(2, "Sample level must be finite and > 0."));
    }
    if !(config.noise_sd.is_finite() && config.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Sample noise must be finite and >= 0."));
    }

    let months = u32::try_from(config.months)
        .map_err(|_| AppError::new(2, format!("Sample month count {} is too large.", config.months)))?;

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let start = config.start.with_day(1).unwrap_or(config.start);
    let last = start
        .checked_add_months(Months::new(months - 1))
        .ok_or_else(|| AppError::new(2, "Sample range overflows the calendar."))?;

    let mut rows: Vec<Vec<String>> = vec![
        vec!["A&E Attendances and Emergency Admissions".to_string()],
        vec!["Title:".to_string(), "Monthly A&E Time Series (synthetic)".to_string()],
        vec![
            "Period covered:".to_string(),
            format!("{} to {}", period_label(start), period_label(last)),
        ],
        vec!["Source:".to_string(), "generated by erf sample".to_string()],
        Vec::new(),
        SAMPLE_HEADERS.iter().map(|s| s.to_string()).collect(),
    ];
    let mut totals = Vec::with_capacity(config.months);

    for i in 0..months {
        let date = start
            .checked_add_months(Months::new(i))
            .ok_or_else(|| AppError::new(2, "Sample range overflows the calendar."))?;

        let base = config.level + config.trend * i as f64;
        let season = 1.0 + config.seasonal_amp * seasonal_shape(date.month());
        let days = days_in_month(date) as f64 / AVG_DAYS_PER_MONTH;
        let noise = (config.noise_sd * normal.sample(&mut rng)).exp();
        let total = (base * season * days * noise).round().max(1.0);

        let type1 = (total * TYPE1_SHARE).round();
        let type2 = (total * TYPE2_SHARE).round();
        let type3 = total - type1 - type2;
        let within_4h = 95.0 - 0.08 * i as f64 + rng.gen_range(-1.0..1.0);

        rows.push(vec![
            period_label(date),
            with_thousands(type1),
            with_thousands(type2),
            with_thousands(type3),
            with_thousands(total),
            format!("{within_4h:.1}%"),
        ]);
        totals.push((date, total));
    }

    rows.push(Vec::new());
    rows.push(vec!["Notes:".to_string()]);
    rows.push(vec!["1. Figures for the latest month are provisional.".to_string()]);

    Ok(SampleExport { rows, totals })
}

/// Write the export as CSV (ragged rows allowed).
pub fn write_sample_csv(path: &Path, export: &SampleExport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
    for row in &export.rows {
        // An empty record would be written as nothing; emit one empty cell instead.
        let record: Vec<&str> = if row.is_empty() {
            vec![""]
        } else {
            row.iter().map(String::as_str).collect()
        };
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
    info!(path = %path.display(), months = export.totals.len(), "wrote sample export");
    Ok(())
}

/// Summer peak, winter trough; zero-mean over a year.
fn seasonal_shape(month: u32) -> f64 {
    (2.0 * std::f64::consts::PI * (month as f64 - 7.0) / 12.0).cos()
}

fn days_in_month(date: NaiveDate) -> i64 {
    match date.checked_add_months(Months::new(1)) {
        Some(next) => (next - date).num_days(),
        None => 31,
    }
}

fn period_label(date: NaiveDate) -> String {
    date.format("%b-%y").to_string()
}

/// `1234567` -> `1,234,567`.
pub fn with_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && digits != "0" {
        out.insert(0, '-');
    }
    out
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.start.hash(&mut hasher);
    config.months.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.level.to_bits().hash(&mut hasher);
    config.trend.to_bits().hash(&mut hasher);
    config.seasonal_amp.to_bits().hash(&mut hasher);
    config.noise_sd.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_from_table;
    use crate::io::raw::RawTable;

    #[test]
    fn thousands_separator() {
        assert_eq!(with_thousands(0.0), "0");
        assert_eq!(with_thousands(999.0), "999");
        assert_eq!(with_thousands(1000.0), "1,000");
        assert_eq!(with_thousands(1_234_567.0), "1,234,567");
        assert_eq!(with_thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn same_seed_same_export() {
        let config = SampleConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.rows, b.rows);

        let other = generate_sample(&SampleConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a.totals, other.totals);
    }

    #[test]
    fn generated_export_loads_back_exactly() {
        let config = SampleConfig {
            months: 30,
            ..SampleConfig::default()
        };
        let export = generate_sample(&config).unwrap();
        let report = load_from_table(&RawTable::from_rows(export.rows.clone()), 50).unwrap();

        assert_eq!(report.attendance_column, "Total attendances");
        assert_eq!(report.series.len(), 30);
        for (p, (date, total)) in report.series.points().iter().zip(&export.totals) {
            assert_eq!(p.date, *date);
            assert_eq!(p.y, *total);
        }
        // Blank row and two footnote rows after the data.
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn month_count_is_validated() {
        let zero = SampleConfig {
            months: 0,
            ..SampleConfig::default()
        };
        assert_eq!(generate_sample(&zero).unwrap_err().exit_code(), 2);

        let huge = SampleConfig {
            months: u32::MAX as usize + 1,
            ..SampleConfig::default()
        };
        assert_eq!(generate_sample(&huge).unwrap_err().exit_code(), 2);

        let overflow = SampleConfig {
            months: u32::MAX as usize,
            ..SampleConfig::default()
        };
        assert_eq!(generate_sample(&overflow).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn february_is_shorter() {
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()), 28);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()), 29);
        assert_eq!(days_in_month(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()), 31);
    }
}
