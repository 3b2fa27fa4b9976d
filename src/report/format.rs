//! Formatted terminal output.
//!
//! Formatting lives here so the loader, builder and evaluator stay free of
//! presentation details and output changes stay localized.

use std::path::Path;

use crate::data::with_thousands;
use crate::domain::FeatureTable;
use crate::evaluate::Leaderboard;
use crate::io::ingest::LoadReport;

/// MAPE as a percentage with two decimals, e.g. `12.34%`.
pub fn fmt_mape(mape: f64) -> String {
    if mape.is_finite() {
        format!("{mape:.2}%")
    } else {
        "n/a".to_string()
    }
}

/// RMSE rounded to whole attendances with thousands separators.
pub fn fmt_rmse(rmse: f64) -> String {
    if rmse.is_finite() {
        with_thousands(rmse.round())
    } else {
        "n/a".to_string()
    }
}

/// Source, header location, chosen column, and what was dropped.
pub fn format_load_summary(source: &Path, report: &LoadReport) -> String {
    let mut out = String::new();
    let series = &report.series;

    out.push_str("=== erf - A&E attendance series ===\n");
    out.push_str(&format!("Source: {}\n", source.display()));
    out.push_str(&format!(
        "Header: row {} | column '{}'\n",
        report.header_row + 1,
        report.attendance_column
    ));
    if !report.ambiguous_columns.is_empty() {
        out.push_str(&format!(
            "  (also matched: {})\n",
            report.ambiguous_columns.join(", ")
        ));
    }

    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Months: n={} | {} .. {}\n",
            series.len(),
            first.format("%Y-%m"),
            last.format("%Y-%m")
        )),
        _ => out.push_str("Months: n=0\n"),
    }

    let values = series.values();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min.is_finite() {
        out.push_str(&format!("Attendances: [{}, {}]\n", with_thousands(min), with_thousands(max)));
    }

    out.push_str(&format!(
        "Rows: scanned={} | skipped={} | duplicates={}\n",
        report.rows_scanned,
        report.skipped.len(),
        report.duplicates_dropped
    ));
    let gaps = series.gaps();
    if !gaps.is_empty() {
        out.push_str(&format!("Gaps: {}\n", gaps.len()));
        for gap in &gaps {
            out.push_str(&format!(
                "  {} -> {}\n",
                gap.after.format("%Y-%m"),
                gap.next.format("%Y-%m")
            ));
        }
    }

    out
}

pub fn format_feature_summary(table: &FeatureTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Features: rows={} | truncated={} | columns={}\n",
        table.len(),
        table.dropped_rows,
        FeatureTable::column_names().len()
    ));
    if let (Some(first), Some(last)) = (table.rows.first(), table.rows.last()) {
        out.push_str(&format!(
            "Range: {} .. {}\n",
            first.date.format("%Y-%m"),
            last.date.format("%Y-%m")
        ));
    }
    out
}

/// Leaderboard table, best first. `highlight` marks one row with `*`.
pub fn format_leaderboard(board: &Leaderboard, highlight: Option<&str>) -> String {
    let marked = highlight.and_then(|name| board.find(name)).map(|r| r.model.as_str());

    let mut out = String::new();
    out.push_str("Leaderboard (lowest MAPE first):\n");
    out.push_str(
        format!("  {:<4} {:<24} {:>9} {:>12} {:>12}", "rank", "model", "MAPE", "RMSE", "MAE").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("  {:-<4} {:-<24} {:-<9} {:-<12} {:-<12}", "", "", "", "", "").trim_end());
    out.push('\n');

    for (i, row) in board.rows().iter().enumerate() {
        let mark = if Some(row.model.as_str()) == marked { "*" } else { " " };
        out.push_str(
            format!(
                "{mark} {:<4} {:<24} {:>9} {:>12} {:>12}",
                i + 1,
                truncate(&row.model, 24),
                fmt_mape(row.scores.mape),
                fmt_rmse(row.scores.rmse),
                fmt_rmse(row.scores.mae),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// One-line KPI for a named model, or a note that it is not on the board.
pub fn format_kpi(board: &Leaderboard, name: &str) -> String {
    match board.find(name) {
        Some(row) => format!(
            "{}: MAPE {} | RMSE {}\n",
            row.model,
            fmt_mape(row.scores.mape),
            fmt_rmse(row.scores.rmse)
        ),
        None => format!("{name}: not on the leaderboard\n"),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scores;

    fn board() -> Leaderboard {
        Leaderboard::from_scores(vec![
            ("Feature-OLS".to_string(), Scores { mape: 3.456, rmse: 61_234.4, mae: 50_000.0 }),
            ("Seasonal-Naive".to_string(), Scores { mape: 2.5, rmse: 1_234_567.6, mae: 999.0 }),
        ])
    }

    #[test]
    fn mape_and_rmse_formatting() {
        assert_eq!(fmt_mape(12.3456), "12.35%");
        assert_eq!(fmt_mape(f64::NAN), "n/a");
        assert_eq!(fmt_rmse(1_234_567.6), "1,234,568");
        assert_eq!(fmt_rmse(12.4), "12");
    }

    #[test]
    fn leaderboard_lists_best_first_and_marks_highlight() {
        let txt = format_leaderboard(&board(), Some("feature-ols"));
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("  1"));
        assert!(lines[3].contains("Seasonal-Naive"));
        assert!(lines[3].contains("2.50%"));
        assert!(lines[3].contains("1,234,568"));
        assert!(lines[4].starts_with("* 2"));
        assert!(lines[4].contains("3.46%"));
    }

    #[test]
    fn kpi_uses_case_insensitive_lookup() {
        assert_eq!(
            format_kpi(&board(), " seasonal-naive "),
            "Seasonal-Naive: MAPE 2.50% | RMSE 1,234,568\n"
        );
        assert_eq!(format_kpi(&board(), "Prophet"), "Prophet: not on the leaderboard\n");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
