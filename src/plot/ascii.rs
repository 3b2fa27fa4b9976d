//! ASCII plotting of actuals against model predictions.
//!
//! Fixed-size character grid with deterministic output:
//! - actual attendances: `o` joined by `.`
//! - model predictions: `A`, `B`, ... in input order
//!
//! The x axis is the month index of the plotted window; predictions are
//! aligned to its tail (the validation months).

use crate::domain::{ModelPredictions, MonthlyPoint};

const MARKERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Render `actual` with each model's predictions overlaid on its last months.
pub fn render_forecast_plot(
    actual: &[MonthlyPoint],
    predictions: &[ModelPredictions],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n = actual.len();

    let (y_min, y_max) = y_range(actual, predictions).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);
    let x_max = n.saturating_sub(1).max(1) as f64;

    let mut grid = vec![vec![' '; width]; height];

    // Connecting line first so markers overlay it.
    let cells: Vec<(usize, usize)> = actual
        .iter()
        .enumerate()
        .map(|(i, p)| (map_x(i as f64, x_max, width), map_y(p.y, y_min, y_max, height)))
        .collect();
    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1], '.');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    for (p, &marker) in predictions.iter().zip(MARKERS) {
        let offset = n.saturating_sub(p.values.len());
        for (i, &v) in p.values.iter().enumerate() {
            if !v.is_finite() {
                continue;
            }
            let x = map_x((offset + i) as f64, x_max, width);
            let y = map_y(v, y_min, y_max, height);
            grid[y][x] = marker as char;
        }
    }

    let mut out = String::new();
    match (actual.first(), actual.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Plot: {} .. {} | y=[{y_min:.1}, {y_max:.1}]\n",
            first.date.format("%Y-%m"),
            last.date.format("%Y-%m")
        )),
        _ => out.push_str(&format!("Plot: (no data) | y=[{y_min:.1}, {y_max:.1}]\n")),
    }

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let mut legend = vec!["o actual".to_string()];
    legend.extend(
        predictions
            .iter()
            .zip(MARKERS)
            .map(|(p, &m)| format!("{} {}", m as char, p.model)),
    );
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn y_range(actual: &[MonthlyPoint], predictions: &[ModelPredictions]) -> Option<(f64, f64)> {
    let values = actual
        .iter()
        .map(|p| p.y)
        .chain(predictions.iter().flat_map(|p| p.values.iter().copied()))
        .filter(|v| v.is_finite());

    let (min_y, max_y) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, min_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: f64, x_max: f64, width: usize) -> usize {
    let u = (i / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Top row is the maximum.
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham); only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
            .filter(|c| **c == ' ')
        {
            *cell = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(month: u32, y: f64) -> MonthlyPoint {
        MonthlyPoint {
            date: NaiveDate::from_ymd_opt(2020, month, 1).unwrap(),
            y,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let actual = vec![point(1, 100.0), point(2, 100.0), point(3, 100.0)];
        let preds = vec![ModelPredictions {
            model: "Seasonal-Naive".to_string(),
            values: vec![110.0],
        }];

        let txt = render_forecast_plot(&actual, &preds, 10, 5);
        let expected = concat!(
            "Plot: 2020-01 .. 2020-03 | y=[99.5, 110.5]\n",
            "         A\n",
            "          \n",
            "          \n",
            "          \n",
            "o....o...o\n",
            "o actual  A Seasonal-Naive\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_input_still_renders_a_frame() {
        let txt = render_forecast_plot(&[], &[], 12, 6);
        assert_eq!(txt.lines().count(), 1 + 6 + 1);
        assert!(txt.starts_with("Plot: (no data)"));
    }

    #[test]
    fn non_finite_predictions_are_not_drawn() {
        let actual = vec![point(1, 100.0), point(2, 120.0)];
        let preds = vec![ModelPredictions {
            model: "m".to_string(),
            values: vec![f64::NAN],
        }];
        let txt = render_forecast_plot(&actual, &preds, 10, 5);
        let body: String = txt.lines().skip(1).take(5).collect();
        assert!(!body.contains('A'));
    }
}
