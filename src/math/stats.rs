//! Trailing-window statistics over a monthly value slice.
//!
//! All windows here look strictly backwards: the window for index `t` never
//! includes `values[t]` itself.

/// Value `k` rows before index `t`.
pub fn lag(values: &[f64], t: usize, k: usize) -> Option<f64> {
    t.checked_sub(k).and_then(|i| values.get(i).copied())
}

/// The `w` values immediately preceding index `t` (excluding `t`).
pub fn trailing_window(values: &[f64], t: usize, w: usize) -> Option<&[f64]> {
    if w == 0 || t > values.len() {
        return None;
    }
    let start = t.checked_sub(w)?;
    Some(&values[start..t])
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (`n - 1` denominator). Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let n = values.len() as f64;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// Relative change `current / previous - 1`.
pub fn relative_change(current: f64, previous: Option<f64>) -> Option<f64> {
    let previous = previous?;
    if previous == 0.0 {
        return None;
    }
    let r = current / previous - 1.0;
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_excludes_current() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(trailing_window(&v, 3, 3), Some(&v[0..3]));
        assert_eq!(trailing_window(&v, 2, 3), None);
        assert_eq!(trailing_window(&v, 5, 2), Some(&v[3..5]));
    }

    #[test]
    fn lag_before_start_is_none() {
        let v = [10.0, 20.0];
        assert_eq!(lag(&v, 1, 1), Some(10.0));
        assert_eq!(lag(&v, 0, 1), None);
    }

    #[test]
    fn sample_std_matches_known_value() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] is sqrt(32/7).
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = sample_std(&v).unwrap();
        assert!((s - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn relative_change_basic() {
        assert!((relative_change(110.0, Some(100.0)).unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(relative_change(1.0, None), None);
        assert_eq!(relative_change(1.0, Some(0.0)), None);
    }
}
