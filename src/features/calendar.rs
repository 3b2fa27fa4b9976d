//! Calendar features. No history dependency; always defined.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
    pub month_sin: f64,
    pub month_cos: f64,
}

pub fn calendar_features(date: NaiveDate) -> CalendarFeatures {
    let month = date.month();
    let angle = 2.0 * PI * month as f64 / 12.0;
    CalendarFeatures {
        year: date.year(),
        month,
        quarter: (month - 1) / 3 + 1,
        month_sin: angle.sin(),
        month_cos: angle.cos(),
    }
}
