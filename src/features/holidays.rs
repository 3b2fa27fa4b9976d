//! Public-holiday calendars.
//!
//! The feature builder only needs to know whether a calendar month contains
//! any public holiday, but calendars enumerate concrete observed dates so they
//! can be checked against published lists.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Source of observed public holidays.
pub trait HolidayCalendar {
    /// Observed public holidays falling in `year`, in date order.
    fn holidays(&self, year: i32) -> Vec<NaiveDate>;

    fn has_holiday_in_month(&self, year: i32, month: u32) -> bool {
        self.holidays(year).iter().any(|d| d.month() == month)
    }
}

/// Bank holidays of England and Wales.
///
/// Attendance data comes from NHS England, so the England and Wales calendar
/// is the relevant one (Scotland and Northern Ireland differ).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglandWalesHolidays;

/// One-off holidays granted by proclamation.
const SPECIAL_HOLIDAYS: [(i32, u32, u32); 7] = [
    (1999, 12, 31), // Millennium
    (2002, 6, 3),   // Golden Jubilee
    (2011, 4, 29),  // Royal wedding
    (2012, 6, 5),   // Diamond Jubilee
    (2022, 6, 3),   // Platinum Jubilee
    (2022, 9, 19),  // State funeral
    (2023, 5, 8),   // Coronation
];

impl HolidayCalendar for EnglandWalesHolidays {
    fn holidays(&self, year: i32) -> Vec<NaiveDate> {
        let mut out = Vec::new();
        let ymd = |m: u32, d: u32| NaiveDate::from_ymd_opt(year, m, d);

        if let Some(new_year) = ymd(1, 1) {
            out.push(next_weekday(new_year));
        }

        if let Some(easter) = easter_sunday(year) {
            out.push(easter - Duration::days(2));
            out.push(easter + Duration::days(1));
        }

        if year >= 1978 {
            let early_may = match year {
                1995 => ymd(5, 8),
                2020 => ymd(5, 8),
                _ => nth_weekday(year, 5, Weekday::Mon, 1),
            };
            out.extend(early_may);
        }

        let spring = match year {
            2002 => ymd(6, 4),
            2012 => ymd(6, 4),
            2022 => ymd(6, 2),
            _ => last_weekday(year, 5, Weekday::Mon),
        };
        out.extend(spring);
        out.extend(last_weekday(year, 8, Weekday::Mon));

        out.extend(christmas_days(year));

        out.extend(
            SPECIAL_HOLIDAYS
                .iter()
                .filter(|(y, _, _)| *y == year)
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        );

        out.sort();
        out.dedup();
        out
    }
}

/// Set of `(year, month)` pairs containing a holiday, precomputed for a year range.
#[derive(Debug, Clone, Default)]
pub struct HolidayMonths {
    months: HashSet<(i32, u32)>,
}

impl HolidayMonths {
    pub fn build(calendar: &dyn HolidayCalendar, first_year: i32, last_year: i32) -> Self {
        let months = (first_year..=last_year)
            .flat_map(|y| calendar.holidays(y))
            .map(|d| (d.year(), d.month()))
            .collect();
        Self { months }
    }

    pub fn contains(&self, year: i32, month: u32) -> bool {
        self.months.contains(&(year, month))
    }
}

/// Easter Sunday (Gregorian), anonymous computus.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Christmas Day and Boxing Day, with substitute days when they hit a weekend.
fn christmas_days(year: i32) -> Vec<NaiveDate> {
    let (Some(christmas), Some(boxing)) = (
        NaiveDate::from_ymd_opt(year, 12, 25),
        NaiveDate::from_ymd_opt(year, 12, 26),
    ) else {
        return Vec::new();
    };
    match christmas.weekday() {
        // Boxing Day falls on Sunday and moves to Tuesday.
        Weekday::Sat => vec![christmas + Duration::days(2), boxing + Duration::days(2)],
        Weekday::Sun => vec![christmas + Duration::days(2), boxing],
        // Boxing Day falls on Saturday and moves to Monday.
        Weekday::Fri => vec![christmas, boxing + Duration::days(2)],
        _ => vec![christmas, boxing],
    }
}

/// Move a weekend date to the following Monday.
fn next_weekday(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    nth_weekday(year, month, weekday, 5).or_else(|| nth_weekday(year, month, weekday, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter_sunday(2019), Some(d(2019, 4, 21)));
        assert_eq!(easter_sunday(2024), Some(d(2024, 3, 31)));
        assert_eq!(easter_sunday(2016), Some(d(2016, 3, 27)));
    }

    #[test]
    fn england_2022_calendar() {
        let got = EnglandWalesHolidays.holidays(2022);
        let want = vec![
            d(2022, 1, 3),
            d(2022, 4, 15),
            d(2022, 4, 18),
            d(2022, 5, 2),
            d(2022, 6, 2),
            d(2022, 6, 3),
            d(2022, 8, 29),
            d(2022, 9, 19),
            d(2022, 12, 26),
            d(2022, 12, 27),
        ];
        assert_eq!(got, want);
    }

    #[test]
    fn month_flags() {
        let cal = EnglandWalesHolidays;
        assert!(cal.has_holiday_in_month(2023, 1));
        assert!(cal.has_holiday_in_month(2023, 4));
        assert!(!cal.has_holiday_in_month(2023, 2));
        assert!(!cal.has_holiday_in_month(2023, 7));
        assert!(!cal.has_holiday_in_month(2023, 11));
        // Easter 2024 spans March (Good Friday) and April (Easter Monday).
        assert!(cal.has_holiday_in_month(2024, 3));
        assert!(cal.has_holiday_in_month(2024, 4));
    }

    #[test]
    fn holiday_months_precompute_matches_calendar() {
        let months = HolidayMonths::build(&EnglandWalesHolidays, 2010, 2024);
        for year in 2010..=2024 {
            for month in 1..=12 {
                assert_eq!(
                    months.contains(year, month),
                    EnglandWalesHolidays.has_holiday_in_month(year, month),
                    "{year}-{month}"
                );
            }
        }
    }
}
