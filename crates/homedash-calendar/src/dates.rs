//! Month arithmetic and the 6x7 month grid.

use chrono::{Datelike, Duration, NaiveDate};

/// First day of the given month, or `None` if the month is invalid.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Shift `(year, month)` by `delta` months.
///
/// Works on the zero-based month index so that negative deltas floor
/// correctly across year boundaries.
pub fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let y = index.div_euclid(12);
    let m = index.rem_euclid(12) + 1;
    (
        i32::try_from(y).unwrap_or(if y < 0 { i32::MIN } else { i32::MAX }),
        m as u32,
    )
}

/// The 42 days shown for a month, in six Sunday-first weeks.
///
/// Returns `None` for an invalid month or when the grid would leave the
/// representable date range.
pub fn month_grid_days(year: i32, month: u32) -> Option<[[NaiveDate; 7]; 6]> {
    let first = first_of_month(year, month)?;
    let lead = i64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_signed(Duration::days(lead))?;

    let days: Vec<NaiveDate> = start.iter_days().take(42).collect();
    if days.len() != 42 {
        return None;
    }

    let mut weeks = [[start; 7]; 6];
    for (i, day) in days.into_iter().enumerate() {
        weeks[i / 7][i % 7] = day;
    }
    Some(weeks)
}
