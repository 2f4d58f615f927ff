//! Monthly option expiry calendar.
//!
//! Index and stock options expire on the last Thursday of the month. Exchange
//! holidays that shift an expiry are not modelled.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Last Thursday of the given month.
pub fn last_thursday(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let mut day = NaiveDate::from_ymd_opt(ny, nm, 1)? - Duration::days(1);
    while day.weekday() != Weekday::Thu {
        day -= Duration::days(1);
    }
    Some(day)
}

/// First monthly expiry at least `min_days` calendar days after `today`.
pub fn next_monthly_expiry(today: NaiveDate, min_days: i64) -> Option<NaiveDate> {
    let (mut year, mut month) = (today.year(), today.month());
    loop {
        let expiry = last_thursday(year, month)?;
        if (expiry - today).num_days() >= min_days {
            return Some(expiry);
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
}
