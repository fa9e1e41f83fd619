//! Date helpers
//!
//! All logs are keyed by ISO dates ("2025-01-09") in local time.

use chrono::{Datelike, Duration, NaiveDate};

use crate::db::{DbError, DbResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's local date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(date: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| DbError::InvalidDate(date.to_string()))
}

/// Parse an optional date, defaulting to today
pub fn resolve_date(date: Option<&str>) -> DbResult<NaiveDate> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(today()),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven dates Monday..Sunday of the week containing `date`
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = week_start(date);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

/// Monday-based week of the year, 0-53
///
/// Week 1 is the first week with four or more days in the year. January
/// days before it are week 0, and late December days stay in the old year
/// (52 or 53), as MySQL `WEEK(d, 1)` counts.
pub fn year_week(date: NaiveDate) -> u32 {
    let jan1 = date - Duration::days(date.ordinal0() as i64);
    let first_monday = week_start(jan1 + Duration::days(3));
    let days = (date - first_monday).num_days();
    if days < 0 {
        0
    } else {
        (days / 7 + 1) as u32
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
