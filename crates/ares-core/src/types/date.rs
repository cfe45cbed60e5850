//! Trading date type.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A calendar date of a price observation.
///
/// This is a newtype wrapper around `chrono::NaiveDate`. It serializes as an
/// ISO 8601 string (`YYYY-MM-DD`).
///
/// # Example
///
/// ```rust
/// use ares_core::types::Date;
///
/// let date = Date::from_ymd(2024, 2, 29).unwrap();
/// let later = date.add_years(1).unwrap();
/// assert_eq!(later.to_string(), "2025-02-28");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CoreResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns today's date.
    #[must_use]
    pub fn today() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Adds a number of years to the date.
    ///
    /// Feb 29 rolls back to Feb 28 in non-leap target years.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn add_years(&self, years: i32) -> CoreResult<Self> {
        let new_year = self.year() + years;
        let max_day = days_in_month(new_year, self.month());
        Self::from_ymd(new_year, self.month(), self.day().min(max_day))
    }

    /// Returns true if both dates fall in the same calendar month.
    #[must_use]
    pub fn same_month(&self, other: &Date) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 31,
    }
}
