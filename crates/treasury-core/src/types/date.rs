//! Calendar dates and the daily date axis.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{TreasuryError, TreasuryResult};

/// A calendar day on the backtest axis.
///
/// Newtype over `chrono::NaiveDate`. Upstream timestamps are reduced to
/// their UTC day, so every series is indexed by whole days.
///
/// # Example
///
/// ```rust
/// use treasury_core::types::Date;
///
/// let date = Date::parse("2024-03-01").unwrap();
/// assert_eq!(date.add_days(-1), Date::from_ymd(2024, 2, 29).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `TreasuryError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> TreasuryResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| TreasuryError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `TreasuryError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> TreasuryResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| TreasuryError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Parses either a plain date or an RFC 3339 timestamp, keeping the UTC day.
    ///
    /// # Errors
    ///
    /// Returns `TreasuryError::InvalidDate` if neither format matches.
    pub fn parse_timestamp(s: &str) -> TreasuryResult<Self> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(Date(ts.with_timezone(&Utc).date_naive()));
        }
        Self::parse(s)
    }

    /// Returns today's UTC date.
    #[must_use]
    pub fn today() -> Self {
        Date(Utc::now().date_naive())
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

    /// Calculates the number of calendar days between two dates.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
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

impl Add<i64> for Date {
    type Output = Self;

    /// Adds days to a date.
    fn add(self, days: i64) -> Self::Output {
        self.add_days(days)
    }
}

impl Sub<i64> for Date {
    type Output = Self;

    /// Subtracts days from a date.
    fn sub(self, days: i64) -> Self::Output {
        self.add_days(-days)
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}

/// Inclusive daily axis `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a new range.
    ///
    /// # Errors
    ///
    /// Returns `TreasuryError::InvalidDateRange` if `start > end`.
    pub fn new(start: Date, end: Date) -> TreasuryResult<Self> {
        if start > end {
            return Err(TreasuryError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parses a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> TreasuryResult<Self> {
        Self::new(Date::parse(start)?, Date::parse(end)?)
    }

    /// First day of the range.
    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Last day of the range.
    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Number of days on the axis (both ends included).
    #[must_use]
    pub fn len(&self) -> usize {
        (self.start.days_between(&self.end) + 1) as usize
    }

    /// A valid range always holds at least one day.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Checks whether a date lies on the axis.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates every day from `start` to `end`.
    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        let start = self.start;
        (0..self.len() as i64).map(move |offset| start.add_days(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_timestamp() {
        let a = Date::parse("2022-05-17").unwrap();
        let b = Date::parse_timestamp("2022-05-17T23:59:59Z").unwrap();
        let c = Date::parse_timestamp("2022-05-18T01:00:00+02:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(Date::parse("17/05/2022").is_err());
    }

    #[test]
    fn test_date_arithmetic() {
        let d = Date::from_ymd(2024, 2, 28).unwrap();
        assert_eq!(d + 1, Date::from_ymd(2024, 2, 29).unwrap());
        assert_eq!(d + 2, Date::from_ymd(2024, 3, 1).unwrap());
        assert_eq!((d + 10) - d, 10);
        assert_eq!(d.to_string(), "2024-02-28");
    }

    #[test]
    fn test_range_days() {
        let range = DateRange::parse("2024-01-30", "2024-02-02").unwrap();
        let days: Vec<String> = range.days().map(|d| d.to_string()).collect();
        assert_eq!(
            days,
            vec!["2024-01-30", "2024-01-31", "2024-02-01", "2024-02-02"]
        );
        assert_eq!(range.len(), 4);
        assert!(range.contains(Date::parse("2024-02-01").unwrap()));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, TreasuryError::InvalidDateRange { .. }));
    }
}
