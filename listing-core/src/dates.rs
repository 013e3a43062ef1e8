//! Month keys and UTC day boundaries.
//!
//! Every exception, booking and fetch result is routed to a month bucket by
//! its [`MonthKey`]. Calendar days chosen by the viewer are turned into UTC
//! day slots without shifting: the local calendar day 2024-03-11 becomes
//! `[2024-03-11T00:00Z, 2024-03-12T00:00Z)` regardless of the viewer's zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ListingError;

/// Identifier of a calendar month, displayed as `YYYY-MM`.
///
/// Ordering is chronological, and for years 0..=9999 the display form sorts
/// lexicographically in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthKey { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of this month.
    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> MonthKey {
        month_key(next_month(self.first_day()))
    }

    pub fn prev(&self) -> MonthKey {
        month_key(prev_month(self.first_day()))
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ListingError::Serialization(format!("Invalid month key '{s}'. Expected YYYY-MM"));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Trait for anything that falls on a calendar month.
pub trait HasMonth {
    fn month_key(&self) -> MonthKey;
}

impl HasMonth for NaiveDate {
    fn month_key(&self) -> MonthKey {
        MonthKey {
            year: self.year(),
            month: self.month(),
        }
    }
}

impl HasMonth for DateTime<Utc> {
    fn month_key(&self) -> MonthKey {
        self.date_naive().month_key()
    }
}

/// Month key of a date or UTC instant.
pub fn month_key(date: impl HasMonth) -> MonthKey {
    date.month_key()
}

/// A single-day slot: `start` is UTC midnight, `end` is the next UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// UTC midnight of the given calendar day.
pub fn utc_start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// UTC day slot for the given calendar day.
pub fn day_bounds_utc(date: NaiveDate) -> DayBounds {
    let start = utc_start_of_day(date);
    let end = utc_start_of_day(date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX));
    DayBounds { start, end }
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after `date`'s month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the month before `date`'s month.
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN)
}
