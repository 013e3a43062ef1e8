//! Month-keyed availability calendar.
//!
//! The calendar is the single piece of shared state behind the availability
//! editor. It is only ever replaced as a whole: the merge operations in
//! [`merge`] take a calendar by value and hand back the next one.

mod merge;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::availability::{Booking, ExceptionRecord};
use crate::dates::MonthKey;
use crate::error::StorableError;

pub use merge::{add_exception, remove_exception, update_exception};

/// Everything known about one month of the calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub exceptions: Vec<ExceptionRecord>,
    pub bookings: Vec<Booking>,
    pub fetch_in_progress: bool,
    pub fetch_error: Option<StorableError>,
    pub fetch_bookings_in_progress: bool,
    pub fetch_bookings_error: Option<StorableError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    months: BTreeMap<MonthKey, MonthBucket>,
}

static EMPTY_BUCKET: MonthBucket = MonthBucket {
    exceptions: Vec::new(),
    bookings: Vec::new(),
    fetch_in_progress: false,
    fetch_error: None,
    fetch_bookings_in_progress: false,
    fetch_bookings_error: None,
};

impl Calendar {
    pub fn new() -> Self {
        Calendar::default()
    }

    pub fn month(&self, key: &MonthKey) -> Option<&MonthBucket> {
        self.months.get(key)
    }

    /// Bucket for `key`, or an empty one when the month was never fetched.
    pub fn month_or_empty(&self, key: &MonthKey) -> &MonthBucket {
        self.months.get(key).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn exceptions(&self, key: &MonthKey) -> &[ExceptionRecord] {
        &self.month_or_empty(key).exceptions
    }

    pub fn bookings(&self, key: &MonthKey) -> &[Booking] {
        &self.month_or_empty(key).bookings
    }

    pub fn contains_month(&self, key: &MonthKey) -> bool {
        self.months.contains_key(key)
    }

    pub fn months(&self) -> impl Iterator<Item = (&MonthKey, &MonthBucket)> {
        self.months.iter()
    }

    /// Replace the bucket for `key` with `f(bucket)`, creating it if needed.
    pub fn with_month(mut self, key: MonthKey, f: impl FnOnce(MonthBucket) -> MonthBucket) -> Self {
        let bucket = self.months.remove(&key).unwrap_or_default();
        self.months.insert(key, f(bucket));
        self
    }
}
