//! Effective availability of a single calendar day.
//!
//! Combines the weekly plan, the month's exceptions and the month's bookings
//! into one answer per day. Nothing here mutates the calendar. A month that
//! has not been fetched yet reads as having no exceptions and no bookings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityPlan, Booking, ExceptionRecord};
use crate::calendar::Calendar;
use crate::dates::{month_key, utc_start_of_day};
use crate::error::StorableError;

/// True iff `date` is strictly before `today`.
pub fn is_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// True iff some booking's `[start, end)` contains the UTC start of `date`.
pub fn is_booked(bookings: &[Booking], date: NaiveDate) -> bool {
    let instant = utc_start_of_day(date);
    bookings.iter().any(|b| b.contains(instant))
}

/// The record whose exception starts exactly at the UTC start of `date`.
pub fn find_exception(exceptions: &[ExceptionRecord], date: NaiveDate) -> Option<&ExceptionRecord> {
    let start = utc_start_of_day(date);
    exceptions.iter().find(|e| e.start() == start)
}

/// Exception seats when the day has an exception, plan seats otherwise.
pub fn effective_seats(plan: &AvailabilityPlan, exceptions: &[ExceptionRecord], date: NaiveDate) -> u32 {
    find_exception(exceptions, date)
        .map(ExceptionRecord::seats)
        .unwrap_or_else(|| plan.seats_on(date))
}

pub fn is_blocked(plan: &AvailabilityPlan, exceptions: &[ExceptionRecord], date: NaiveDate) -> bool {
    effective_seats(plan, exceptions, date) == 0
}

pub fn is_in_progress(exceptions: &[ExceptionRecord], date: NaiveDate) -> bool {
    find_exception(exceptions, date).is_some_and(|e| e.in_progress)
}

pub fn has_error(exceptions: &[ExceptionRecord], date: NaiveDate) -> bool {
    find_exception(exceptions, date).is_some_and(|e| e.error.is_some())
}

/// Primary rendering class of a day, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    Past,
    Today,
    Blocked,
    Reserved,
    Error,
    Open,
}

/// Everything the calendar needs to render one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayState {
    pub date: NaiveDate,
    pub seats: u32,
    pub past: bool,
    pub today: bool,
    pub blocked: bool,
    pub booked: bool,
    pub in_progress: bool,
    pub error: Option<StorableError>,
}

impl DayState {
    pub fn derive(
        date: NaiveDate,
        today: NaiveDate,
        plan: &AvailabilityPlan,
        calendar: &Calendar,
    ) -> DayState {
        let bucket = calendar.month_or_empty(&month_key(date));
        let exceptions = bucket.exceptions.as_slice();
        let exception = find_exception(exceptions, date);
        let seats = effective_seats(plan, exceptions, date);

        DayState {
            date,
            seats,
            past: is_past(date, today),
            today: date == today,
            blocked: seats == 0,
            booked: is_booked(&bucket.bookings, date),
            in_progress: exception.is_some_and(|e| e.in_progress),
            error: exception.and_then(|e| e.error.clone()),
        }
    }

    pub fn class(&self) -> DayClass {
        if self.past {
            DayClass::Past
        } else if self.today {
            DayClass::Today
        } else if self.blocked {
            DayClass::Blocked
        } else if self.booked {
            DayClass::Reserved
        } else if self.error.is_some() {
            DayClass::Error
        } else {
            DayClass::Open
        }
    }

    /// All classes that apply, for renderers that layer them.
    pub fn classes(&self) -> Vec<DayClass> {
        [
            (self.past, DayClass::Past),
            (self.today, DayClass::Today),
            (self.blocked, DayClass::Blocked),
            (self.booked, DayClass::Reserved),
            (self.error.is_some(), DayClass::Error),
        ]
        .into_iter()
        .filter_map(|(applies, class)| applies.then_some(class))
        .collect()
    }

    /// Whether a spinner is shown next to the day's other classes.
    pub fn shows_spinner(&self) -> bool {
        self.in_progress
    }

    /// Blocking/unblocking is disabled on booked, past and in-flight days.
    pub fn is_toggleable(&self) -> bool {
        !(self.booked || self.past || self.in_progress)
    }
}
