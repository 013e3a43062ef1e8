//! Slot-keyed merge operations over the calendar.
//!
//! A slot is the `(start, end)` pair of an exception. Each operation touches
//! only the month of its record's slot, and only records in that slot.

use crate::availability::ExceptionRecord;
use crate::calendar::Calendar;
use crate::dates::month_key;

/// Drop any record occupying `record`'s slot.
///
/// An unknown month ends up as an empty bucket.
pub fn remove_exception(record: &ExceptionRecord, calendar: Calendar) -> Calendar {
    let key = month_key(record.start());
    calendar.with_month(key, |mut bucket| {
        bucket.exceptions.retain(|e| !e.same_slot(record));
        bucket
    })
}

/// Insert `record`, replacing whatever occupied its slot.
///
/// The replacement goes to the end of the month's list.
pub fn add_exception(record: ExceptionRecord, calendar: Calendar) -> Calendar {
    let key = month_key(record.start());
    let calendar = remove_exception(&record, calendar);
    calendar.with_month(key, |mut bucket| {
        bucket.exceptions.push(record);
        bucket
    })
}

/// Replace the record in `record`'s slot, keeping its position.
///
/// When the slot holds no record the calendar comes back unchanged: updates
/// for slots that were never added are dropped, not inserted.
pub fn update_exception(record: ExceptionRecord, calendar: Calendar) -> Calendar {
    let key = month_key(record.start());
    let has_slot = calendar
        .month(&key)
        .is_some_and(|bucket| bucket.exceptions.iter().any(|e| e.same_slot(&record)));

    if !has_slot {
        return calendar;
    }

    calendar.with_month(key, |mut bucket| {
        for existing in bucket.exceptions.iter_mut().filter(|e| e.same_slot(&record)) {
            *existing = record.clone();
        }
        bucket
    })
}
