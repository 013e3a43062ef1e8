//! Day-level availability exceptions and their in-store records.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{DayBounds, day_bounds_utc};
use crate::error::{ListingError, ListingResult, StorableError};

/// Opaque identifier assigned by the remote when an exception is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExceptionId(pub String);

impl ExceptionId {
    pub fn new(id: impl Into<String>) -> Self {
        ExceptionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExceptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Override of the availability plan for exactly one calendar day.
///
/// `start` is a UTC midnight and `end` the following UTC midnight. Two
/// exceptions occupy the same slot iff both instants are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawException")]
pub struct AvailabilityException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ExceptionId>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub seats: u32,
}

#[derive(Deserialize)]
struct RawException {
    id: Option<ExceptionId>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    seats: u32,
}

impl TryFrom<RawException> for AvailabilityException {
    type Error = ListingError;

    fn try_from(raw: RawException) -> Result<Self, Self::Error> {
        AvailabilityException::new(raw.id, raw.start, raw.end, raw.seats)
    }
}

impl AvailabilityException {
    /// Validate an exception arriving from outside the editor.
    pub fn new(
        id: Option<ExceptionId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        seats: u32,
    ) -> ListingResult<Self> {
        if start.time() != NaiveTime::MIN {
            return Err(ListingError::InvalidException(format!(
                "start {start} is not a UTC day start"
            )));
        }
        let bounds = day_bounds_utc(start.date_naive());
        if end != bounds.end {
            return Err(ListingError::InvalidException(format!(
                "end {end} must be exactly one day after start {start}"
            )));
        }
        Ok(AvailabilityException {
            id,
            start,
            end,
            seats,
        })
    }

    /// Unpersisted exception for a slot.
    pub fn draft(bounds: DayBounds, seats: u32) -> Self {
        AvailabilityException {
            id: None,
            start: bounds.start,
            end: bounds.end,
            seats,
        }
    }

    /// Unpersisted exception for a calendar day.
    pub fn for_day(date: NaiveDate, seats: u32) -> Self {
        Self::draft(day_bounds_utc(date), seats)
    }

    pub fn slot(&self) -> DayBounds {
        DayBounds {
            start: self.start,
            end: self.end,
        }
    }

    pub fn same_slot(&self, other: &AvailabilityException) -> bool {
        self.start == other.start && self.end == other.end
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Store entry: an exception plus the transient UI state of its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub availability_exception: AvailabilityException,
    pub in_progress: bool,
    pub error: Option<StorableError>,
}

impl ExceptionRecord {
    /// Settled record, as returned by a fetch or a successful create.
    pub fn settled(availability_exception: AvailabilityException) -> Self {
        ExceptionRecord {
            availability_exception,
            in_progress: false,
            error: None,
        }
    }

    /// Optimistic record written before the remote call resolves.
    pub fn pending(availability_exception: AvailabilityException) -> Self {
        ExceptionRecord {
            availability_exception,
            in_progress: true,
            error: None,
        }
    }

    pub fn failed(availability_exception: AvailabilityException, error: StorableError) -> Self {
        ExceptionRecord {
            availability_exception,
            in_progress: false,
            error: Some(error),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.availability_exception.start
    }

    pub fn slot(&self) -> DayBounds {
        self.availability_exception.slot()
    }

    pub fn same_slot(&self, other: &ExceptionRecord) -> bool {
        self.availability_exception
            .same_slot(&other.availability_exception)
    }

    pub fn id(&self) -> Option<&ExceptionId> {
        self.availability_exception.id.as_ref()
    }

    pub fn seats(&self) -> u32 {
        self.availability_exception.seats
    }
}
