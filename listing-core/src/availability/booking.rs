//! Bookings, read-only from the editor's point of view.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ListingError, ListingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingState {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Delivered,
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingState::Pending => "pending",
            BookingState::Accepted => "accepted",
            BookingState::Declined => "declined",
            BookingState::Cancelled => "cancelled",
            BookingState::Delivered => "delivered",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for BookingState {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingState::Pending),
            "accepted" => Ok(BookingState::Accepted),
            "declined" => Ok(BookingState::Declined),
            "cancelled" => Ok(BookingState::Cancelled),
            "delivered" => Ok(BookingState::Delivered),
            other => Err(ListingError::InvalidBooking(format!(
                "unknown booking state '{other}'"
            ))),
        }
    }
}

/// A booking over the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBooking")]
pub struct Booking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub state: BookingState,
}

#[derive(Deserialize)]
struct RawBooking {
    id: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    state: BookingState,
}

impl TryFrom<RawBooking> for Booking {
    type Error = ListingError;

    fn try_from(raw: RawBooking) -> Result<Self, Self::Error> {
        let mut booking = Booking::new(raw.start, raw.end, raw.state)?;
        booking.id = raw.id;
        Ok(booking)
    }
}

impl Booking {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, state: BookingState) -> ListingResult<Self> {
        if end <= start {
            return Err(ListingError::InvalidBooking(format!(
                "end {end} is not after start {start}"
            )));
        }
        Ok(Booking {
            id: None,
            start,
            end,
            state,
        })
    }

    /// Start inclusive, end exclusive.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}
