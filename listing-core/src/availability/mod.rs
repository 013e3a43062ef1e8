//! Availability entities: the weekly plan, day exceptions and bookings.
//!
//! External data is validated here on the way in, so the calendar logic
//! downstream can rely on every exception covering exactly one UTC day and
//! every plan having one entry per weekday.

mod booking;
mod exception;
mod plan;

pub use booking::{Booking, BookingState};
pub use exception::{AvailabilityException, ExceptionId, ExceptionRecord};
pub use plan::{AvailabilityPlan, DayOfWeek, PLAN_TYPE_DAY, PlanEntry};
