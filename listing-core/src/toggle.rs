//! Per-day exception mutation saga.
//!
//! The remote treats an exception as an immutable record for its slot, so
//! changing a day's seats means deleting the existing exception and maybe
//! creating a new one:
//!
//! ```text
//! no persisted exception            -> PendingCreate -> Done | Failed
//! exception, target == plan seats   -> PendingDelete -> Done | Failed
//! exception, target != plan seats   -> PendingDelete -> PendingCreate -> Done | Failed
//! ```
//!
//! The saga never talks to the remote itself. Each transition returns a
//! [`Step`]: the state actions to apply right away and, optionally, the
//! next remote call to issue. Completions are fed back with
//! [`ToggleSaga::on_delete_result`] and [`ToggleSaga::on_create_result`].

use chrono::NaiveDate;
use log::{debug, warn};
use thiserror::Error;

use crate::availability::{AvailabilityException, AvailabilityPlan, ExceptionId, ExceptionRecord};
use crate::calendar::Calendar;
use crate::dates::{DayBounds, day_bounds_utc, month_key};
use crate::day_state::{DayState, find_exception};
use crate::error::StorableError;
use crate::state::Action;

/// Why a toggle was refused before any remote call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRejected {
    #[error("Cannot change availability of a past day")]
    Past,

    #[error("Cannot change availability of a booked day")]
    Booked,

    #[error("Availability change already in progress for this day")]
    InProgress,

    #[error("Day already has the requested seats")]
    Unchanged,

    #[error("Listing has not been saved yet")]
    NoListing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Create { slot: DayBounds, seats: u32 },
    Delete { id: ExceptionId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    PendingDelete,
    PendingCreate,
    Done,
    Failed,
}

/// What to do after a saga transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    pub actions: Vec<Action>,
    pub call: Option<RemoteCall>,
}

impl Step {
    fn issue(action: Action, call: RemoteCall) -> Self {
        Step {
            actions: vec![action],
            call: Some(call),
        }
    }

    fn finish(action: Action) -> Self {
        Step {
            actions: vec![action],
            call: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleSaga {
    slot: DayBounds,
    target_seats: u32,
    plan_seats: u32,
    /// Record in the slot when the toggle started.
    original: Option<ExceptionRecord>,
    recreate_after_delete: bool,
    phase: TogglePhase,
}

impl ToggleSaga {
    /// Start a toggle of `date` to `target_seats`.
    ///
    /// Past, booked and in-flight days are rejected, as is a request that
    /// would not change the day's seats.
    pub fn begin(
        date: NaiveDate,
        target_seats: u32,
        today: NaiveDate,
        plan: &AvailabilityPlan,
        calendar: &Calendar,
    ) -> Result<(ToggleSaga, Step), ToggleRejected> {
        let day = DayState::derive(date, today, plan, calendar);
        if day.past {
            return Err(ToggleRejected::Past);
        }
        if day.booked {
            return Err(ToggleRejected::Booked);
        }
        if day.in_progress {
            return Err(ToggleRejected::InProgress);
        }
        if day.seats == target_seats {
            return Err(ToggleRejected::Unchanged);
        }

        let slot = day_bounds_utc(date);
        let plan_seats = plan.seats_on(date);
        let original = find_exception(calendar.exceptions(&month_key(date)), date).cloned();

        let mut saga = ToggleSaga {
            slot,
            target_seats,
            plan_seats,
            original: original.clone(),
            recreate_after_delete: false,
            phase: TogglePhase::PendingCreate,
        };

        let step = match original.as_ref().and_then(|r| r.id().cloned().map(|id| (r, id))) {
            Some((record, id)) => {
                saga.phase = TogglePhase::PendingDelete;
                saga.recreate_after_delete = target_seats != plan_seats;
                debug!(
                    "Toggle {date}: delete exception {id} (recreate: {})",
                    saga.recreate_after_delete
                );
                Step::issue(
                    Action::DeleteExceptionRequest {
                        record: record.clone(),
                    },
                    RemoteCall::Delete { id },
                )
            }
            None => {
                debug!("Toggle {date}: create exception with {target_seats} seats");
                saga.create_step()
            }
        };

        Ok((saga, step))
    }

    pub fn slot(&self) -> DayBounds {
        self.slot
    }

    pub fn phase(&self) -> TogglePhase {
        self.phase
    }

    pub fn target_seats(&self) -> u32 {
        self.target_seats
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, TogglePhase::Done | TogglePhase::Failed)
    }

    /// Feed the outcome of the delete call.
    pub fn on_delete_result(&mut self, result: Result<(), StorableError>) -> Step {
        if self.phase != TogglePhase::PendingDelete {
            warn!("Ignoring delete completion for {} in phase {:?}", self.slot.start, self.phase);
            return Step::default();
        }
        let Some(original) = self.original.clone() else {
            // PendingDelete is only entered with a persisted original
            self.phase = TogglePhase::Failed;
            return Step::default();
        };

        match result {
            Ok(()) => {
                let mut step = Step {
                    actions: vec![Action::DeleteExceptionSuccess { record: original }],
                    call: None,
                };
                if self.recreate_after_delete {
                    let create = self.create_step();
                    step.actions.extend(create.actions);
                    step.call = create.call;
                } else {
                    self.phase = TogglePhase::Done;
                }
                step
            }
            Err(error) => {
                warn!("Deleting exception at {} failed: {error}", self.slot.start);
                self.phase = TogglePhase::Failed;
                Step::finish(Action::DeleteExceptionError {
                    exception: original.availability_exception,
                    error,
                })
            }
        }
    }

    /// Feed the outcome of the create call.
    pub fn on_create_result(&mut self, result: Result<AvailabilityException, StorableError>) -> Step {
        if self.phase != TogglePhase::PendingCreate {
            warn!("Ignoring create completion for {} in phase {:?}", self.slot.start, self.phase);
            return Step::default();
        }

        match result {
            Ok(exception) => {
                self.phase = TogglePhase::Done;
                Step::finish(Action::CreateExceptionSuccess { exception })
            }
            Err(error) => {
                warn!("Creating exception at {} failed: {error}", self.slot.start);
                self.phase = TogglePhase::Failed;
                // Nothing is persisted for the slot any more, so it shows
                // plan seats alongside the error.
                Step::finish(Action::CreateExceptionError {
                    exception: AvailabilityException::draft(self.slot, self.plan_seats),
                    error,
                })
            }
        }
    }

    fn create_step(&mut self) -> Step {
        self.phase = TogglePhase::PendingCreate;
        Step::issue(
            Action::CreateExceptionRequest {
                draft: AvailabilityException::draft(self.slot, self.target_seats),
            },
            RemoteCall::Create {
                slot: self.slot,
                seats: self.target_seats,
            },
        )
    }
}
