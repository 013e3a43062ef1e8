//! Page-level state of the listing editor and its transitions.
//!
//! Every remote request shows up here as a request action before the call
//! and as a success or error action once it resolves. `apply` takes the
//! state by value and returns the next one; the availability calendar is
//! only touched through the merge operations in [`crate::calendar`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::availability::{AvailabilityException, Booking, ExceptionRecord};
use crate::calendar::{Calendar, MonthBucket, add_exception, remove_exception, update_exception};
use crate::dates::MonthKey;
use crate::error::StorableError;
use crate::images::ImageDraft;
use crate::listing::{EditListingTab, ImageId, Listing, ListingId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishListingError {
    pub listing_id: Option<ListingId>,
    pub error: StorableError,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditListingState {
    pub create_listing_draft_in_progress: bool,
    pub create_listing_draft_error: Option<StorableError>,
    pub submitted_listing_id: Option<ListingId>,
    pub listing_draft: Option<Listing>,

    pub publishing_listing: Option<ListingId>,
    pub publish_listing_error: Option<PublishListingError>,
    pub redirect_to_listing: bool,

    pub update_in_progress: bool,
    pub update_listing_error: Option<StorableError>,
    pub updated_tab: Option<EditListingTab>,

    pub show_listings_error: Option<StorableError>,

    pub availability_calendar: Calendar,
    pub images: ImageDraft,
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MarkTabUpdated(EditListingTab),
    ClearUpdatedTab,

    CreateListingDraftRequest,
    CreateListingDraftSuccess(Listing),
    CreateListingDraftError(StorableError),

    PublishListingRequest(ListingId),
    PublishListingSuccess(Listing),
    PublishListingError(StorableError),

    UpdateListingRequest,
    UpdateListingSuccess,
    UpdateListingError(StorableError),

    ShowListingRequest,
    ShowListingSuccess(Listing),
    ShowListingError(StorableError),

    FetchBookingsRequest { month: MonthKey },
    FetchBookingsSuccess { month: MonthKey, bookings: Vec<Booking> },
    FetchBookingsError { month: MonthKey, error: StorableError },

    FetchExceptionsRequest { month: MonthKey },
    FetchExceptionsSuccess { month: MonthKey, exceptions: Vec<AvailabilityException> },
    FetchExceptionsError { month: MonthKey, error: StorableError },

    /// Optimistic draft for the slot; replaces whatever was there.
    CreateExceptionRequest { draft: AvailabilityException },
    CreateExceptionSuccess { exception: AvailabilityException },
    /// `exception` is what the slot should show alongside the error.
    CreateExceptionError { exception: AvailabilityException, error: StorableError },

    DeleteExceptionRequest { record: ExceptionRecord },
    DeleteExceptionSuccess { record: ExceptionRecord },
    DeleteExceptionError { exception: AvailabilityException, error: StorableError },

    UploadImageRequest { id: ImageId, file: PathBuf },
    UploadImageSuccess { id: ImageId, image_id: ImageId },
    UploadImageError { id: ImageId, error: StorableError },
    UpdateImageOrder(Vec<ImageId>),
    RemoveListingImage(ImageId),
}

impl EditListingState {
    pub fn new() -> Self {
        EditListingState::default()
    }

    pub fn apply(self, action: Action) -> Self {
        match action {
            Action::MarkTabUpdated(tab) => EditListingState {
                updated_tab: Some(tab),
                ..self
            },
            Action::ClearUpdatedTab => EditListingState {
                updated_tab: None,
                update_listing_error: None,
                ..self
            },

            Action::CreateListingDraftRequest => EditListingState {
                create_listing_draft_in_progress: true,
                create_listing_draft_error: None,
                submitted_listing_id: None,
                listing_draft: None,
                ..self
            },
            Action::CreateListingDraftSuccess(listing) => EditListingState {
                create_listing_draft_in_progress: false,
                submitted_listing_id: Some(listing.id.clone()),
                listing_draft: Some(listing),
                ..self
            },
            Action::CreateListingDraftError(error) => EditListingState {
                create_listing_draft_in_progress: false,
                create_listing_draft_error: Some(error),
                ..self
            },

            Action::PublishListingRequest(listing_id) => EditListingState {
                publishing_listing: Some(listing_id),
                publish_listing_error: None,
                ..self
            },
            Action::PublishListingSuccess(_) => EditListingState {
                redirect_to_listing: true,
                publishing_listing: None,
                ..self
            },
            Action::PublishListingError(error) => {
                let listing_id = self.publishing_listing.clone();
                EditListingState {
                    publishing_listing: None,
                    publish_listing_error: Some(PublishListingError { listing_id, error }),
                    ..self
                }
            }

            Action::UpdateListingRequest => EditListingState {
                update_in_progress: true,
                update_listing_error: None,
                ..self
            },
            Action::UpdateListingSuccess => EditListingState {
                update_in_progress: false,
                ..self
            },
            Action::UpdateListingError(error) => EditListingState {
                update_in_progress: false,
                update_listing_error: Some(error),
                ..self
            },

            Action::ShowListingRequest => EditListingState {
                show_listings_error: None,
                ..self
            },
            // The fresh listing lives in the entity cache; the page resets
            // but keeps whatever the calendar already knows.
            Action::ShowListingSuccess(_) => EditListingState {
                availability_calendar: self.availability_calendar,
                ..EditListingState::default()
            },
            Action::ShowListingError(error) => EditListingState {
                show_listings_error: Some(error),
                redirect_to_listing: false,
                ..self
            },

            Action::FetchBookingsRequest { month } => self.with_month(month, |bucket| MonthBucket {
                fetch_bookings_error: None,
                fetch_bookings_in_progress: true,
                ..bucket
            }),
            Action::FetchBookingsSuccess { month, bookings } => {
                self.with_month(month, |bucket| MonthBucket {
                    bookings,
                    fetch_bookings_in_progress: false,
                    ..bucket
                })
            }
            Action::FetchBookingsError { month, error } => self.with_month(month, |bucket| MonthBucket {
                fetch_bookings_error: Some(error),
                fetch_bookings_in_progress: false,
                ..bucket
            }),

            Action::FetchExceptionsRequest { month } => self.with_month(month, |bucket| MonthBucket {
                fetch_error: None,
                fetch_in_progress: true,
                ..bucket
            }),
            Action::FetchExceptionsSuccess { month, exceptions } => self.with_month(month, |bucket| {
                MonthBucket {
                    exceptions: refresh_exceptions(exceptions, bucket.exceptions),
                    fetch_in_progress: false,
                    ..bucket
                }
            }),
            Action::FetchExceptionsError { month, error } => self.with_month(month, |bucket| MonthBucket {
                fetch_error: Some(error),
                fetch_in_progress: false,
                ..bucket
            }),

            Action::CreateExceptionRequest { draft } => {
                let record = ExceptionRecord::pending(draft);
                self.with_calendar(|calendar| add_exception(record, calendar))
            }
            Action::CreateExceptionSuccess { exception } => {
                let record = ExceptionRecord::settled(exception);
                self.with_calendar(|calendar| update_exception(record, calendar))
            }
            Action::CreateExceptionError { exception, error } => {
                let record = ExceptionRecord::failed(exception, error);
                self.with_calendar(|calendar| update_exception(record, calendar))
            }

            Action::DeleteExceptionRequest { record } => {
                let record = ExceptionRecord::pending(record.availability_exception);
                self.with_calendar(|calendar| update_exception(record, calendar))
            }
            Action::DeleteExceptionSuccess { record } => {
                self.with_calendar(|calendar| remove_exception(&record, calendar))
            }
            Action::DeleteExceptionError { exception, error } => {
                let record = ExceptionRecord::failed(exception, error);
                self.with_calendar(|calendar| update_exception(record, calendar))
            }

            Action::UploadImageRequest { id, file } => self.with_images(|images| images.start_upload(id, file)),
            Action::UploadImageSuccess { id, image_id } => {
                self.with_images(|images| images.upload_succeeded(&id, image_id))
            }
            Action::UploadImageError { id, error } => {
                self.with_images(|images| images.upload_failed(&id, error))
            }
            Action::UpdateImageOrder(order) => self.with_images(|images| images.reorder(order)),
            Action::RemoveListingImage(id) => self.with_images(|images| images.remove(&id)),
        }
    }

    fn with_calendar(self, f: impl FnOnce(Calendar) -> Calendar) -> Self {
        EditListingState {
            availability_calendar: f(self.availability_calendar),
            ..self
        }
    }

    fn with_month(self, month: MonthKey, f: impl FnOnce(MonthBucket) -> MonthBucket) -> Self {
        self.with_calendar(|calendar| calendar.with_month(month, f))
    }

    fn with_images(self, f: impl FnOnce(ImageDraft) -> ImageDraft) -> Self {
        EditListingState {
            images: f(self.images),
            ..self
        }
    }
}

/// Fetched exceptions replace the month's records, except for slots with a
/// mutation in flight: those keep their pending record.
fn refresh_exceptions(
    fetched: Vec<AvailabilityException>,
    current: Vec<ExceptionRecord>,
) -> Vec<ExceptionRecord> {
    let pending: Vec<ExceptionRecord> = current.into_iter().filter(|r| r.in_progress).collect();
    let mut exceptions: Vec<ExceptionRecord> = fetched
        .into_iter()
        .map(ExceptionRecord::settled)
        .filter(|r| !pending.iter().any(|p| p.same_slot(r)))
        .collect();
    exceptions.extend(pending);
    exceptions
}
