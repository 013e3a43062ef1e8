//! Editor page coordinator.
//!
//! [`EditListingPage`] owns the page state. User intents dispatch request
//! actions right away and start remote calls on spawned tasks. Every call
//! reports back through one completion queue, and completions are applied
//! one at a time by [`EditListingPage::next_completion`], so state changes
//! never race even when calls resolve out of order.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use listing_core::availability::{AvailabilityException, AvailabilityPlan, Booking, BookingState};
use listing_core::dates::{MonthKey, day_bounds_utc, month_key, utc_start_of_day};
use listing_core::day_state::{DayState, find_exception};
use listing_core::editor_config::EditorConfig;
use listing_core::images::ImageDraft;
use listing_core::listing::{EditListingTab, ImageId, Listing, ListingId, ListingUpdate, NewListing};
use listing_core::remote::MarketplaceApi;
use listing_core::remote::protocol::{CreateException, FetchBookings, FetchExceptions};
use listing_core::state::{Action, EditListingState};
use listing_core::toggle::{RemoteCall, Step, ToggleRejected, ToggleSaga};
use listing_core::{ListingError, ListingResult, StorableError};

/// Calendar navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// What the page is opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadParams {
    /// A listing that does not exist yet. Nothing is fetched.
    New,
    Draft(ListingId),
    Edit(ListingId),
}

/// A resolved remote call, waiting to be applied.
#[derive(Debug)]
enum Completion {
    Exceptions {
        month: MonthKey,
        result: ListingResult<Vec<AvailabilityException>>,
    },
    Bookings {
        month: MonthKey,
        result: ListingResult<Vec<Booking>>,
    },
    CreateException {
        slot: DateTime<Utc>,
        result: ListingResult<AvailabilityException>,
    },
    DeleteException {
        slot: DateTime<Utc>,
        result: ListingResult<()>,
    },
    ListingDraft(ListingResult<Listing>),
    Publish(ListingResult<Listing>),
    Update {
        tab: EditListingTab,
        id: ListingId,
        result: ListingResult<Listing>,
    },
    Show {
        /// Set when the show refreshes a listing after a tab update.
        updated_tab: Option<EditListingTab>,
        result: ListingResult<Listing>,
    },
    Upload {
        id: ImageId,
        result: ListingResult<ImageId>,
    },
}

/// A toggle saga and the listing it mutates.
#[derive(Debug)]
struct ActiveToggle {
    listing_id: ListingId,
    saga: ToggleSaga,
}

pub struct EditListingPage<A: MarketplaceApi> {
    api: Arc<A>,
    state: EditListingState,
    listing_id: Option<ListingId>,
    default_plan: AvailabilityPlan,
    plan: AvailabilityPlan,
    booking_states: Vec<BookingState>,
    today: NaiveDate,
    current_month: MonthKey,
    toggles: HashMap<DateTime<Utc>, ActiveToggle>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<A: MarketplaceApi> EditListingPage<A> {
    /// Page with the default configuration, viewed on `today`.
    pub fn new(api: A, today: NaiveDate) -> Self {
        let config = EditorConfig::default();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let default_plan = config.default_plan();

        EditListingPage {
            api: Arc::new(api),
            state: EditListingState::new(),
            listing_id: None,
            plan: default_plan.clone(),
            default_plan,
            booking_states: config.booking_states,
            today,
            current_month: month_key(today),
            toggles: HashMap::new(),
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn from_config(api: A, config: &EditorConfig) -> ListingResult<Self> {
        let today = config.today()?;
        Ok(EditListingPage::new(api, today)
            .with_default_plan(config.default_plan())
            .with_booking_states(config.booking_states.clone()))
    }

    /// Plan used while the listing has none of its own.
    pub fn with_default_plan(mut self, plan: AvailabilityPlan) -> Self {
        self.plan = plan.clone();
        self.default_plan = plan;
        self
    }

    pub fn with_booking_states(mut self, states: Vec<BookingState>) -> Self {
        self.booking_states = states;
        self
    }

    pub fn with_listing(mut self, listing_id: ListingId) -> Self {
        self.listing_id = Some(listing_id);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &EditListingState {
        &self.state
    }

    pub fn images(&self) -> &ImageDraft {
        &self.state.images
    }

    pub fn listing_id(&self) -> Option<&ListingId> {
        self.listing_id.as_ref()
    }

    pub fn plan(&self) -> &AvailabilityPlan {
        &self.plan
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> MonthKey {
        self.current_month
    }

    /// Number of remote calls whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn day_state(&self, date: NaiveDate) -> DayState {
        DayState::derive(date, self.today, &self.plan, &self.state.availability_calendar)
    }

    // ========================================================================
    // Event queue
    // ========================================================================

    /// Wait for one remote call to resolve and apply it.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let Some(completion) = self.completions_rx.recv().await else {
            return false;
        };
        self.in_flight -= 1;
        self.handle(completion);
        true
    }

    /// Apply completions until no remote call is in flight, including calls
    /// started by the completions themselves.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn dispatch(&mut self, action: Action) {
        self.state = std::mem::take(&mut self.state).apply(action);
    }

    /// Run a remote call on its own task and queue `wrap(result)`.
    ///
    /// A call that panics still produces a completion, carrying an error,
    /// so `in_flight` always drains.
    fn spawn<T, F, W>(&mut self, call: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = ListingResult<T>> + Send + 'static,
        W: FnOnce(ListingResult<T>) -> Completion + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::spawn(call).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Remote call aborted: {e}");
                    Err(ListingError::Provider(format!("Remote call aborted: {e}")))
                }
            };
            // The receiver lives as long as the page
            let _ = tx.send(wrap(result));
        });
    }

    fn handle(&mut self, completion: Completion) {
        match completion {
            Completion::Exceptions { month, result } => match result {
                Ok(exceptions) => {
                    debug!("Fetched {} exceptions for {month}", exceptions.len());
                    self.dispatch(Action::FetchExceptionsSuccess { month, exceptions });
                }
                Err(e) => {
                    warn!("Fetching exceptions for {month} failed: {e}");
                    self.dispatch(Action::FetchExceptionsError {
                        month,
                        error: StorableError::from(e),
                    });
                }
            },
            Completion::Bookings { month, result } => match result {
                Ok(bookings) => {
                    debug!("Fetched {} bookings for {month}", bookings.len());
                    self.dispatch(Action::FetchBookingsSuccess { month, bookings });
                }
                Err(e) => {
                    warn!("Fetching bookings for {month} failed: {e}");
                    self.dispatch(Action::FetchBookingsError {
                        month,
                        error: StorableError::from(e),
                    });
                }
            },
            Completion::CreateException { slot, result } => {
                let result = result.map_err(StorableError::from);
                match self.toggles.get_mut(&slot) {
                    Some(active) => {
                        let step = active.saga.on_create_result(result);
                        self.run_toggle_step(slot, step);
                    }
                    None => self.apply_untracked_create(slot, result),
                }
            }
            Completion::DeleteException { slot, result } => {
                let result = result.map_err(StorableError::from);
                match self.toggles.get_mut(&slot) {
                    Some(active) => {
                        let step = active.saga.on_delete_result(result);
                        self.run_toggle_step(slot, step);
                    }
                    None => self.apply_untracked_delete(slot, result),
                }
            }
            Completion::ListingDraft(result) => match result {
                Ok(listing) => {
                    info!("Created listing draft {}", listing.id);
                    self.adopt_listing(&listing);
                    self.dispatch(Action::CreateListingDraftSuccess(listing));
                }
                Err(e) => {
                    error!("create-listing-draft failed: {e}");
                    self.dispatch(Action::CreateListingDraftError(StorableError::from(e)));
                }
            },
            Completion::Publish(result) => match result {
                Ok(listing) => {
                    info!("Published listing {}", listing.id);
                    self.adopt_listing(&listing);
                    self.dispatch(Action::PublishListingSuccess(listing));
                }
                Err(e) => {
                    warn!("Publishing listing failed: {e}");
                    self.dispatch(Action::PublishListingError(StorableError::from(e)));
                }
            },
            Completion::Update { tab, id, result } => match result {
                Ok(_) => {
                    info!("Updated listing {id} ({tab:?})");
                    self.request_show(id, Some(tab));
                }
                Err(e) => {
                    error!("update-listing failed for {id}: {e}");
                    self.dispatch(Action::UpdateListingError(StorableError::from(e)));
                }
            },
            Completion::Show { updated_tab, result } => {
                match result {
                    Ok(listing) => {
                        self.adopt_listing(&listing);
                        self.dispatch(Action::ShowListingSuccess(listing));
                    }
                    Err(e) => {
                        warn!("Showing listing failed: {e}");
                        self.dispatch(Action::ShowListingError(StorableError::from(e)));
                    }
                }
                // The update itself went through even if the refresh did not
                if let Some(tab) = updated_tab {
                    self.dispatch(Action::MarkTabUpdated(tab));
                    self.dispatch(Action::UpdateListingSuccess);
                }
            }
            Completion::Upload { id, result } => match result {
                Ok(image_id) => {
                    debug!("Uploaded image {id} as {image_id}");
                    self.dispatch(Action::UploadImageSuccess { id, image_id });
                }
                Err(e) => {
                    warn!("Uploading image {id} failed: {e}");
                    self.dispatch(Action::UploadImageError {
                        id,
                        error: StorableError::from(e),
                    });
                }
            },
        }
    }

    /// A create result with no saga left to receive it still lands on the
    /// slot's record.
    fn apply_untracked_create(
        &mut self,
        slot: DateTime<Utc>,
        result: Result<AvailabilityException, StorableError>,
    ) {
        warn!("Create completion for {slot} without an active toggle");
        match result {
            Ok(exception) => self.dispatch(Action::CreateExceptionSuccess { exception }),
            Err(error) => {
                let date = slot.date_naive();
                let exception =
                    AvailabilityException::draft(day_bounds_utc(date), self.plan.seats_on(date));
                self.dispatch(Action::CreateExceptionError { exception, error });
            }
        }
    }

    fn apply_untracked_delete(&mut self, slot: DateTime<Utc>, result: Result<(), StorableError>) {
        warn!("Delete completion for {slot} without an active toggle");
        let exceptions = self.state.availability_calendar.exceptions(&month_key(slot));
        let Some(record) = find_exception(exceptions, slot.date_naive()).cloned() else {
            return;
        };
        match result {
            Ok(()) => self.dispatch(Action::DeleteExceptionSuccess { record }),
            Err(error) => self.dispatch(Action::DeleteExceptionError {
                exception: record.availability_exception,
                error,
            }),
        }
    }

    fn adopt_listing(&mut self, listing: &Listing) {
        self.listing_id = Some(listing.id.clone());
        self.plan = listing.availability_plan_or(&self.default_plan);
    }

    // ========================================================================
    // Availability calendar
    // ========================================================================

    /// Fetch the current and the next month.
    pub fn mount(&mut self) {
        let current = self.current_month;
        self.fetch_month_data(current);
        self.fetch_month_data(current.next());
    }

    /// Fetch exceptions and bookings of one month. Months before the current
    /// one are skipped, and the current month is fetched from today onwards.
    pub fn fetch_month_data(&mut self, month: MonthKey) {
        if month < month_key(self.today) {
            debug!("Skipping fetch for past month {month}");
            return;
        }
        let Some(listing_id) = self.listing_id.clone() else {
            warn!("Skipping fetch for {month}: listing has no id yet");
            return;
        };

        let first_day = month.first_day();
        let start = utc_start_of_day(first_day.max(self.today));
        let end = utc_start_of_day(month.next().first_day());

        self.dispatch(Action::FetchExceptionsRequest { month });
        let api = Arc::clone(&self.api);
        let query = FetchExceptions {
            listing_id: listing_id.clone(),
            start,
            end,
        };
        self.spawn(async move { api.fetch_exceptions(query).await }, move |result| {
            Completion::Exceptions { month, result }
        });

        self.dispatch(Action::FetchBookingsRequest { month });
        let api = Arc::clone(&self.api);
        let query = FetchBookings {
            listing_id,
            start,
            end,
            states: self.booking_states.clone(),
        };
        self.spawn(async move { api.fetch_bookings(query).await }, move |result| {
            Completion::Bookings { month, result }
        });
    }

    /// Move the calendar one month and prefetch the month after it in the
    /// same direction.
    pub fn navigate(&mut self, direction: Direction) -> MonthKey {
        let (current, prefetch) = match direction {
            Direction::Next => {
                let current = self.current_month.next();
                (current, current.next())
            }
            Direction::Prev => {
                let current = self.current_month.prev();
                (current, current.prev())
            }
        };
        self.current_month = current;
        self.fetch_month_data(prefetch);
        current
    }

    /// Flip a day between blocked and available.
    ///
    /// A blocked day gets its plan seats back, or one seat when the plan
    /// itself has no seats on that weekday. An available day is blocked.
    pub fn click_date(&mut self, date: NaiveDate) -> Result<(), ToggleRejected> {
        let day = self.day_state(date);
        let target = if day.blocked {
            self.plan.seats_on(date).max(1)
        } else {
            0
        };
        self.set_day_seats(date, target)
    }

    /// Change the seats of a single day.
    pub fn set_day_seats(&mut self, date: NaiveDate, seats: u32) -> Result<(), ToggleRejected> {
        let listing_id = self.listing_id.clone().ok_or(ToggleRejected::NoListing)?;
        if self.toggles.contains_key(&day_bounds_utc(date).start) {
            return Err(ToggleRejected::InProgress);
        }
        let (saga, step) = ToggleSaga::begin(
            date,
            seats,
            self.today,
            &self.plan,
            &self.state.availability_calendar,
        )?;

        let slot = saga.slot().start;
        self.toggles.insert(slot, ActiveToggle { listing_id, saga });
        self.run_toggle_step(slot, step);
        Ok(())
    }

    fn run_toggle_step(&mut self, slot: DateTime<Utc>, step: Step) {
        for action in step.actions {
            self.dispatch(action);
        }

        let Some(active) = self.toggles.get(&slot) else {
            return;
        };
        if active.saga.is_finished() {
            debug!("Toggle at {slot} finished in {:?}", active.saga.phase());
            self.toggles.remove(&slot);
            return;
        }

        let listing_id = active.listing_id.clone();
        if let Some(call) = step.call {
            self.issue(slot, listing_id, call);
        }
    }

    fn issue(&mut self, slot: DateTime<Utc>, listing_id: ListingId, call: RemoteCall) {
        let api = Arc::clone(&self.api);
        match call {
            RemoteCall::Create { slot: bounds, seats } => {
                debug!("Creating exception at {} with {seats} seats", bounds.start);
                let params = CreateException {
                    listing_id,
                    start: bounds.start,
                    end: bounds.end,
                    seats,
                };
                self.spawn(async move { api.create_exception(params).await }, move |result| {
                    Completion::CreateException { slot, result }
                });
            }
            RemoteCall::Delete { id } => {
                debug!("Deleting exception {id} at {slot}");
                self.spawn(async move { api.delete_exception(id).await }, move |result| {
                    Completion::DeleteException { slot, result }
                });
            }
        }
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Prepare the page for a wizard tab.
    pub fn load_data(&mut self, params: LoadParams) {
        self.dispatch(Action::ClearUpdatedTab);
        match params {
            LoadParams::New => {}
            LoadParams::Draft(id) | LoadParams::Edit(id) => {
                self.listing_id = Some(id.clone());
                self.show_listing(id);
            }
        }
    }

    pub fn create_listing_draft(&mut self, listing: NewListing) {
        self.dispatch(Action::CreateListingDraftRequest);
        let api = Arc::clone(&self.api);
        self.spawn(
            async move { api.create_listing_draft(listing).await },
            Completion::ListingDraft,
        );
    }

    pub fn publish_listing_draft(&mut self, id: ListingId) {
        self.dispatch(Action::PublishListingRequest(id.clone()));
        let api = Arc::clone(&self.api);
        self.spawn(async move { api.publish_listing_draft(id).await }, Completion::Publish);
    }

    /// Save one wizard tab: update the listing, fetch it again, then mark
    /// the tab updated.
    pub fn update_listing(&mut self, tab: EditListingTab, update: ListingUpdate) {
        self.dispatch(Action::UpdateListingRequest);
        let id = update.id.clone();
        let api = Arc::clone(&self.api);
        self.spawn(async move { api.update_listing(update).await }, move |result| {
            Completion::Update { tab, id, result }
        });
    }

    pub fn show_listing(&mut self, id: ListingId) {
        self.request_show(id, None);
    }

    fn request_show(&mut self, id: ListingId, updated_tab: Option<EditListingTab>) {
        self.dispatch(Action::ShowListingRequest);
        let api = Arc::clone(&self.api);
        self.spawn(async move { api.show_listing(id).await }, move |result| {
            Completion::Show { updated_tab, result }
        });
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Start uploading a file. Returns the placeholder id that holds the
    /// image's place in the order until the upload resolves.
    pub fn upload_image(&mut self, file: PathBuf) -> ImageId {
        let id = ImageId::new(Uuid::new_v4().to_string());
        self.dispatch(Action::UploadImageRequest {
            id: id.clone(),
            file: file.clone(),
        });

        let api = Arc::clone(&self.api);
        let placeholder = id.clone();
        self.spawn(async move { api.upload_image(file).await }, move |result| {
            Completion::Upload {
                id: placeholder,
                result,
            }
        });
        id
    }

    pub fn update_image_order(&mut self, order: Vec<ImageId>) {
        self.dispatch(Action::UpdateImageOrder(order));
    }

    pub fn remove_image(&mut self, id: ImageId) {
        self.dispatch(Action::RemoveListingImage(id));
    }
}
