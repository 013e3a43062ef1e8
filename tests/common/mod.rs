#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::NaiveDate;
use listing_core::availability::{AvailabilityException, Booking, ExceptionId};
use listing_core::dates::day_bounds_utc;
use listing_core::listing::{ImageId, Listing, ListingId, ListingState, ListingUpdate, NewListing};
use listing_core::remote::protocol::{Command, CreateException, FetchBookings, FetchExceptions};
use listing_core::{ListingError, ListingResult, MarketplaceApi};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn listing(id: &str) -> Listing {
    Listing {
        id: ListingId::new(id),
        title: "Sauna by the lake".to_string(),
        description: None,
        state: ListingState::Draft,
        availability_plan: None,
        images: vec![],
        public_data: serde_json::Map::new(),
    }
}

#[derive(Default)]
struct Inner {
    exceptions: Vec<AvailabilityException>,
    bookings: Vec<Booking>,
    listings: HashMap<ListingId, Listing>,
    calls: Vec<Command>,
    created: Vec<CreateException>,
    deleted: Vec<ExceptionId>,
    exception_queries: Vec<FetchExceptions>,
    booking_queries: Vec<FetchBookings>,
    failures: HashMap<Command, Option<u16>>,
    delays: HashMap<Command, Duration>,
    panics: HashSet<Command>,
    next_id: u32,
}

/// In-memory marketplace that records every call.
#[derive(Clone, Default)]
pub struct FakeMarketplace {
    inner: Arc<Mutex<Inner>>,
}

impl FakeMarketplace {
    pub fn new() -> Self {
        FakeMarketplace::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn with_listing(self, listing: Listing) -> Self {
        self.lock().listings.insert(listing.id.clone(), listing);
        self
    }

    /// Store a persisted exception and return its id.
    pub fn with_exception(self, date: NaiveDate, seats: u32) -> (Self, ExceptionId) {
        let id = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = ExceptionId::new(format!("exc-{}", inner.next_id));
            let mut exception = AvailabilityException::draft(day_bounds_utc(date), seats);
            exception.id = Some(id.clone());
            inner.exceptions.push(exception);
            id
        };
        (self, id)
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.lock().bookings.push(booking);
        self
    }

    /// Make every call of `command` fail with the given status.
    pub fn fail(&self, command: Command, status: Option<u16>) {
        self.lock().failures.insert(command, status);
    }

    pub fn recover(&self, command: Command) {
        self.lock().failures.remove(&command);
    }

    /// Hold every call of `command` for `delay` before answering.
    pub fn delay(&self, command: Command, delay: Duration) {
        self.lock().delays.insert(command, delay);
    }

    /// Make every call of `command` panic inside the provider.
    pub fn panic_on(&self, command: Command) {
        self.lock().panics.insert(command);
    }

    pub fn calls(&self) -> Vec<Command> {
        self.lock().calls.clone()
    }

    pub fn count(&self, command: Command) -> usize {
        self.lock().calls.iter().filter(|c| **c == command).count()
    }

    pub fn created(&self) -> Vec<CreateException> {
        self.lock().created.clone()
    }

    pub fn deleted(&self) -> Vec<ExceptionId> {
        self.lock().deleted.clone()
    }

    pub fn exception_queries(&self) -> Vec<FetchExceptions> {
        self.lock().exception_queries.clone()
    }

    pub fn booking_queries(&self) -> Vec<FetchBookings> {
        self.lock().booking_queries.clone()
    }

    pub fn stored_exceptions(&self) -> Vec<AvailabilityException> {
        self.lock().exceptions.clone()
    }

    /// Record the call and report whether it should fail.
    async fn enter(&self, command: Command) -> ListingResult<()> {
        let (delay, failure, panics) = {
            let mut inner = self.lock();
            inner.calls.push(command);
            (
                inner.delays.get(&command).copied(),
                inner.failures.get(&command).copied(),
                inner.panics.contains(&command),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if panics {
            panic!("{command:?} crashed");
        }
        match failure {
            Some(status) => Err(ListingError::remote(status, format!("{command:?} failed"))),
            None => Ok(()),
        }
    }

    fn listing(&self, id: &ListingId) -> ListingResult<Listing> {
        self.lock()
            .listings
            .get(id)
            .cloned()
            .ok_or_else(|| ListingError::ListingNotFound(id.to_string()))
    }
}

impl MarketplaceApi for FakeMarketplace {
    async fn fetch_exceptions(&self, query: FetchExceptions) -> ListingResult<Vec<AvailabilityException>> {
        self.lock().exception_queries.push(query.clone());
        self.enter(Command::FetchExceptions).await?;
        Ok(self
            .lock()
            .exceptions
            .iter()
            .filter(|e| query.start <= e.start && e.start < query.end)
            .cloned()
            .collect())
    }

    async fn create_exception(&self, params: CreateException) -> ListingResult<AvailabilityException> {
        self.lock().created.push(params.clone());
        self.enter(Command::CreateException).await?;

        let mut inner = self.lock();
        if inner.exceptions.iter().any(|e| e.start == params.start) {
            return Err(ListingError::remote(Some(409), "exception exists for slot"));
        }
        inner.next_id += 1;
        let id = ExceptionId::new(format!("exc-{}", inner.next_id));
        let exception =
            AvailabilityException::new(Some(id), params.start, params.end, params.seats)?;
        inner.exceptions.push(exception.clone());
        Ok(exception)
    }

    async fn delete_exception(&self, id: ExceptionId) -> ListingResult<()> {
        self.lock().deleted.push(id.clone());
        self.enter(Command::DeleteException).await?;

        let mut inner = self.lock();
        let before = inner.exceptions.len();
        inner.exceptions.retain(|e| e.id.as_ref() != Some(&id));
        if inner.exceptions.len() == before {
            return Err(ListingError::remote(Some(404), format!("no exception {id}")));
        }
        Ok(())
    }

    async fn fetch_bookings(&self, query: FetchBookings) -> ListingResult<Vec<Booking>> {
        self.lock().booking_queries.push(query.clone());
        self.enter(Command::FetchBookings).await?;
        Ok(self
            .lock()
            .bookings
            .iter()
            .filter(|b| b.start < query.end && query.start < b.end)
            .filter(|b| query.states.contains(&b.state))
            .cloned()
            .collect())
    }

    async fn create_listing_draft(&self, new: NewListing) -> ListingResult<Listing> {
        self.enter(Command::CreateListingDraft).await?;
        let mut inner = self.lock();
        inner.next_id += 1;
        let created = Listing {
            id: ListingId::new(format!("listing-{}", inner.next_id)),
            title: new.title,
            description: new.description,
            state: ListingState::Draft,
            availability_plan: None,
            images: new.images,
            public_data: new.public_data,
        };
        inner.listings.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn publish_listing_draft(&self, id: ListingId) -> ListingResult<Listing> {
        self.enter(Command::PublishListingDraft).await?;
        let mut published = self.listing(&id)?;
        published.state = ListingState::PendingApproval;
        self.lock().listings.insert(id, published.clone());
        Ok(published)
    }

    async fn update_listing(&self, update: ListingUpdate) -> ListingResult<Listing> {
        self.enter(Command::UpdateListing).await?;
        let mut updated = self.listing(&update.id)?;
        if let Some(title) = update.title {
            updated.title = title;
        }
        if let Some(description) = update.description {
            updated.description = Some(description);
        }
        if let Some(plan) = update.availability_plan {
            updated.availability_plan = Some(plan);
        }
        if let Some(images) = update.images {
            updated.images = images;
        }
        updated.public_data.extend(update.public_data);
        self.lock().listings.insert(update.id, updated.clone());
        Ok(updated)
    }

    async fn show_listing(&self, id: ListingId) -> ListingResult<Listing> {
        self.enter(Command::ShowListing).await?;
        self.listing(&id)
    }

    async fn upload_image(&self, file: PathBuf) -> ListingResult<ImageId> {
        self.enter(Command::UploadImage).await?;
        let name = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| ListingError::ImageNotFound(file.display().to_string()))?;
        Ok(ImageId::new(format!("img-{name}")))
    }
}
