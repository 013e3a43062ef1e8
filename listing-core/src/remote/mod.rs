//! Marketplace API seen by the listing editor.
//!
//! [`MarketplaceApi`] is the contract the editor depends on. [`Remote`]
//! implements it by forwarding each operation to a provider binary.

pub mod protocol;
pub mod provider;

use std::future::Future;
use std::path::PathBuf;

use crate::availability::{AvailabilityException, Booking, ExceptionId};
use crate::editor_config::EditorConfig;
use crate::error::ListingResult;
use crate::listing::{ImageId, Listing, ListingId, ListingUpdate, NewListing};
use crate::remote::protocol::{
    CreateException, CreateListingDraft, DeleteException, FetchBookings, FetchExceptions,
    PublishListingDraft, ShowListing, UpdateListing, UploadImage,
};
use crate::remote::provider::Provider;

/// Remote operations used by the editor.
///
/// Every returned future must be `Send` so calls can run on spawned tasks.
pub trait MarketplaceApi: Send + Sync + 'static {
    fn fetch_exceptions(
        &self,
        query: FetchExceptions,
    ) -> impl Future<Output = ListingResult<Vec<AvailabilityException>>> + Send;

    /// Fails if an exception already exists for the exact slot.
    fn create_exception(
        &self,
        params: CreateException,
    ) -> impl Future<Output = ListingResult<AvailabilityException>> + Send;

    fn delete_exception(&self, id: ExceptionId) -> impl Future<Output = ListingResult<()>> + Send;

    fn fetch_bookings(
        &self,
        query: FetchBookings,
    ) -> impl Future<Output = ListingResult<Vec<Booking>>> + Send;

    fn create_listing_draft(
        &self,
        listing: NewListing,
    ) -> impl Future<Output = ListingResult<Listing>> + Send;

    fn publish_listing_draft(
        &self,
        id: ListingId,
    ) -> impl Future<Output = ListingResult<Listing>> + Send;

    fn update_listing(
        &self,
        update: ListingUpdate,
    ) -> impl Future<Output = ListingResult<Listing>> + Send;

    fn show_listing(&self, id: ListingId) -> impl Future<Output = ListingResult<Listing>> + Send;

    fn upload_image(&self, file: PathBuf) -> impl Future<Output = ListingResult<ImageId>> + Send;
}

/// Marketplace reached through a provider binary.
#[derive(Debug, Clone)]
pub struct Remote {
    provider: Provider,
}

impl Remote {
    pub fn new(provider: Provider) -> Self {
        Remote { provider }
    }

    pub fn from_config(config: &EditorConfig) -> ListingResult<Self> {
        let provider = Provider::from_name(&config.provider).with_timeout(config.timeout()?);
        Ok(Remote::new(provider))
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}

impl MarketplaceApi for Remote {
    async fn fetch_exceptions(
        &self,
        query: FetchExceptions,
    ) -> ListingResult<Vec<AvailabilityException>> {
        self.provider.call(query).await
    }

    async fn create_exception(&self, params: CreateException) -> ListingResult<AvailabilityException> {
        self.provider.call(params).await
    }

    async fn delete_exception(&self, id: ExceptionId) -> ListingResult<()> {
        self.provider.call(DeleteException { id }).await
    }

    async fn fetch_bookings(&self, query: FetchBookings) -> ListingResult<Vec<Booking>> {
        self.provider.call(query).await
    }

    async fn create_listing_draft(&self, listing: NewListing) -> ListingResult<Listing> {
        self.provider.call(CreateListingDraft { listing }).await
    }

    async fn publish_listing_draft(&self, id: ListingId) -> ListingResult<Listing> {
        self.provider.call(PublishListingDraft { id }).await
    }

    async fn update_listing(&self, update: ListingUpdate) -> ListingResult<Listing> {
        self.provider.call(UpdateListing { update }).await
    }

    async fn show_listing(&self, id: ListingId) -> ListingResult<Listing> {
        self.provider.call(ShowListing { id }).await
    }

    async fn upload_image(&self, file: PathBuf) -> ListingResult<ImageId> {
        self.provider.call(UploadImage { file }).await
    }
}
