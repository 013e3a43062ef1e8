//! Defines the JSON protocol spoken between the editor and provider
//! binaries over stdin/stdout.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::availability::{AvailabilityException, Booking, BookingState, ExceptionId};
use crate::listing::{ImageId, Listing, ListingId, ListingUpdate, NewListing};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    FetchExceptions,
    CreateException,
    DeleteException,
    FetchBookings,
    CreateListingDraft,
    PublishListingDraft,
    UpdateListing,
    ShowListing,
    UploadImage,
}

/// Request sent from the editor to the provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from the provider to the editor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success {
        data: T,
    },
    Error {
        error: String,
        /// Status reported by the marketplace API, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

// ============================================================================
// Availability exceptions
// ============================================================================

/// Exceptions of a listing within `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchExceptions {
    pub listing_id: ListingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ProviderCommand for FetchExceptions {
    type Response = Vec<AvailabilityException>;
    fn command() -> Command {
        Command::FetchExceptions
    }
}

/// Create an exception. Fails if one already exists for the exact slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateException {
    pub listing_id: ListingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub seats: u32,
}

impl ProviderCommand for CreateException {
    type Response = AvailabilityException;
    fn command() -> Command {
        Command::CreateException
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteException {
    pub id: ExceptionId,
}

impl ProviderCommand for DeleteException {
    type Response = ();
    fn command() -> Command {
        Command::DeleteException
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchBookings {
    pub listing_id: ListingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub states: Vec<BookingState>,
}

impl ProviderCommand for FetchBookings {
    type Response = Vec<Booking>;
    fn command() -> Command {
        Command::FetchBookings
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListingDraft {
    pub listing: NewListing,
}

impl ProviderCommand for CreateListingDraft {
    type Response = Listing;
    fn command() -> Command {
        Command::CreateListingDraft
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishListingDraft {
    pub id: ListingId,
}

impl ProviderCommand for PublishListingDraft {
    type Response = Listing;
    fn command() -> Command {
        Command::PublishListingDraft
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateListing {
    pub update: ListingUpdate,
}

impl ProviderCommand for UpdateListing {
    type Response = Listing;
    fn command() -> Command {
        Command::UpdateListing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowListing {
    pub id: ListingId,
}

impl ProviderCommand for ShowListing {
    type Response = Listing;
    fn command() -> Command {
        Command::ShowListing
    }
}

// ============================================================================
// Images
// ============================================================================

/// Upload a local file. The provider reads the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadImage {
    pub file: PathBuf,
}

impl ProviderCommand for UploadImage {
    type Response = ImageId;
    fn command() -> Command {
        Command::UploadImage
    }
}
