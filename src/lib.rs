//! Listing editor page.
//!
//! Domain types and pure state transitions live in `listing-core`; this
//! crate drives them against a [`MarketplaceApi`] on a tokio runtime.

pub mod page;

pub use listing_core::{ListingError, ListingResult, MarketplaceApi, StorableError};
pub use page::{Direction, EditListingPage, LoadParams};
