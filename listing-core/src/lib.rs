//! Core types for the listing editor.
//!
//! This crate holds everything that does not need a runtime:
//! - `availability`, `calendar` and `day_state` for the availability calendar
//! - `toggle` for the per-day exception mutation saga
//! - `state` for the editor page state and its transitions
//! - `remote` for the marketplace API and the provider protocol

pub mod availability;
pub mod calendar;
pub mod dates;
pub mod day_state;
pub mod editor_config;
pub mod error;
pub mod images;
pub mod listing;
pub mod remote;
pub mod state;
pub mod toggle;

pub use error::{ListingError, ListingResult, StorableError};
pub use remote::MarketplaceApi;
