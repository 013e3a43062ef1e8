//! Error types for the listing editor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in listing editor operations.
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid availability plan: {0}")]
    InvalidPlan(String),

    #[error("Invalid availability exception: {0}")]
    InvalidException(String),

    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    #[error("Remote request failed: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),
}

impl ListingError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        ListingError::Remote {
            status,
            message: message.into(),
        }
    }

    /// HTTP-like status code, when the remote reported one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ListingError::Remote { status, .. } => *status,
            ListingError::ListingNotFound(_) | ListingError::ImageNotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Result type alias for listing editor operations.
pub type ListingResult<T> = Result<T, ListingError>;

/// An error flattened into plain data so it can live in page state.
///
/// Remote failures never propagate past the coordinator; they are converted
/// into this shape and attached to the month bucket or exception record
/// they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorableError {
    pub status: Option<u16>,
    pub message: String,
}

impl StorableError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        StorableError {
            status,
            message: message.into(),
        }
    }
}

impl From<&ListingError> for StorableError {
    fn from(err: &ListingError) -> Self {
        StorableError {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<ListingError> for StorableError {
    fn from(err: ListingError) -> Self {
        StorableError::from(&err)
    }
}

impl std::fmt::Display for StorableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}
