//! Listing entities as seen by the editor.
//!
//! The remote returns a richer entity graph; only the fields the editor
//! reads or writes are modelled.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityPlan;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        ListingId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Image identifier: a local placeholder while uploading, a remote id afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        ImageId(id.into())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingState {
    Draft,
    PendingApproval,
    Published,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: ListingState,
    #[serde(default)]
    pub availability_plan: Option<AvailabilityPlan>,
    #[serde(default)]
    pub images: Vec<ImageId>,
    /// Marketplace-specific attributes, passed through untouched.
    #[serde(default)]
    pub public_data: serde_json::Map<String, serde_json::Value>,
}

impl Listing {
    pub fn is_published(&self) -> bool {
        self.state != ListingState::Draft
    }

    /// The listing's own plan, or the given fallback.
    pub fn availability_plan_or(&self, fallback: &AvailabilityPlan) -> AvailabilityPlan {
        self.availability_plan.clone().unwrap_or_else(|| fallback.clone())
    }
}

/// Payload for creating a listing draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageId>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub public_data: serde_json::Map<String, serde_json::Value>,
}

/// Partial update of an existing listing. `None` leaves a field as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    pub id: ListingId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_plan: Option<AvailabilityPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageId>>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub public_data: serde_json::Map<String, serde_json::Value>,
}

impl ListingUpdate {
    pub fn new(id: ListingId) -> Self {
        ListingUpdate {
            id,
            title: None,
            description: None,
            availability_plan: None,
            images: None,
            public_data: serde_json::Map::new(),
        }
    }
}

/// Wizard tabs of the listing editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditListingTab {
    Description,
    Features,
    Policy,
    Location,
    Pricing,
    Availability,
    Photos,
}
