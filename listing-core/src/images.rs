//! Ordered image draft used while composing a listing's photos.
//!
//! Uploads get a local placeholder id that holds their position in the
//! order. When the upload resolves the placeholder keeps its position and
//! learns its remote id.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StorableError;
use crate::listing::ImageId;

/// An image uploaded during this editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftImage {
    /// Local placeholder id.
    pub id: ImageId,
    /// Remote id, once the upload succeeded.
    pub image_id: Option<ImageId>,
    pub file: PathBuf,
}

impl DraftImage {
    pub fn is_uploaded(&self) -> bool {
        self.image_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDraft {
    images: BTreeMap<ImageId, DraftImage>,
    image_order: Vec<ImageId>,
    removed_image_ids: Vec<ImageId>,
    upload_image_error: Option<StorableError>,
}

impl ImageDraft {
    pub fn new() -> Self {
        ImageDraft::default()
    }

    pub fn order(&self) -> &[ImageId] {
        &self.image_order
    }

    pub fn image(&self, id: &ImageId) -> Option<&DraftImage> {
        self.images.get(id)
    }

    pub fn removed_image_ids(&self) -> &[ImageId] {
        &self.removed_image_ids
    }

    pub fn upload_error(&self) -> Option<&StorableError> {
        self.upload_image_error.as_ref()
    }

    /// Append a pending upload at the end of the order.
    pub fn start_upload(mut self, placeholder: ImageId, file: PathBuf) -> Self {
        self.images.insert(
            placeholder.clone(),
            DraftImage {
                id: placeholder.clone(),
                image_id: None,
                file,
            },
        );
        self.image_order.push(placeholder);
        self.upload_image_error = None;
        self
    }

    /// Resolve a placeholder to its remote id.
    ///
    /// A placeholder removed while uploading is swapped for the remote id in
    /// `removed_image_ids`, so the uploaded image can still be cleaned up.
    pub fn upload_succeeded(mut self, placeholder: &ImageId, image_id: ImageId) -> Self {
        if let Some(image) = self.images.get_mut(placeholder) {
            image.image_id = Some(image_id);
        } else if let Some(removed) = self.removed_image_ids.iter_mut().find(|id| *id == placeholder) {
            *removed = image_id;
        }
        self
    }

    /// Discard a failed upload entirely.
    pub fn upload_failed(mut self, placeholder: &ImageId, error: StorableError) -> Self {
        self.images.remove(placeholder);
        self.image_order.retain(|id| id != placeholder);
        // Nothing reached the server, so there is nothing to clean up
        self.removed_image_ids.retain(|id| id != placeholder);
        self.upload_image_error = Some(error);
        self
    }

    pub fn reorder(mut self, image_order: Vec<ImageId>) -> Self {
        self.image_order = image_order;
        self
    }

    /// Remove an image from the draft.
    ///
    /// An upload the server has not confirmed yet is recorded in
    /// `removed_image_ids` for later cleanup. Confirmed images, whether
    /// uploaded in this session or already on the listing, only leave the
    /// draft; the listing update drops them.
    pub fn remove(mut self, id: &ImageId) -> Self {
        if self.images.remove(id).is_some_and(|image| !image.is_uploaded()) {
            self.removed_image_ids.push(id.clone());
        }
        self.image_order.retain(|i| i != id);
        self
    }

    /// Remote ids in draft order. Pending uploads are skipped; ids that are
    /// not session uploads are passed through as listing images.
    pub fn resolved_order(&self) -> Vec<ImageId> {
        self.image_order
            .iter()
            .filter_map(|id| match self.images.get(id) {
                Some(image) => image.image_id.clone(),
                None => Some(id.clone()),
            })
            .collect()
    }

    /// Whether any upload is still waiting for the remote.
    pub fn has_pending_uploads(&self) -> bool {
        self.images.values().any(|image| !image.is_uploaded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ImageId {
        ImageId::new(s)
    }

    fn draft_with(placeholders: &[&str]) -> ImageDraft {
        placeholders.iter().fold(ImageDraft::new(), |draft, p| {
            draft.start_upload(id(p), PathBuf::from(format!("{p}.jpg")))
        })
    }

    #[test]
    fn test_start_upload_appends_pending() {
        let draft = draft_with(&["a", "b"]);
        assert_eq!(draft.order(), &[id("a"), id("b")]);
        assert!(draft.has_pending_uploads());
        assert!(!draft.image(&id("a")).unwrap().is_uploaded());
    }

    #[test]
    fn test_upload_success_keeps_position() {
        let draft = draft_with(&["a", "b", "c"]).upload_succeeded(&id("b"), id("remote-b"));

        assert_eq!(draft.order(), &[id("a"), id("b"), id("c")]);
        assert_eq!(draft.image(&id("b")).unwrap().image_id, Some(id("remote-b")));
        assert_eq!(draft.resolved_order(), vec![id("remote-b")]);
    }

    #[test]
    fn test_upload_failure_discards_placeholder() {
        let error = StorableError::new(Some(413), "too large");
        let draft = draft_with(&["a", "b"]).upload_failed(&id("a"), error.clone());

        assert_eq!(draft.order(), &[id("b")]);
        assert!(draft.image(&id("a")).is_none());
        assert_eq!(draft.upload_error(), Some(&error));
        assert!(draft.removed_image_ids().is_empty());
    }

    #[test]
    fn test_new_upload_clears_previous_error() {
        let draft = draft_with(&["a"])
            .upload_failed(&id("a"), StorableError::new(None, "nope"))
            .start_upload(id("b"), PathBuf::from("b.jpg"));
        assert!(draft.upload_error().is_none());
    }

    #[test]
    fn test_remove_confirmed_upload_is_not_tracked() {
        let draft = draft_with(&["a", "b"])
            .upload_succeeded(&id("a"), id("remote-a"))
            .remove(&id("a"));

        assert_eq!(draft.order(), &[id("b")]);
        assert!(draft.removed_image_ids().is_empty());
    }

    #[test]
    fn test_remove_listing_image_is_not_tracked() {
        let draft = ImageDraft::new()
            .reorder(vec![id("saved-1"), id("saved-2")])
            .remove(&id("saved-1"));

        assert_eq!(draft.order(), &[id("saved-2")]);
        assert!(draft.removed_image_ids().is_empty());
    }

    #[test]
    fn test_remove_pending_upload_is_tracked() {
        let draft = draft_with(&["a", "b"]).remove(&id("a"));

        assert_eq!(draft.order(), &[id("b")]);
        assert!(draft.image(&id("a")).is_none());
        assert_eq!(draft.removed_image_ids(), &[id("a")]);
    }

    #[test]
    fn test_late_success_after_removal_tracks_remote_id() {
        let draft = draft_with(&["a"])
            .remove(&id("a"))
            .upload_succeeded(&id("a"), id("remote-a"));

        assert!(draft.image(&id("a")).is_none());
        assert!(draft.order().is_empty());
        assert_eq!(draft.removed_image_ids(), &[id("remote-a")]);
        assert!(draft.resolved_order().is_empty());
    }

    #[test]
    fn test_late_failure_after_removal_untracks_placeholder() {
        let draft = draft_with(&["a"])
            .remove(&id("a"))
            .upload_failed(&id("a"), StorableError::new(Some(500), "boom"));

        assert!(draft.removed_image_ids().is_empty());
    }

    #[test]
    fn test_resolved_order_mixes_saved_and_uploaded() {
        let draft = draft_with(&["new"])
            .upload_succeeded(&id("new"), id("remote-new"))
            .reorder(vec![id("saved-1"), id("new")]);

        assert_eq!(draft.resolved_order(), vec![id("saved-1"), id("remote-new")]);
    }
}
