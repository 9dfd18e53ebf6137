use crate::raster::{operation::ClipMask, ChunkyImage};

/// The document's selection, stored as the alpha of an image.
#[derive(Debug)]
pub struct Selection {
    pub mask: ChunkyImage,
    /// When set, nothing is selected and drawing is unrestricted.
    pub is_empty_and_inactive: bool,
}
impl Default for Selection {
    fn default() -> Self {
        Self {
            mask: ChunkyImage::new(),
            is_empty_and_inactive: true,
        }
    }
}
impl Selection {
    /// Whether drawing should be restricted to the selected area.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_empty_and_inactive
    }
    /// Snapshot of the selected area, for clipping drawing operations. `None` if inactive.
    #[must_use]
    pub fn clip_mask(&self) -> Option<std::sync::Arc<ClipMask>> {
        self.is_active()
            .then(|| std::sync::Arc::new(ClipMask::from_committed(&self.mask)))
    }
}
