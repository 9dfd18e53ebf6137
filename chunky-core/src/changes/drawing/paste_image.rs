use std::sync::Arc;

use super::{begin_drawing, restore_stored_chunks, store_and_commit, DrawTarget};
use crate::{
    blend::Compose,
    changes::{ApplyResult, Change, ChangeError, ChangeInfos},
    geometry::VecI,
    raster::{operation::ClipMask, CommittedChunkStorage, Surface},
    state::Document,
};

/// Blit a surface onto the target at a fixed position.
#[derive(Debug)]
pub struct PasteImage {
    target: DrawTarget,
    surface: Surface,
    pos: VecI,
    clip: Option<Arc<ClipMask>>,
    stored: Option<CommittedChunkStorage>,
}
impl PasteImage {
    #[must_use]
    pub fn new(target: DrawTarget, surface: Surface, pos: VecI) -> Self {
        Self {
            target,
            surface,
            pos,
            clip: None,
            stored: None,
        }
    }
}
impl Change for PasteImage {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        if !self.target.is_valid(document) || self.surface.is_fully_transparent() {
            return false;
        }
        self.clip = document.selection.clip_mask();
        true
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let image = self.target.image_mut(document)?;
        image.cancel_changes();
        begin_drawing(image, self.clip.as_ref());
        image.draw_image(self.surface.clone(), self.pos, Compose::Over);
        let chunks = store_and_commit(image, &mut self.stored)?;
        Ok(ApplyResult::Applied(smallvec::smallvec![
            self.target.chunks_info(chunks)
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let image = self.target.image_mut(document)?;
        let chunks = restore_stored_chunks(image, &mut self.stored)?;
        Ok(smallvec::smallvec![self.target.chunks_info(chunks)])
    }
    fn dispose(&mut self) {
        if let Some(mut stored) = self.stored.take() {
            stored.dispose();
        }
    }
}
