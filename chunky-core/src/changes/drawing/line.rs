use std::sync::Arc;

use super::{begin_drawing, restore_stored_chunks, store_and_commit, DrawTarget};
use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfos, UpdateableChange},
    geometry::VecI,
    raster::{operation::ClipMask, operation::StrokeStyle, ChunkyImage, CommittedChunkStorage},
    state::Document,
};

/// Drag out a straight line between two pixels.
#[derive(Debug)]
pub struct DrawLine {
    target: DrawTarget,
    from: VecI,
    to: VecI,
    style: StrokeStyle,
    clip: Option<Arc<ClipMask>>,
    stored: Option<CommittedChunkStorage>,
}
impl DrawLine {
    #[must_use]
    pub fn new(target: DrawTarget, from: VecI, to: VecI, style: StrokeStyle) -> Self {
        Self {
            target,
            from,
            to,
            style,
            clip: None,
            stored: None,
        }
    }
    #[must_use]
    pub fn target(&self) -> DrawTarget {
        self.target
    }
    pub fn update(&mut self, from: VecI, to: VecI, style: StrokeStyle) {
        self.from = from;
        self.to = to;
        self.style = style;
    }
    fn redraw(&self, image: &mut ChunkyImage) {
        image.cancel_changes();
        begin_drawing(image, self.clip.as_ref());
        image.draw_line(self.from, self.to, self.style);
    }
}
impl Change for DrawLine {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        if !self.target.is_valid(document) {
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
        self.redraw(image);
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
impl UpdateableChange for DrawLine {
    fn apply_temporarily(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let image = self.target.image_mut(document)?;
        let mut chunks = image.find_affected_chunks();
        self.redraw(image);
        chunks.extend(image.find_affected_chunks());
        Ok(smallvec::smallvec![self.target.chunks_info(chunks)])
    }
}
