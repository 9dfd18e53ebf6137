use std::sync::Arc;

use super::{begin_drawing, restore_stored_chunks, store_and_commit, DrawTarget};
use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfos, UpdateableChange},
    geometry::VecI,
    raster::{operation::ClipMask, operation::StrokeStyle, ChunkyImage, CommittedChunkStorage},
    state::Document,
};

/// Freehand stroke. Points accumulate through updates, and each preview only draws the segments
/// that are new since the last one.
#[derive(Debug)]
pub struct Pen {
    target: DrawTarget,
    points: Vec<VecI>,
    style: StrokeStyle,
    clip: Option<Arc<ClipMask>>,
    stored: Option<CommittedChunkStorage>,
    /// Segments already pending on the image.
    queued: usize,
}
impl Pen {
    #[must_use]
    pub fn new(target: DrawTarget, first_point: VecI, style: StrokeStyle) -> Self {
        Self {
            target,
            points: vec![first_point],
            style,
            clip: None,
            stored: None,
            queued: 0,
        }
    }
    /// Continue the stroke to `point`. The style is fixed for the whole stroke.
    pub fn update(&mut self, point: VecI) {
        self.points.push(point);
    }
    #[must_use]
    pub fn target(&self) -> DrawTarget {
        self.target
    }
    #[must_use]
    pub fn points(&self) -> &[VecI] {
        &self.points
    }
    /// Segment `i` ends at point `i`. The first is a dot on the starting point.
    fn draw_segment(&self, image: &mut ChunkyImage, i: usize) {
        let to = self.points[i];
        let from = i.checked_sub(1).map_or(to, |prev| self.points[prev]);
        image.draw_line(from, to, self.style);
    }
    /// Queue every segment not yet pending.
    fn draw_remaining(&mut self, image: &mut ChunkyImage) {
        if self.queued == 0 {
            image.cancel_changes();
            begin_drawing(image, self.clip.as_ref());
        }
        for i in self.queued..self.points.len() {
            self.draw_segment(image, i);
        }
        self.queued = self.points.len();
    }
}
impl Change for Pen {
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
        first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let image = self.target.image_mut(document)?;
        if !first_apply {
            // Redraw the stroke segment by segment, exactly as it was previewed.
            self.queued = 0;
        }
        self.draw_remaining(image);
        self.queued = 0;
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
impl UpdateableChange for Pen {
    fn apply_temporarily(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let image = self.target.image_mut(document)?;
        let first_new = if self.queued == 0 { 0 } else { image.queue_len() };
        self.draw_remaining(image);
        let chunks = image.find_affected_chunks_since(first_new);
        Ok(smallvec::smallvec![self.target.chunks_info(chunks)])
    }
}
