use std::sync::Arc;

use super::{begin_drawing, restore_stored_chunks, store_and_commit, DrawTarget};
use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfos},
    raster::{operation::ClipMask, CommittedChunkStorage},
    state::Document,
};

/// Erase a layer image or mask. Only the selected area is erased while a selection is active.
#[derive(Debug)]
pub struct ClearImage {
    target: DrawTarget,
    clip: Option<Arc<ClipMask>>,
    stored: Option<CommittedChunkStorage>,
}
impl ClearImage {
    #[must_use]
    pub fn new(target: DrawTarget) -> Self {
        Self {
            target,
            clip: None,
            stored: None,
        }
    }
}
impl Change for ClearImage {
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
        image.cancel_changes();
        begin_drawing(image, self.clip.as_ref());
        image.clear();
        // Everything may already be transparent, or hidden by the selection.
        if image.find_changed_chunks().is_empty() {
            image.cancel_changes();
            return Ok(ApplyResult::NoOp);
        }
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        changes::{drawing::test_util, TrackedChange},
        color::Color,
        geometry::{RectI, VecI},
        raster::operation::ShapeStyle,
    };

    fn white_fill() -> ShapeStyle {
        ShapeStyle {
            stroke_width: 0,
            fill_color: Color::WHITE,
            ..ShapeStyle::default()
        }
    }

    #[test]
    fn clear_and_restore() {
        let (mut document, layer) = test_util::document_with_layer();
        {
            let image = document.structure.find_layer_or_err_mut(layer).unwrap();
            image.draw_rectangle(
                RectI::new(VecI::new(-300, -300), VecI::new(600, 600)),
                white_fill(),
            );
            image.commit_changes();
        }
        let before = test_util::snapshot(document.structure.find_layer_or_err(layer).unwrap());
        assert_eq!(before.len(), 16);

        let mut change = TrackedChange::new(Box::new(ClearImage::new(DrawTarget::layer(layer))));
        assert!(change.initialize_and_validate(&document));
        assert!(matches!(
            change.apply(&mut document).unwrap(),
            ApplyResult::Applied(_)
        ));
        assert!(document
            .structure
            .find_layer_or_err(layer)
            .unwrap()
            .check_if_committed_is_empty());

        change.revert(&mut document).unwrap();
        let after = test_util::snapshot(document.structure.find_layer_or_err(layer).unwrap());
        assert_eq!(before, after);
    }
    #[test]
    fn clears_only_selection() {
        let (mut document, layer) = test_util::document_with_layer();
        {
            let image = document.structure.find_layer_or_err_mut(layer).unwrap();
            image.draw_rectangle(RectI::new(VecI::ZERO, VecI::new(100, 100)), white_fill());
            image.commit_changes();
            let selection = &mut document.selection;
            selection
                .mask
                .draw_rectangle(RectI::new(VecI::ZERO, VecI::new(50, 100)), white_fill());
            selection.mask.commit_changes();
            selection.is_empty_and_inactive = false;
        }
        let mut change = TrackedChange::new(Box::new(ClearImage::new(DrawTarget::layer(layer))));
        assert!(change.initialize_and_validate(&document));
        change.apply(&mut document).unwrap();

        let image = document.structure.find_layer_or_err(layer).unwrap();
        assert_eq!(image.get_committed_pixel(VecI::new(10, 10)), Color::TRANSPARENT);
        assert_eq!(image.get_committed_pixel(VecI::new(60, 10)), Color::WHITE);
    }
    #[test]
    fn empty_is_noop() {
        let (mut document, layer) = test_util::document_with_layer();
        let mut change = TrackedChange::new(Box::new(ClearImage::new(DrawTarget::layer(layer))));
        assert!(change.initialize_and_validate(&document));
        assert!(matches!(
            change.apply(&mut document).unwrap(),
            ApplyResult::NoOp
        ));
    }
    #[test]
    fn selection_missing_content_is_noop() {
        let (mut document, layer) = test_util::document_with_layer();
        {
            let image = document.structure.find_layer_or_err_mut(layer).unwrap();
            image.draw_rectangle(RectI::new(VecI::ZERO, VecI::new(10, 10)), white_fill());
            image.commit_changes();
            // Same chunk as the content, but no pixels in common.
            let selection = &mut document.selection;
            selection
                .mask
                .draw_rectangle(RectI::new(VecI::new(100, 100), VecI::new(10, 10)), white_fill());
            selection.mask.commit_changes();
            selection.is_empty_and_inactive = false;
        }
        let before = test_util::snapshot(document.structure.find_layer_or_err(layer).unwrap());

        let mut change = TrackedChange::new(Box::new(ClearImage::new(DrawTarget::layer(layer))));
        assert!(change.initialize_and_validate(&document));
        assert!(matches!(
            change.apply(&mut document).unwrap(),
            ApplyResult::NoOp
        ));
        let image = document.structure.find_layer_or_err(layer).unwrap();
        assert_eq!(image.queue_len(), 0);
        assert_eq!(test_util::snapshot(image), before);
    }
}
