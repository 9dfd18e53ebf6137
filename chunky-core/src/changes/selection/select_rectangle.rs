use crate::{
    blend::Compose,
    changes::{
        drawing::{restore_stored_chunks, store_and_commit},
        ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos, UpdateableChange,
    },
    color::Color,
    geometry::RectI,
    raster::{operation::ShapeStyle, ChunkyImage, CommittedChunkStorage},
    state::Document,
};

/// How a new selection shape combines with the existing selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumIter)]
pub enum SelectionMode {
    /// Replace the selection.
    #[default]
    New,
    Add,
    Subtract,
}

/// Drag out a rectangular selection.
#[derive(Debug)]
pub struct SelectRectangle {
    rect: RectI,
    mode: SelectionMode,
    stored: Option<CommittedChunkStorage>,
    /// The selection's flag from before the last apply.
    was_empty_and_inactive: bool,
}
impl SelectRectangle {
    #[must_use]
    pub fn new(rect: RectI, mode: SelectionMode) -> Self {
        Self {
            rect,
            mode,
            stored: None,
            was_empty_and_inactive: true,
        }
    }
    pub fn update(&mut self, rect: RectI, mode: SelectionMode) {
        self.rect = rect;
        self.mode = mode;
    }
    fn redraw(&self, mask: &mut ChunkyImage) {
        mask.cancel_changes();
        let compose = match self.mode {
            SelectionMode::New => {
                mask.clear();
                Compose::Over
            }
            SelectionMode::Add => Compose::Over,
            SelectionMode::Subtract => Compose::Erase,
        };
        if !self.rect.is_empty() {
            mask.draw_rectangle(
                self.rect,
                ShapeStyle {
                    stroke_width: 0,
                    stroke_color: Color::TRANSPARENT,
                    fill_color: Color::WHITE,
                    compose,
                },
            );
        }
    }
}
impl Change for SelectRectangle {
    fn initialize_and_validate(&mut self, _document: &Document) -> bool {
        true
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let selection = &mut document.selection;
        self.redraw(&mut selection.mask);
        let chunks = store_and_commit(&mut selection.mask, &mut self.stored)?;
        self.was_empty_and_inactive = selection.is_empty_and_inactive;
        selection.is_empty_and_inactive = selection.mask.check_if_committed_is_empty();
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::SelectionChunks { chunks }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let selection = &mut document.selection;
        let chunks = restore_stored_chunks(&mut selection.mask, &mut self.stored)?;
        selection.is_empty_and_inactive = self.was_empty_and_inactive;
        Ok(smallvec::smallvec![ChangeInfo::SelectionChunks { chunks }])
    }
    fn dispose(&mut self) {
        if let Some(mut stored) = self.stored.take() {
            stored.dispose();
        }
    }
}
impl UpdateableChange for SelectRectangle {
    fn apply_temporarily(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let mask = &mut document.selection.mask;
        let mut chunks = mask.find_affected_chunks();
        self.redraw(mask);
        chunks.extend(mask.find_affected_chunks());
        Ok(smallvec::smallvec![ChangeInfo::SelectionChunks { chunks }])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{changes::TrackedChange, geometry::VecI};

    fn select(
        document: &mut Document,
        rect: RectI,
        mode: SelectionMode,
    ) -> TrackedChange<SelectRectangle> {
        let mut change = TrackedChange::new(Box::new(SelectRectangle::new(rect, mode)));
        assert!(change.initialize_and_validate(document));
        change.apply(document).unwrap();
        change
    }

    #[test]
    fn modes_combine() {
        let mut document = Document::default();
        let _new = select(
            &mut document,
            RectI::new(VecI::ZERO, VecI::new(10, 10)),
            SelectionMode::New,
        );
        assert!(document.selection.is_active());
        let _add = select(
            &mut document,
            RectI::new(VecI::new(300, 0), VecI::new(10, 10)),
            SelectionMode::Add,
        );
        let mask = &document.selection.mask;
        assert_eq!(mask.get_committed_pixel(VecI::new(5, 5)), Color::WHITE);
        assert_eq!(mask.get_committed_pixel(VecI::new(305, 5)), Color::WHITE);

        let _replace = select(
            &mut document,
            RectI::new(VecI::new(300, 0), VecI::new(10, 10)),
            SelectionMode::New,
        );
        let mask = &document.selection.mask;
        assert_eq!(mask.get_committed_pixel(VecI::new(5, 5)), Color::TRANSPARENT);
        assert_eq!(mask.find_committed_chunks().len(), 1);

        let _subtract = select(
            &mut document,
            RectI::new(VecI::new(290, 0), VecI::new(30, 30)),
            SelectionMode::Subtract,
        );
        assert!(document.selection.mask.check_if_committed_is_empty());
        assert!(!document.selection.is_active());
    }
    #[test]
    fn revert_restores_flag() {
        let mut document = Document::default();
        let mut change = select(
            &mut document,
            RectI::new(VecI::ZERO, VecI::new(4, 4)),
            SelectionMode::New,
        );
        assert!(document.selection.is_active());
        change.revert(&mut document).unwrap();
        assert!(!document.selection.is_active());
        assert!(document.selection.mask.check_if_committed_is_empty());
    }
}
