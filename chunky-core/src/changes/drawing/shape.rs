use std::sync::Arc;

use super::{begin_drawing, restore_stored_chunks, store_and_commit, DrawTarget};
use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfos, UpdateableChange},
    geometry::RectI,
    raster::{operation::ClipMask, operation::ShapeStyle, ChunkyImage, CommittedChunkStorage},
    state::Document,
};

/// A closed shape described by its bounding rectangle.
pub trait Shape: std::fmt::Debug + 'static {
    fn draw(image: &mut ChunkyImage, rect: RectI, style: ShapeStyle);
}
#[derive(Debug)]
pub struct Rectangle;
impl Shape for Rectangle {
    fn draw(image: &mut ChunkyImage, rect: RectI, style: ShapeStyle) {
        image.draw_rectangle(rect, style);
    }
}
#[derive(Debug)]
pub struct Ellipse;
impl Shape for Ellipse {
    fn draw(image: &mut ChunkyImage, rect: RectI, style: ShapeStyle) {
        image.draw_ellipse(rect, style);
    }
}

pub type DrawRectangle = DrawShape<Rectangle>;
pub type DrawEllipse = DrawShape<Ellipse>;

/// Drag out a shape. Every preview frame replaces the previous one.
#[derive(Debug)]
pub struct DrawShape<S: Shape> {
    target: DrawTarget,
    rect: RectI,
    style: ShapeStyle,
    clip: Option<Arc<ClipMask>>,
    stored: Option<CommittedChunkStorage>,
    _shape: std::marker::PhantomData<S>,
}
impl<S: Shape> DrawShape<S> {
    #[must_use]
    pub fn new(target: DrawTarget, rect: RectI, style: ShapeStyle) -> Self {
        Self {
            target,
            rect,
            style,
            clip: None,
            stored: None,
            _shape: std::marker::PhantomData,
        }
    }
    /// Change the in-flight parameters. Shown on the next preview or apply.
    pub fn update(&mut self, rect: RectI, style: ShapeStyle) {
        self.rect = rect;
        self.style = style;
    }
    #[must_use]
    pub fn target(&self) -> DrawTarget {
        self.target
    }
    #[must_use]
    pub fn rect(&self) -> RectI {
        self.rect
    }
    /// Replace whatever is pending on the image with the current shape.
    fn redraw(&self, image: &mut ChunkyImage) {
        image.cancel_changes();
        begin_drawing(image, self.clip.as_ref());
        S::draw(image, self.rect, self.style);
    }
}
impl<S: Shape> Change for DrawShape<S> {
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
impl<S: Shape> UpdateableChange for DrawShape<S> {
    fn apply_temporarily(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let image = self.target.image_mut(document)?;
        // Chunks of the previous frame need repainting too.
        let mut chunks = image.find_affected_chunks();
        self.redraw(image);
        chunks.extend(image.find_affected_chunks());
        Ok(smallvec::smallvec![self.target.chunks_info(chunks)])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        changes::{drawing::test_util, TrackedChange},
        color::Color,
        geometry::VecI,
    };

    fn opaque() -> ShapeStyle {
        ShapeStyle {
            stroke_width: 1,
            stroke_color: Color::BLACK,
            fill_color: Color::WHITE,
            ..ShapeStyle::default()
        }
    }

    #[test]
    fn rectangle_apply_revert_leaves_nothing() {
        let (mut document, layer) = test_util::document_with_layer();
        let mut change = TrackedChange::new(Box::new(DrawRectangle::new(
            DrawTarget::layer(layer),
            RectI::new(VecI::ZERO, VecI::new(10, 10)),
            opaque(),
        )));
        assert!(change.initialize_and_validate(&document));
        let infos = change.apply(&mut document).unwrap().into_infos();
        assert_eq!(infos.len(), 1);

        let image = document.structure.find_layer_or_err(layer).unwrap();
        assert_eq!(image.find_committed_chunks().len(), 1);
        assert_eq!(image.get_committed_pixel(VecI::new(5, 5)), Color::WHITE);

        change.revert(&mut document).unwrap();
        let image = document.structure.find_layer_or_err(layer).unwrap();
        assert!(image.check_if_committed_is_empty());
    }
    #[test]
    fn previews_do_not_commit() {
        let (mut document, layer) = test_util::document_with_layer();
        let mut change = TrackedChange::new(Box::new(DrawEllipse::new(
            DrawTarget::layer(layer),
            RectI::new(VecI::ZERO, VecI::new(8, 8)),
            opaque(),
        )));
        assert!(change.initialize_and_validate(&document));
        for size in [8, 300, 20] {
            change
                .inner_mut()
                .update(RectI::new(VecI::ZERO, VecI::new(size, size)), opaque());
            let infos = change.apply_temporarily(&mut document).unwrap();
            assert!(!infos.is_empty());
        }
        let image = document.structure.find_layer_or_err(layer).unwrap();
        assert!(image.check_if_committed_is_empty());
        // Only the latest frame is pending.
        assert_eq!(image.queue_len(), 1);
        assert_ne!(
            image.get_most_up_to_date_pixel(VecI::new(10, 10)),
            Color::TRANSPARENT
        );
        assert_eq!(
            image.get_most_up_to_date_pixel(VecI::new(150, 150)),
            Color::TRANSPARENT
        );
    }
    #[test]
    fn redo_is_bit_exact() {
        let (mut document, layer) = test_util::document_with_layer();
        let mut change = TrackedChange::new(Box::new(DrawEllipse::new(
            DrawTarget::layer(layer),
            RectI::new(VecI::new(-30, 100), VecI::new(400, 200)),
            ShapeStyle {
                stroke_width: 5,
                stroke_color: Color::from_unmultiplied(255, 0, 0, 128),
                fill_color: Color::from_unmultiplied(0, 0, 255, 200),
                ..ShapeStyle::default()
            },
        )));
        assert!(change.initialize_and_validate(&document));
        change.apply(&mut document).unwrap();
        let first = test_util::snapshot(document.structure.find_layer_or_err(layer).unwrap());

        change.revert(&mut document).unwrap();
        change.apply(&mut document).unwrap();
        let second = test_util::snapshot(document.structure.find_layer_or_err(layer).unwrap());
        assert_eq!(first, second);
    }
    #[test]
    fn missing_target_invalid() {
        let (document, layer) = test_util::document_with_layer();
        let mut change = DrawRectangle::new(
            DrawTarget::mask(layer),
            RectI::new(VecI::ZERO, VecI::new(1, 1)),
            opaque(),
        );
        assert!(!change.initialize_and_validate(&document));
    }
}
