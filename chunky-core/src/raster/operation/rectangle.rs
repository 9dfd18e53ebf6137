use super::{ChunkSet, ShapeStyle};
use crate::{
    geometry::{RectI, VecI},
    raster::Surface,
};

/// Axis-aligned rectangle. The outline is drawn inside `rect`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RectangleOp {
    pub rect: RectI,
    pub style: ShapeStyle,
}
impl RectangleOp {
    fn interior(&self) -> RectI {
        self.rect.inflate(-self.style.stroke_width.max(0))
    }
    pub(super) fn affected_chunks(&self) -> ChunkSet {
        let mut chunks: ChunkSet = self.rect.chunks_touching().collect();
        if self.style.fill_is_noop() {
            for inside in self.interior().chunks_fully_inside() {
                chunks.remove(&inside);
            }
        }
        chunks
    }
    /// Draw onto a surface whose top left pixel sits at `offset` on the canvas.
    pub(super) fn draw_on(&self, surface: &mut Surface, offset: VecI) {
        let rect = self.rect.translate(-offset);
        let inner = self.interior().translate(-offset);
        let ShapeStyle {
            stroke_color,
            fill_color,
            compose,
            ..
        } = self.style;
        if inner.is_empty() {
            // Outline swallows the whole shape.
            surface.fill_rect(rect, stroke_color, compose);
            return;
        }
        // Four non-overlapping bands, so translucent outlines don't double up at the corners.
        let bands = [
            RectI { bottom: inner.top, ..rect },
            RectI { top: inner.bottom, ..rect },
            RectI {
                top: inner.top,
                bottom: inner.bottom,
                right: inner.left,
                ..rect
            },
            RectI {
                top: inner.top,
                bottom: inner.bottom,
                left: inner.right,
                ..rect
            },
        ];
        for band in bands {
            surface.fill_rect(band, stroke_color, compose);
        }
        surface.fill_rect(inner, fill_color, compose);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{blend::Compose, color::Color};

    fn count(surface: &Surface, color: Color) -> usize {
        surface.pixels().iter().filter(|&&c| c == color).count()
    }
    #[test]
    fn outline_and_fill() {
        let op = RectangleOp {
            rect: RectI::new(VecI::new(1, 1), VecI::new(5, 4)),
            style: ShapeStyle {
                stroke_width: 1,
                stroke_color: Color::BLACK,
                fill_color: Color::WHITE,
                compose: Compose::Over,
            },
        };
        let mut s = Surface::new(8, 8);
        op.draw_on(&mut s, VecI::ZERO);
        // 5x4 outline ring is 14 pixels, interior 3x2.
        assert_eq!(count(&s, Color::BLACK), 14);
        assert_eq!(count(&s, Color::WHITE), 6);
        assert_eq!(s.get(VecI::new(2, 2)), Some(Color::WHITE));
        assert_eq!(s.get(VecI::new(5, 4)), Some(Color::BLACK));
        assert_eq!(s.get(VecI::new(6, 4)), Some(Color::TRANSPARENT));
    }
    #[test]
    fn translucent_corners_blend_once() {
        let half = Color([0, 0, 0, 128]);
        let op = RectangleOp {
            rect: RectI::new(VecI::ZERO, VecI::new(4, 4)),
            style: ShapeStyle {
                stroke_width: 1,
                stroke_color: half,
                fill_color: Color::TRANSPARENT,
                compose: Compose::Over,
            },
        };
        let mut s = Surface::new(4, 4);
        op.draw_on(&mut s, VecI::ZERO);
        assert_eq!(count(&s, half), 12);
    }
    #[test]
    fn offset_drawing() {
        let op = RectangleOp {
            rect: RectI::new(VecI::new(-2, -2), VecI::new(4, 4)),
            style: ShapeStyle {
                stroke_width: 0,
                fill_color: Color::WHITE,
                ..ShapeStyle::default()
            },
        };
        // Surface placed at (-1, -1) on the canvas.
        let mut s = Surface::new(4, 4);
        op.draw_on(&mut s, VecI::new(-1, -1));
        assert_eq!(count(&s, Color::WHITE), 9);
        assert_eq!(s.get(VecI::new(2, 2)), Some(Color::WHITE));
        assert_eq!(s.get(VecI::new(3, 3)), Some(Color::TRANSPARENT));
    }
    #[test]
    fn hollow_skips_inner_chunks() {
        let size = crate::raster::FULL_CHUNK_SIZE as i32;
        let op = RectangleOp {
            rect: RectI::new(VecI::new(-1, -1), VecI::new(3 * size + 2, 3 * size + 2)),
            style: ShapeStyle::default(),
        };
        let affected = op.affected_chunks();
        assert!(!affected.contains(&VecI::new(1, 1)));
        assert!(!affected.contains(&VecI::new(0, 1)));
        assert!(affected.contains(&VecI::new(3, 1)));
        assert!(affected.contains(&VecI::new(-1, -1)));
        // 5x5 grid of touched chunks, minus the 3x3 inside.
        assert_eq!(affected.len(), 25 - 9);

        let filled = RectangleOp {
            style: ShapeStyle {
                fill_color: Color::WHITE,
                ..ShapeStyle::default()
            },
            ..op
        };
        assert_eq!(filled.affected_chunks().len(), 25);
    }
}
