use super::{ChunkSet, ShapeStyle};
use crate::{
    geometry::{RectI, VecI},
    raster::Surface,
};

/// Axis-aligned ellipse inscribed in `rect`. A pixel belongs to the ellipse when its center does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EllipseOp {
    pub rect: RectI,
    pub style: ShapeStyle,
}

struct Radii {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
}
impl Radii {
    fn contains(&self, x: f64, y: f64) -> bool {
        if self.rx <= 0.0 || self.ry <= 0.0 {
            return false;
        }
        let dx = (x - self.cx) / self.rx;
        let dy = (y - self.cy) / self.ry;
        dx * dx + dy * dy <= 1.0
    }
}

impl EllipseOp {
    fn outer(&self) -> Radii {
        let r = &self.rect;
        Radii {
            cx: (f64::from(r.left) + f64::from(r.right)) / 2.0,
            cy: (f64::from(r.top) + f64::from(r.bottom)) / 2.0,
            rx: f64::from(r.width()) / 2.0,
            ry: f64::from(r.height()) / 2.0,
        }
    }
    fn inner(&self) -> Radii {
        let width = f64::from(self.style.stroke_width.max(0));
        let outer = self.outer();
        Radii {
            rx: outer.rx - width,
            ry: outer.ry - width,
            ..outer
        }
    }
    pub(super) fn affected_chunks(&self) -> ChunkSet {
        let mut chunks: ChunkSet = self.rect.chunks_touching().collect();
        let inner = self.inner();
        if self.style.fill_is_noop() && inner.rx > 0.0 && inner.ry > 0.0 {
            // The rectangle inscribed in the inner ellipse, pulled in a pixel to stay clear of
            // rounding.
            let a = inner.rx / std::f64::consts::SQRT_2;
            let b = inner.ry / std::f64::consts::SQRT_2;
            let hole = RectI {
                left: az::saturating_cast::<_, i32>((inner.cx - a).ceil()).saturating_add(1),
                top: az::saturating_cast::<_, i32>((inner.cy - b).ceil()).saturating_add(1),
                right: az::saturating_cast::<_, i32>((inner.cx + a).floor()).saturating_sub(1),
                bottom: az::saturating_cast::<_, i32>((inner.cy + b).floor()).saturating_sub(1),
            };
            for inside in hole.chunks_fully_inside() {
                chunks.remove(&inside);
            }
        }
        chunks
    }
    pub(super) fn draw_on(&self, surface: &mut Surface, offset: VecI) {
        let area = self.rect.translate(-offset).intersect(&surface.bounds());
        if area.is_empty() {
            return;
        }
        let outer = self.outer();
        let inner = self.inner();
        let ShapeStyle {
            stroke_color,
            fill_color,
            compose,
            ..
        } = self.style;
        for y in area.top..area.bottom {
            let cy = f64::from(y + offset.y) + 0.5;
            for x in area.left..area.right {
                let cx = f64::from(x + offset.x) + 0.5;
                if !outer.contains(cx, cy) {
                    continue;
                }
                let color = if inner.contains(cx, cy) {
                    fill_color
                } else {
                    stroke_color
                };
                surface.blend_pixel(VecI::new(x, y), color, compose);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{blend::Compose, color::Color};

    #[test]
    fn circle_shape() {
        let op = EllipseOp {
            rect: RectI::new(VecI::ZERO, VecI::new(9, 9)),
            style: ShapeStyle {
                stroke_width: 1,
                stroke_color: Color::BLACK,
                fill_color: Color::WHITE,
                compose: Compose::Over,
            },
        };
        let mut s = Surface::new(9, 9);
        op.draw_on(&mut s, VecI::ZERO);
        // Corners are outside, center is filled, edge midpoints are outline.
        assert_eq!(s.get(VecI::new(0, 0)), Some(Color::TRANSPARENT));
        assert_eq!(s.get(VecI::new(8, 8)), Some(Color::TRANSPARENT));
        assert_eq!(s.get(VecI::new(4, 4)), Some(Color::WHITE));
        assert_eq!(s.get(VecI::new(0, 4)), Some(Color::BLACK));
        assert_eq!(s.get(VecI::new(4, 8)), Some(Color::BLACK));
        // Symmetric.
        for y in 0..9 {
            for x in 0..9 {
                assert_eq!(
                    s.get(VecI::new(x, y)),
                    s.get(VecI::new(8 - x, y)),
                    "asymmetric at {x},{y}"
                );
            }
        }
    }
    #[test]
    fn affected_without_false_negatives() {
        let size = crate::raster::FULL_CHUNK_SIZE as i32;
        let op = EllipseOp {
            rect: RectI::new(VecI::new(-2 * size, -2 * size), VecI::new(4 * size, 4 * size)),
            style: ShapeStyle::default(),
        };
        let affected = op.affected_chunks();
        // Hollow, some interior chunks can be skipped.
        assert!(affected.len() < 16);
        let grid = (-2..2).flat_map(|y| (-2..2).map(move |x| VecI::new(x, y)));
        for pos in grid {
            let mut chunk = Surface::new(size as usize, size as usize);
            op.draw_on(&mut chunk, pos.chunk_origin());
            if !chunk.is_fully_transparent() {
                assert!(affected.contains(&pos), "missed chunk {pos:?}");
            }
        }
    }
}
