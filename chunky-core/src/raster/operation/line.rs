use super::{ChunkSet, StrokeStyle};
use crate::{
    geometry::{RectI, VecI},
    raster::Surface,
};

/// Connected line segments, stamped with a square brush at every Bresenham step.
/// Each pixel is covered at most once per operation, even where segments overlap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolylineOp {
    pub points: smallvec::SmallVec<[VecI; 2]>,
    pub style: StrokeStyle,
}
impl PolylineOp {
    #[must_use]
    pub fn line(from: VecI, to: VecI, style: StrokeStyle) -> Self {
        Self {
            points: smallvec::smallvec![from, to],
            style,
        }
    }
    fn stamp(&self, center: VecI) -> RectI {
        let width = self.style.width.max(1);
        let half = (width - 1) / 2;
        RectI::new(center - VecI::new(half, half), VecI::new(width, width))
    }
    /// Visit every stamp position along the path. Shared endpoints are visited twice.
    fn for_each_step(&self, mut f: impl FnMut(VecI)) {
        match self.points.as_slice() {
            [] => (),
            [only] => f(*only),
            points => {
                for segment in points.windows(2) {
                    bresenham(segment[0], segment[1], &mut f);
                }
            }
        }
    }
    /// Bounding box of everything this path can cover.
    fn bounds(&self) -> RectI {
        self.points
            .iter()
            .fold(RectI::EMPTY, |acc, p| acc.union(&self.stamp(*p)))
    }
    pub(super) fn affected_chunks(&self) -> ChunkSet {
        let mut chunks = ChunkSet::new();
        self.for_each_step(|p| chunks.extend(self.stamp(p).chunks_touching()));
        chunks
    }
    pub(super) fn draw_on(&self, surface: &mut Surface, offset: VecI) {
        let local_bounds = surface.bounds();
        if self.bounds().translate(-offset).intersect(&local_bounds).is_empty() {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let width = local_bounds.width() as usize;
        let mut coverage = vec![false; surface.pixels().len()];
        self.for_each_step(|p| {
            let stamp = self.stamp(p).translate(-offset).intersect(&local_bounds);
            if stamp.is_empty() {
                return;
            }
            for y in stamp.top..stamp.bottom {
                #[allow(clippy::cast_sign_loss)]
                let row = y as usize * width;
                #[allow(clippy::cast_sign_loss)]
                coverage[row + stamp.left as usize..row + stamp.right as usize].fill(true);
            }
        });
        let StrokeStyle { color, compose, .. } = self.style;
        for (dst, covered) in surface.pixels_mut().iter_mut().zip(coverage) {
            if covered {
                *dst = compose.apply(color, *dst);
            }
        }
    }
}

/// All integer points on the segment from `a` to `b` inclusive.
fn bresenham(a: VecI, b: VecI, f: &mut impl FnMut(VecI)) {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut p = a;
    loop {
        f(p);
        if p == b {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{blend::Compose, color::Color};

    fn covered(s: &Surface) -> usize {
        s.pixels().iter().filter(|c| !c.is_transparent()).count()
    }
    #[test]
    fn diagonal() {
        let mut points = vec![];
        bresenham(VecI::new(0, 0), VecI::new(3, 3), &mut |p| points.push(p));
        assert_eq!(points.len(), 4);
        assert_eq!(points[3], VecI::new(3, 3));

        let mut points = vec![];
        bresenham(VecI::new(5, 1), VecI::new(0, 0), &mut |p| points.push(p));
        assert_eq!(points.len(), 6);
        assert_eq!(points[0], VecI::new(5, 1));
        assert_eq!(points[5], VecI::new(0, 0));
    }
    #[test]
    fn wide_stroke() {
        let op = PolylineOp::line(
            VecI::new(2, 2),
            VecI::new(6, 2),
            StrokeStyle {
                width: 3,
                ..StrokeStyle::default()
            },
        );
        let mut s = Surface::new(10, 10);
        op.draw_on(&mut s, VecI::ZERO);
        // 3 rows of 7 pixels.
        assert_eq!(covered(&s), 21);
        assert_eq!(s.get(VecI::new(1, 1)), Some(Color::BLACK));
        assert_eq!(s.get(VecI::new(7, 3)), Some(Color::BLACK));
    }
    #[test]
    fn overlap_blends_once() {
        let half = Color([0, 0, 0, 128]);
        let op = PolylineOp {
            points: smallvec::smallvec![VecI::new(0, 0), VecI::new(4, 0), VecI::new(0, 0)],
            style: StrokeStyle {
                width: 1,
                color: half,
                compose: Compose::Over,
            },
        };
        let mut s = Surface::new(5, 1);
        op.draw_on(&mut s, VecI::ZERO);
        assert!(s.pixels().iter().all(|&c| c == half));
    }
    #[test]
    fn chunk_boundary() {
        let size = crate::raster::FULL_CHUNK_SIZE as i32;
        let op = PolylineOp::line(
            VecI::new(-1, 0),
            VecI::new(size, 0),
            StrokeStyle::default(),
        );
        let affected = op.affected_chunks();
        assert_eq!(affected.len(), 3);
        assert!(affected.contains(&VecI::new(-1, 0)));
        assert!(affected.contains(&VecI::new(1, 0)));

        let mut s = Surface::new(size as usize, size as usize);
        op.draw_on(&mut s, VecI::new(size, 0));
        assert_eq!(covered(&s), 1);
    }
    #[test]
    fn single_point() {
        let op = PolylineOp {
            points: smallvec::smallvec![VecI::new(1, 1)],
            style: StrokeStyle::default(),
        };
        let mut s = Surface::new(3, 3);
        op.draw_on(&mut s, VecI::ZERO);
        assert_eq!(covered(&s), 1);
        assert_eq!(op.affected_chunks().len(), 1);
    }
}
