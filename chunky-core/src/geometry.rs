//! Integer geometry on the infinite pixel plane and on the chunk grid laid over it.

use crate::raster::FULL_CHUNK_SIZE;

/// An integer 2D vector. Used for both pixel positions and chunk coordinates,
/// depending on context.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct VecI {
    pub x: i32,
    pub y: i32,
}
impl VecI {
    pub const ZERO: Self = Self { x: 0, y: 0 };
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    /// The chunk coordinate containing this pixel.
    #[must_use]
    pub const fn chunk_of(self) -> Self {
        let size = FULL_CHUNK_SIZE as i32;
        Self {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }
    /// Position of this pixel relative to the top left of its chunk.
    #[must_use]
    pub const fn within_chunk(self) -> Self {
        let size = FULL_CHUNK_SIZE as i32;
        Self {
            x: self.x.rem_euclid(size),
            y: self.y.rem_euclid(size),
        }
    }
    /// Treating self as a chunk coordinate, the pixel position of its top left corner.
    #[must_use]
    pub const fn chunk_origin(self) -> Self {
        let size = FULL_CHUNK_SIZE as i32;
        Self {
            x: self.x.saturating_mul(size),
            y: self.y.saturating_mul(size),
        }
    }
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }
}
impl std::ops::Add for VecI {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}
impl std::ops::Sub for VecI {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}
impl std::ops::Mul<i32> for VecI {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x.saturating_mul(rhs), self.y.saturating_mul(rhs))
    }
}
impl std::ops::Neg for VecI {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}
impl From<(i32, i32)> for VecI {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Half-open integer rectangle, `[left, right) x [top, bottom)`.
///
/// A rectangle with `right <= left` or `bottom <= top` is empty. All operations accept
/// empty rectangles and treat them as containing nothing.
///
/// Arithmetic saturates at the edges of `i32`, so the last pixel row and column of the plane
/// can't be covered.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct RectI {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}
impl RectI {
    pub const EMPTY: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };
    /// Rectangle at `pos` with `size`. Negative sizes extend left/up from `pos`.
    #[must_use]
    pub fn new(pos: VecI, size: VecI) -> Self {
        let a = pos;
        let b = pos + size;
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }
    /// The smallest rectangle covering both pixels, inclusive.
    #[must_use]
    pub fn from_pixels(a: VecI, b: VecI) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            left: min.x,
            top: min.y,
            right: max.x.saturating_add(1),
            bottom: max.y.saturating_add(1),
        }
    }
    /// The pixel area covered by one Full resolution chunk.
    #[must_use]
    pub fn of_chunk(chunk: VecI) -> Self {
        let origin = chunk.chunk_origin();
        let size = FULL_CHUNK_SIZE as i32;
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x.saturating_add(size),
            bottom: origin.y.saturating_add(size),
        }
    }
    #[must_use]
    pub fn pos(&self) -> VecI {
        VecI::new(self.left, self.top)
    }
    #[must_use]
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).max(0)
    }
    #[must_use]
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).max(0)
    }
    #[must_use]
    pub fn size(&self) -> VecI {
        VecI::new(self.width(), self.height())
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
    #[must_use]
    pub fn contains(&self, p: VecI) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
    /// Whether `other` lies entirely inside self. Empty rectangles are inside everything.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.is_empty()
            || (other.left >= self.left
                && other.right <= self.right
                && other.top >= self.top
                && other.bottom <= self.bottom)
    }
    /// Overlapping area. The result may be empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }
    /// Bounding rectangle of both. Empty operands are ignored.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
    /// Grow each edge outward by `amount`. Negative values shrink.
    #[must_use]
    pub fn inflate(&self, amount: i32) -> Self {
        Self {
            left: self.left.saturating_sub(amount),
            top: self.top.saturating_sub(amount),
            right: self.right.saturating_add(amount),
            bottom: self.bottom.saturating_add(amount),
        }
    }
    #[must_use]
    pub fn translate(&self, by: VecI) -> Self {
        Self {
            left: self.left.saturating_add(by.x),
            top: self.top.saturating_add(by.y),
            right: self.right.saturating_add(by.x),
            bottom: self.bottom.saturating_add(by.y),
        }
    }
    /// Every chunk coordinate sharing at least one pixel with this rect.
    pub fn chunks_touching(&self) -> impl Iterator<Item = VecI> {
        let (min, max) = if self.is_empty() {
            // Iterate an empty range.
            (VecI::ZERO, VecI::new(-1, -1))
        } else {
            (
                self.pos().chunk_of(),
                VecI::new(self.right - 1, self.bottom - 1).chunk_of(),
            )
        };
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| VecI::new(x, y)))
    }
    /// Every chunk coordinate whose whole area lies inside this rect.
    pub fn chunks_fully_inside(&self) -> impl Iterator<Item = VecI> {
        let size = FULL_CHUNK_SIZE as i32;
        // Round inward to the chunk grid.
        let min_x = self.left.div_euclid(size) + i32::from(self.left.rem_euclid(size) != 0);
        let min_y = self.top.div_euclid(size) + i32::from(self.top.rem_euclid(size) != 0);
        let max_x = self.right.div_euclid(size);
        let max_y = self.bottom.div_euclid(size);
        let empty = self.is_empty();
        (min_y..max_y)
            .filter(move |_| !empty)
            .flat_map(move |y| (min_x..max_x).map(move |x| VecI::new(x, y)))
    }
}
