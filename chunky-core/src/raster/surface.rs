use crate::{
    blend::Compose,
    color::Color,
    geometry::{RectI, VecI},
};

/// An owned, dense rectangle of premultiplied pixels, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}
impl Surface {
    /// Create a fully transparent surface.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width * height],
        }
    }
    /// Wrap existing pixels. `None` if the length doesn't match the size.
    #[must_use]
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Option<Self> {
        (pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }
    #[must_use]
    pub fn size(&self) -> VecI {
        use az::SaturatingAs;
        VecI::new(self.width.saturating_as(), self.height.saturating_as())
    }
    /// The area of this surface in its own coordinates.
    #[must_use]
    pub fn bounds(&self) -> RectI {
        RectI::new(VecI::ZERO, self.size())
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    fn index(&self, pos: VecI) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }
    #[must_use]
    pub fn get(&self, pos: VecI) -> Option<Color> {
        self.index(pos).map(|idx| self.pixels[idx])
    }
    /// Overwrite a pixel. Out of bounds writes are ignored.
    pub fn set(&mut self, pos: VecI, color: Color) {
        if let Some(idx) = self.index(pos) {
            self.pixels[idx] = color;
        }
    }
    /// Combine a pixel with `color`. Out of bounds writes are ignored.
    pub fn blend_pixel(&mut self, pos: VecI, color: Color, compose: Compose) {
        if let Some(idx) = self.index(pos) {
            let dst = &mut self.pixels[idx];
            *dst = compose.apply(color, *dst);
        }
    }
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }
    #[must_use]
    pub fn is_fully_transparent(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }
    /// Combine every pixel of `rect` with `color`, clipped to the surface.
    pub fn fill_rect(&mut self, rect: RectI, color: Color, compose: Compose) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() || (color.is_transparent() && compose.transparent_is_noop()) {
            return;
        }
        // Bounds checked by the intersect above.
        #[allow(clippy::cast_sign_loss)]
        let (left, right, top, bottom) = (
            rect.left as usize,
            rect.right as usize,
            rect.top as usize,
            rect.bottom as usize,
        );
        let overwrite = match compose {
            Compose::Replace => true,
            Compose::Over => color.alpha() == 255,
            Compose::Erase => false,
        };
        for y in top..bottom {
            let row = &mut self.pixels[y * self.width + left..y * self.width + right];
            if overwrite {
                row.fill(color);
            } else {
                for dst in row {
                    *dst = compose.apply(color, *dst);
                }
            }
        }
    }
    /// Combine `src` onto self, with `src`'s top left placed at `at`.
    pub fn draw_surface(&mut self, src: &Surface, at: VecI, compose: Compose) {
        self.draw_surface_rect(src, src.bounds(), at, compose);
    }
    /// Combine the `src_rect` area of `src` onto self, with `src_rect`'s top left placed at `at`.
    pub fn draw_surface_rect(
        &mut self,
        src: &Surface,
        src_rect: RectI,
        at: VecI,
        compose: Compose,
    ) {
        // Maps src coordinates to self coordinates.
        let offset = at - src_rect.pos();
        let dst_rect = src_rect
            .intersect(&src.bounds())
            .translate(offset)
            .intersect(&self.bounds());
        if dst_rect.is_empty() {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let width = dst_rect.width() as usize;
        for y in dst_rect.top..dst_rect.bottom {
            #[allow(clippy::cast_sign_loss)]
            let (dst_start, src_start) = (
                y as usize * self.width + dst_rect.left as usize,
                (y - offset.y) as usize * src.width + (dst_rect.left - offset.x) as usize,
            );
            let dst_row = &mut self.pixels[dst_start..dst_start + width];
            let src_row = &src.pixels[src_start..src_start + width];
            if compose == Compose::Replace {
                dst_row.copy_from_slice(src_row);
            } else {
                for (dst, src) in dst_row.iter_mut().zip(src_row) {
                    *dst = compose.apply(*src, *dst);
                }
            }
        }
    }
    /// Box filter self down into `dst`. `dst` must evenly divide self's size.
    pub fn downsample_into(&self, dst: &mut Surface) {
        let factor = self.width / dst.width.max(1);
        debug_assert_eq!(factor * dst.width, self.width);
        debug_assert_eq!(factor * dst.height, self.height);
        let area = (factor * factor) as u32;
        for dy in 0..dst.height {
            for dx in 0..dst.width {
                let mut sum = [0u32; 4];
                for sy in dy * factor..(dy + 1) * factor {
                    let row = &self.pixels[sy * self.width + dx * factor..][..factor];
                    for px in row {
                        for (s, c) in sum.iter_mut().zip(px.0) {
                            *s += u32::from(c);
                        }
                    }
                }
                // Averaging premultiplied values keeps them premultiplied.
                #[allow(clippy::cast_possible_truncation)]
                let avg = sum.map(|s| ((s + area / 2) / area) as u8);
                dst.pixels[dy * dst.width + dx] = Color(avg);
            }
        }
    }
    /// Take the pixel buffer, leaving self empty. Used to recycle chunk buffers.
    pub(crate) fn take_buffer(&mut self) -> Vec<Color> {
        self.width = 0;
        self.height = 0;
        std::mem::take(&mut self.pixels)
    }
}
impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn fill_clipped() {
        let mut s = Surface::new(4, 4);
        s.fill_rect(
            RectI::new(VecI::new(-2, 2), VecI::new(4, 10)),
            Color::WHITE,
            Compose::Over,
        );
        assert_eq!(s.get(VecI::new(0, 2)), Some(Color::WHITE));
        assert_eq!(s.get(VecI::new(1, 3)), Some(Color::WHITE));
        assert_eq!(s.get(VecI::new(2, 2)), Some(Color::TRANSPARENT));
        assert_eq!(s.get(VecI::new(0, 1)), Some(Color::TRANSPARENT));
        assert_eq!(s.get(VecI::new(4, 0)), None);
    }
    #[test]
    fn draw_offset() {
        let mut src = Surface::new(2, 2);
        src.set(VecI::new(1, 1), Color::BLACK);
        let mut dst = Surface::new(3, 3);
        dst.draw_surface(&src, VecI::new(1, 1), Compose::Over);
        assert_eq!(dst.get(VecI::new(2, 2)), Some(Color::BLACK));
        assert_eq!(
            dst.pixels().iter().filter(|c| !c.is_transparent()).count(),
            1
        );
        // Replace copies transparency too.
        dst.draw_surface(&Surface::new(4, 4), VecI::new(-1, -1), Compose::Replace);
        assert!(dst.is_fully_transparent());
    }
    #[test]
    fn draw_sub_rect() {
        let mut src = Surface::new(4, 4);
        src.fill_rect(src.bounds(), Color::WHITE, Compose::Replace);
        let mut dst = Surface::new(4, 4);
        dst.draw_surface_rect(
            &src,
            RectI::new(VecI::new(2, 2), VecI::new(4, 4)),
            VecI::ZERO,
            Compose::Over,
        );
        // Only the 2x2 of the rect that lies within src is drawn.
        assert_eq!(
            dst.pixels().iter().filter(|c| !c.is_transparent()).count(),
            4
        );
        assert_eq!(dst.get(VecI::new(1, 1)), Some(Color::WHITE));
    }
    #[test]
    fn downsample_average() {
        let mut src = Surface::new(4, 2);
        src.fill_rect(
            RectI::new(VecI::ZERO, VecI::new(1, 2)),
            Color::WHITE,
            Compose::Replace,
        );
        let mut dst = Surface::new(2, 1);
        src.downsample_into(&mut dst);
        // Half of a 2x2 block is white.
        assert_eq!(dst.get(VecI::new(0, 0)), Some(Color([128; 4])));
        assert_eq!(dst.get(VecI::new(1, 0)), Some(Color::TRANSPARENT));
    }
}
