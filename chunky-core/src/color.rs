/// A premultiplied, 8-bit-per-channel RGBA color.
///
/// Premultiplied means each color channel is never greater than alpha. All fully transparent colors
/// are therefore all-zero, which lets a zeroed buffer stand for "nothing here".
#[repr(transparent)]
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Default, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Color(pub [u8; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0; 4]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255; 4]);

    /// Construct from straight (non-premultiplied) channels.
    #[must_use]
    pub fn from_unmultiplied(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([mul_u8(r, a), mul_u8(g, a), mul_u8(b, a), a])
    }
    /// Construct an opaque color.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn alpha(self) -> u8 {
        self.0[3]
    }
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.0[3] == 0
    }
    /// Scale every channel (alpha included) by `factor / 255`.
    #[must_use]
    pub fn scale(self, factor: u8) -> Self {
        let [r, g, b, a] = self.0;
        Self([
            mul_u8(r, factor),
            mul_u8(g, factor),
            mul_u8(b, factor),
            mul_u8(a, factor),
        ])
    }
}

/// `a * b / 255`, rounded to nearest.
#[must_use]
pub fn mul_u8(a: u8, b: u8) -> u8 {
    let t = u32::from(a) * u32::from(b) + 128;
    // ((t >> 8) + t) >> 8 is exact division by 255 with rounding for t in this range.
    #[allow(clippy::cast_possible_truncation)]
    {
        (((t >> 8) + t) >> 8) as u8
    }
}
