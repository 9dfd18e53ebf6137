use crate::color::{mul_u8, Color};

/// How a structure member's pixels combine with those beneath it when composited.
/// Compositing itself lives outside of this crate, this is only the member property.
#[derive(strum::AsRefStr, PartialEq, Eq, strum::EnumIter, Copy, Clone, Hash, Debug, Default)]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Overlay,
}

/// How a draw operation combines its source pixels with the destination chunk.
#[derive(strum::AsRefStr, PartialEq, Eq, strum::EnumIter, Copy, Clone, Hash, Debug, Default)]
pub enum Compose {
    /// Source over destination.
    #[default]
    Over,
    /// Source replaces destination, including alpha.
    Replace,
    /// Destination is removed wherever source has coverage. Source color is ignored.
    Erase,
}
impl Compose {
    #[must_use]
    pub fn apply(self, src: Color, dst: Color) -> Color {
        match self {
            Self::Over => {
                let inv = 255 - src.alpha();
                let mut out = [0; 4];
                for ((o, s), d) in out.iter_mut().zip(src.0).zip(dst.0) {
                    // Premultiplied, cannot exceed 255.
                    *o = s.saturating_add(mul_u8(d, inv));
                }
                Color(out)
            }
            Self::Replace => src,
            Self::Erase => dst.scale(255 - src.alpha()),
        }
    }
    /// Whether drawing a fully transparent source leaves the destination untouched.
    #[must_use]
    pub fn transparent_is_noop(self) -> bool {
        match self {
            Self::Over | Self::Erase => true,
            Self::Replace => false,
        }
    }
}

/// Linear interpolation from `from` to `to` by `t / 255`.
#[must_use]
pub fn lerp(from: Color, to: Color, t: u8) -> Color {
    match t {
        0 => from,
        255 => to,
        t => {
            let t = i32::from(t);
            let mut out = [0u8; 4];
            for ((o, a), b) in out.iter_mut().zip(from.0).zip(to.0) {
                let (a, b) = (i32::from(a), i32::from(b));
                let delta = (b - a) * t;
                // Round half away from zero.
                let step = (delta + delta.signum() * 127) / 255;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    *o = (a + step).clamp(0, 255) as u8;
                }
            }
            // Rounding may leave a channel a hair above alpha, which premultiplied forbids.
            let alpha = out[3];
            for c in &mut out[..3] {
                *c = (*c).min(alpha);
            }
            Color(out)
        }
    }
}
