use super::{ChunkPool, Surface, FULL_CHUNK_SIZE};

/// Detail level of a chunk. Every level covers the same area of the canvas,
/// lower levels with fewer pixels.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    strum::EnumIter,
    strum::AsRefStr,
    PartialOrd,
    Ord,
)]
#[repr(u8)]
pub enum ChunkResolution {
    #[default]
    Full,
    Half,
    Quarter,
    Eighth,
}
impl ChunkResolution {
    pub const COUNT: usize = 4;
    /// How many Full pixels span one pixel of this level, along each axis.
    #[must_use]
    pub const fn divisor(self) -> usize {
        match self {
            Self::Full => 1,
            Self::Half => 2,
            Self::Quarter => 4,
            Self::Eighth => 8,
        }
    }
    /// Scale factor relative to Full.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        1.0 / self.divisor() as f64
    }
    /// Side length, in pixels, of a chunk at this level.
    #[must_use]
    pub const fn pixel_size(self) -> usize {
        FULL_CHUNK_SIZE / self.divisor()
    }
}

/// One square tile of pixels.
///
/// Buffers come from and return to the global [`ChunkPool`]. Cloning makes a fully independent copy.
pub struct Chunk {
    surface: Surface,
    resolution: ChunkResolution,
}
impl Chunk {
    /// A fully transparent chunk.
    #[must_use]
    pub fn new(resolution: ChunkResolution) -> Self {
        let mut chunk = Self::uninit(resolution);
        chunk.surface.clear();
        chunk
    }
    /// Pooled chunk with unspecified (but initialized) contents.
    fn uninit(resolution: ChunkResolution) -> Self {
        let side = resolution.pixel_size();
        let buffer = ChunkPool::global().take(resolution);
        Self {
            // Pool only hands out correctly sized buffers.
            surface: Surface::from_pixels(side, side, buffer)
                .unwrap_or_else(|| Surface::new(side, side)),
            resolution,
        }
    }
    #[must_use]
    pub fn resolution(&self) -> ChunkResolution {
        self.resolution
    }
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.surface.as_bytes()
    }
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.as_bytes().len()
    }
    #[must_use]
    pub fn is_fully_transparent(&self) -> bool {
        self.surface.is_fully_transparent()
    }
    /// Overwrite self's pixels with another chunk's. Both must share a resolution.
    pub fn copy_from(&mut self, other: &Chunk) {
        debug_assert_eq!(self.resolution, other.resolution);
        self.surface
            .pixels_mut()
            .copy_from_slice(other.surface.pixels());
    }
    /// Derive a lower detail copy of this chunk. `resolution` must not be more detailed than self.
    #[must_use]
    pub fn downsample(&self, resolution: ChunkResolution) -> Chunk {
        if resolution == self.resolution {
            return self.clone();
        }
        debug_assert!(resolution > self.resolution);
        let mut out = Self::uninit(resolution);
        self.surface.downsample_into(&mut out.surface);
        out
    }
}
impl Clone for Chunk {
    fn clone(&self) -> Self {
        let mut chunk = Self::uninit(self.resolution);
        chunk.copy_from(self);
        chunk
    }
}
impl Drop for Chunk {
    fn drop(&mut self) {
        ChunkPool::global().give_back(self.resolution, self.surface.take_buffer());
    }
}
impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}
