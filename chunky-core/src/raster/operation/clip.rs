use crate::{
    blend::lerp,
    color::mul_u8,
    geometry::VecI,
    raster::{Chunk, ChunkyImage},
};

/// A frozen copy of an image's alpha, restricting where later operations may draw.
/// Where the mask has no chunk, nothing is drawn at all.
pub struct ClipMask {
    chunks: hashbrown::HashMap<VecI, Chunk>,
}
impl ClipMask {
    /// Snapshot the committed pixels of `image`.
    #[must_use]
    pub fn from_committed(image: &ChunkyImage) -> Self {
        Self {
            chunks: image
                .committed_chunks()
                .map(|(pos, chunk)| (pos, chunk.clone()))
                .collect(),
        }
    }
    #[must_use]
    pub fn chunk(&self, pos: VecI) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }
    /// Whether the mask hides everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
impl std::fmt::Debug for ClipMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipMask")
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

/// Blend `drawn` back into `target`, weighted by the product of every mask's alpha.
pub(crate) fn apply_masked(target: &mut Chunk, drawn: &Chunk, masks: &[&Chunk]) {
    let target = target.surface_mut().pixels_mut();
    for (idx, (dst, src)) in target.iter_mut().zip(drawn.surface().pixels()).enumerate() {
        let weight = masks.iter().fold(255u8, |acc, mask| {
            mul_u8(acc, mask.surface().pixels()[idx].alpha())
        });
        *dst = lerp(*dst, *src, weight);
    }
}
