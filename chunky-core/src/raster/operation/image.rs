use super::ChunkSet;
use crate::{
    blend::Compose,
    geometry::{RectI, VecI},
    raster::Surface,
};

/// Blit of an owned surface, top left at `pos`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageOp {
    pub surface: Surface,
    pub pos: VecI,
    pub compose: Compose,
}
impl ImageOp {
    pub(super) fn affected_chunks(&self) -> ChunkSet {
        RectI::new(self.pos, self.surface.size())
            .chunks_touching()
            .collect()
    }
    pub(super) fn draw_on(&self, surface: &mut Surface, offset: VecI) {
        surface.draw_surface(&self.surface, self.pos - offset, self.compose);
    }
}
