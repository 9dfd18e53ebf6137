//! Queued draw operations.
//!
//! Every operation knows which chunks it may touch and how to rasterize itself into one Full
//! resolution chunk at a time. Affected chunk sets may contain extra chunks, but never miss one.

pub mod clip;
pub mod ellipse;
pub mod image;
pub mod line;
pub mod rectangle;

pub use clip::ClipMask;
pub use ellipse::EllipseOp;
pub use image::ImageOp;
pub use line::PolylineOp;
pub use rectangle::RectangleOp;

use super::{Chunk, ChunkResolution};
use crate::{
    blend::Compose,
    color::Color,
    geometry::{RectI, VecI},
};

/// Appearance of a closed shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeStyle {
    /// Width of the outline band, inside the shape's bounds.
    pub stroke_width: i32,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub compose: Compose,
}
impl ShapeStyle {
    /// Whether the interior leaves pixels untouched.
    #[must_use]
    pub fn fill_is_noop(&self) -> bool {
        self.fill_color.is_transparent() && self.compose.transparent_is_noop()
    }
}
impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_width: 1,
            stroke_color: Color::BLACK,
            fill_color: Color::TRANSPARENT,
            compose: Compose::Over,
        }
    }
}

/// Appearance of an open stroke.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StrokeStyle {
    /// Side length of the square stamped at each point.
    pub width: i32,
    pub color: Color,
    pub compose: Compose,
}
impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1,
            color: Color::BLACK,
            compose: Compose::Over,
        }
    }
}

pub type ChunkSet = hashbrown::HashSet<VecI>;

#[derive(Debug)]
pub enum Operation {
    Rectangle(RectangleOp),
    Ellipse(EllipseOp),
    Line(PolylineOp),
    Path(PolylineOp),
    Image(ImageOp),
    /// Erase an area to full transparency.
    ClearRegion(RectI),
    /// Erase everything.
    Clear,
    /// Mask every later operation in the queue by this alpha.
    Clip(std::sync::Arc<ClipMask>),
    /// Put one whole chunk back as it was, or drop it when `chunk` is `None`.
    RestoreChunk { pos: VecI, chunk: Option<Chunk> },
}
impl Operation {
    /// Chunks this operation may modify.
    ///
    /// `Clear` depends on the image's contents and `Clip` modifies nothing, so both report no chunks.
    /// The image works out the former itself.
    #[must_use]
    pub fn affected_chunks(&self) -> ChunkSet {
        match self {
            Self::Rectangle(op) => op.affected_chunks(),
            Self::Ellipse(op) => op.affected_chunks(),
            Self::Line(op) | Self::Path(op) => op.affected_chunks(),
            Self::Image(op) => op.affected_chunks(),
            Self::ClearRegion(rect) => rect.chunks_touching().collect(),
            Self::Clear | Self::Clip(_) => ChunkSet::new(),
            Self::RestoreChunk { pos, .. } => std::iter::once(*pos).collect(),
        }
    }
    /// Rasterize into the Full resolution chunk at `chunk_pos`.
    pub fn draw_on_chunk(&self, chunk: &mut Chunk, chunk_pos: VecI) {
        debug_assert_eq!(chunk.resolution(), ChunkResolution::Full);
        let offset = chunk_pos.chunk_origin();
        let surface = chunk.surface_mut();
        match self {
            Self::Rectangle(op) => op.draw_on(surface, offset),
            Self::Ellipse(op) => op.draw_on(surface, offset),
            Self::Line(op) | Self::Path(op) => op.draw_on(surface, offset),
            Self::Image(op) => op.draw_on(surface, offset),
            Self::ClearRegion(rect) => {
                surface.fill_rect(rect.translate(-offset), Color::TRANSPARENT, Compose::Replace);
            }
            Self::Clear => surface.clear(),
            Self::Clip(_) => (),
            Self::RestoreChunk { pos, chunk } => {
                if *pos != chunk_pos {
                    return;
                }
                match chunk {
                    Some(stored) => {
                        surface.draw_surface(stored.surface(), VecI::ZERO, Compose::Replace);
                    }
                    None => surface.clear(),
                }
            }
        }
    }
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "Rectangle",
            Self::Ellipse(_) => "Ellipse",
            Self::Line(_) => "Line",
            Self::Path(_) => "Path",
            Self::Image(_) => "Image",
            Self::ClearRegion(_) => "ClearRegion",
            Self::Clear => "Clear",
            Self::Clip(_) => "Clip",
            Self::RestoreChunk { .. } => "RestoreChunk",
        }
    }
}
