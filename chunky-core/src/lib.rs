//! Document engine for a pixel editor: sparse chunked raster images with commit/cancel drawing, and
//! exactly reversible changes with undo/redo on top of them.

pub mod actions;
pub mod blend;
pub mod changes;
pub mod color;
pub mod config;
pub mod geometry;
pub mod id;
pub mod queue;
pub mod raster;
pub mod state;

pub use id::LocalID;
