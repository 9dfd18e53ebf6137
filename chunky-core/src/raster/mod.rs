//! # Raster
//!
//! Pixels live in square [`Chunk`]s laid out on an infinite grid. A [`ChunkyImage`] owns a sparse
//! map of them, along with a queue of pending draw [`operation`]s that are visible for preview but
//! do not touch the committed pixels until [`ChunkyImage::commit_changes`].

pub mod chunk;
pub mod chunky_image;
pub mod operation;
pub mod pool;
pub mod storage;
pub mod surface;

pub use chunk::{Chunk, ChunkResolution};
pub use chunky_image::ChunkyImage;
pub use pool::ChunkPool;
pub use storage::{CommittedChunkStorage, StorageError};
pub use surface::Surface;

/// Side length, in pixels, of a chunk at [`ChunkResolution::Full`].
pub const FULL_CHUNK_SIZE: usize = 256;
