//! Recycling of chunk pixel buffers.
//!
//! Live preview churns through chunks at pointer-move frequency. Rather than returning their buffers
//! to the allocator, dropped chunks hand them back here for the next chunk of the same resolution.

use super::ChunkResolution;
use crate::{color::Color, config::ChunkPoolConfig};

pub struct ChunkPool {
    /// Free buffers, indexed by resolution.
    free: parking_lot::Mutex<[Vec<Vec<Color>>; ChunkResolution::COUNT]>,
    max_retained: std::sync::atomic::AtomicUsize,
}
impl ChunkPool {
    #[must_use]
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: parking_lot::Mutex::new(Default::default()),
            max_retained: max_retained.into(),
        }
    }
    /// The pool shared by every chunk in the process.
    pub fn global() -> &'static Self {
        static GLOBAL_POOL: std::sync::OnceLock<ChunkPool> = std::sync::OnceLock::new();
        GLOBAL_POOL.get_or_init(|| Self::new(ChunkPoolConfig::default().max_retained_chunks))
    }
    /// Apply settings to the global pool.
    pub fn configure(config: &ChunkPoolConfig) {
        Self::global().set_max_retained(config.max_retained_chunks);
    }
    /// Change the retention cap, releasing any excess buffers.
    pub fn set_max_retained(&self, max_retained: usize) {
        self.max_retained
            .store(max_retained, std::sync::atomic::Ordering::Relaxed);
        let mut free = self.free.lock();
        for list in free.iter_mut() {
            list.truncate(max_retained);
        }
    }
    /// Get a buffer sized for a chunk of `resolution`. Contents are unspecified.
    #[must_use]
    pub fn take(&self, resolution: ChunkResolution) -> Vec<Color> {
        let reused = self.free.lock()[resolution as usize].pop();
        if let Some(buffer) = reused {
            log::trace!("Reusing pooled {resolution:?} chunk buffer");
            buffer
        } else {
            let side = resolution.pixel_size();
            vec![Color::TRANSPARENT; side * side]
        }
    }
    /// Return a buffer for reuse. Buffers of the wrong size are dropped.
    pub fn give_back(&self, resolution: ChunkResolution, buffer: Vec<Color>) {
        let side = resolution.pixel_size();
        if buffer.len() != side * side {
            return;
        }
        let max = self.max_retained.load(std::sync::atomic::Ordering::Relaxed);
        let mut free = self.free.lock();
        let list = &mut free[resolution as usize];
        if list.len() < max {
            list.push(buffer);
        }
    }
    /// Number of buffers currently held for reuse.
    #[must_use]
    pub fn retained(&self, resolution: ChunkResolution) -> usize {
        self.free.lock()[resolution as usize].len()
    }
}
