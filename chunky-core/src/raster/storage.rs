use super::{Chunk, ChunkyImage};
use crate::geometry::VecI;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("chunk storage was used after being disposed")]
    Disposed,
}

/// A private copy of some of an image's committed chunks, for putting them back later.
///
/// Coordinates that had no chunk at capture time are remembered as such, so that restoring also
/// removes anything drawn there since.
pub struct CommittedChunkStorage {
    /// `None` once disposed.
    chunks: Option<hashbrown::HashMap<VecI, Option<Chunk>>>,
}
impl CommittedChunkStorage {
    /// Deep copy the committed chunks at `positions`.
    pub fn new(image: &ChunkyImage, positions: impl IntoIterator<Item = VecI>) -> Self {
        let mut chunks = hashbrown::HashMap::new();
        for pos in positions {
            chunks.insert(pos, image.committed_chunk(pos).cloned());
        }
        let storage = Self {
            chunks: Some(chunks),
        };
        log::debug!(
            "Stored {} chunk positions ({})",
            storage.len(),
            human_bytes::human_bytes(storage.byte_size() as f64)
        );
        storage
    }
    /// Queue the stored pixels back into `image`. The caller commits.
    ///
    /// Stored pixels replace what's there exactly, and positions stored empty are dropped.
    pub fn apply_chunks_to_image(&self, image: &mut ChunkyImage) -> Result<(), StorageError> {
        let chunks = self.chunks.as_ref().ok_or(StorageError::Disposed)?;
        for (&pos, chunk) in chunks {
            image.restore_chunk(pos, chunk.clone());
        }
        Ok(())
    }
    /// Release the stored chunks. Repeated calls do nothing.
    pub fn dispose(&mut self) {
        if self.chunks.is_some() {
            log::debug!(
                "Disposing chunk storage ({})",
                human_bytes::human_bytes(self.byte_size() as f64)
            );
        }
        self.chunks = None;
    }
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.chunks.is_none()
    }
    /// Number of positions stored, with or without a chunk.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.as_ref().map_or(0, hashbrown::HashMap::len)
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Size of the stored pixel data.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.chunks.as_ref().map_or(0, |chunks| {
            chunks.values().flatten().map(Chunk::byte_size).sum()
        })
    }
    /// The stored copy at `pos`, if one was taken and still held.
    #[must_use]
    pub fn stored_chunk(&self, pos: VecI) -> Option<&Chunk> {
        self.chunks.as_ref()?.get(&pos)?.as_ref()
    }
}
impl std::fmt::Debug for CommittedChunkStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommittedChunkStorage")
            .field("positions", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        color::Color,
        geometry::RectI,
        raster::operation::{ShapeStyle, StrokeStyle},
    };

    fn fill(color: Color) -> ShapeStyle {
        ShapeStyle {
            stroke_width: 0,
            fill_color: color,
            ..ShapeStyle::default()
        }
    }

    #[test]
    fn restores_exactly() {
        let mut image = ChunkyImage::new();
        image.draw_ellipse(
            RectI::new(VecI::new(-30, -30), VecI::new(60, 50)),
            ShapeStyle {
                fill_color: Color([10, 20, 30, 40]),
                ..ShapeStyle::default()
            },
        );
        image.commit_changes();
        let before: Vec<_> = {
            let mut v: Vec<_> = image
                .committed_chunks()
                .map(|(pos, c)| (pos, c.as_bytes().to_vec()))
                .collect();
            v.sort_by_key(|(pos, _)| *pos);
            v
        };

        image.draw_line(VecI::new(-400, 0), VecI::new(400, 3), StrokeStyle::default());
        let storage = CommittedChunkStorage::new(&image, image.find_affected_chunks());
        image.commit_changes();
        assert_eq!(image.find_committed_chunks().len(), 6);

        storage.apply_chunks_to_image(&mut image).unwrap();
        image.commit_changes();
        let mut after: Vec<_> = image
            .committed_chunks()
            .map(|(pos, c)| (pos, c.as_bytes().to_vec()))
            .collect();
        after.sort_by_key(|(pos, _)| *pos);
        assert_eq!(before, after);
    }
    #[test]
    fn snapshot_is_independent() {
        let mut image = ChunkyImage::new();
        image.draw_rectangle(RectI::new(VecI::ZERO, VecI::new(3, 3)), fill(Color::WHITE));
        image.commit_changes();

        let storage = CommittedChunkStorage::new(&image, [VecI::ZERO]);
        image.draw_rectangle(RectI::new(VecI::ZERO, VecI::new(3, 3)), fill(Color::BLACK));
        image.commit_changes();

        let stored = storage.stored_chunk(VecI::ZERO).unwrap();
        assert_eq!(stored.surface().get(VecI::new(1, 1)), Some(Color::WHITE));
        assert_eq!(image.get_committed_pixel(VecI::new(1, 1)), Color::BLACK);
    }
    #[test]
    fn restores_after_clear() {
        let mut image = ChunkyImage::new();
        image.draw_rectangle(RectI::new(VecI::new(5, 5), VecI::new(3, 3)), fill(Color::WHITE));
        image.commit_changes();

        image.clear();
        let storage = CommittedChunkStorage::new(&image, image.find_affected_chunks());
        image.commit_changes();
        assert!(image.check_if_committed_is_empty());

        storage.apply_chunks_to_image(&mut image).unwrap();
        image.commit_changes();
        assert_eq!(image.get_committed_pixel(VecI::new(6, 6)), Color::WHITE);
    }
    #[test]
    fn restores_at_far_edge() {
        let mut image = ChunkyImage::new();
        let far = RectI::new(VecI::new(i32::MAX - 100, i32::MAX - 100), VecI::new(10, 10));
        let storage = CommittedChunkStorage::new(&image, far.chunks_touching());
        image.draw_rectangle(far, fill(Color::WHITE));
        image.commit_changes();
        assert_eq!(image.find_committed_chunks().len(), 1);

        storage.apply_chunks_to_image(&mut image).unwrap();
        image.commit_changes();
        assert!(image.check_if_committed_is_empty());
        assert_eq!(image.find_chunk_aligned_committed_bounds(), None);
    }
    #[test]
    fn disposed_is_error() {
        let image = ChunkyImage::new();
        let mut storage = CommittedChunkStorage::new(&image, [VecI::ZERO, VecI::new(1, 0)]);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.byte_size(), 0);
        storage.dispose();
        storage.dispose();
        assert!(storage.is_disposed());
        let mut target = ChunkyImage::new();
        assert!(matches!(
            storage.apply_chunks_to_image(&mut target),
            Err(StorageError::Disposed)
        ));
        assert_eq!(target.queue_len(), 0);
    }
}
