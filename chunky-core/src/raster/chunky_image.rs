use super::{
    operation::{
        clip::apply_masked, ChunkSet, ClipMask, EllipseOp, ImageOp, Operation, PolylineOp,
        RectangleOp, ShapeStyle, StrokeStyle,
    },
    Chunk, ChunkResolution, Surface,
};
use crate::{
    blend::Compose,
    color::Color,
    geometry::{RectI, VecI},
};

type ChunkMap = hashbrown::HashMap<VecI, Chunk>;
/// Mip caches for every level but Full.
type MipMaps = [ChunkMap; ChunkResolution::COUNT - 1];

struct QueuedOperation {
    operation: Operation,
    affected: ChunkSet,
}

/// A sparse, unbounded image made of [`Chunk`]s.
///
/// Drawing only queues operations. They show up immediately in the "most up to date" view for
/// preview, while the committed view stays as it was until [`Self::commit_changes`] bakes them in,
/// or [`Self::cancel_changes`] throws them away.
///
/// Only Full resolution chunks are stored. Lower resolutions are derived on request and cached until
/// the chunk they came from changes.
pub struct ChunkyImage {
    committed: ChunkMap,
    committed_mips: MipMaps,
    queue: Vec<QueuedOperation>,
    /// Preview state of chunks touched by the queue, kept up to date on every enqueue.
    /// `None` is a chunk that has been cleared away. Absent entries are unchanged from committed.
    latest: hashbrown::HashMap<VecI, Option<Chunk>>,
    latest_mips: MipMaps,
    affected_since_commit: ChunkSet,
}
impl Default for ChunkyImage {
    fn default() -> Self {
        Self::new()
    }
}
impl ChunkyImage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            committed: ChunkMap::new(),
            committed_mips: Default::default(),
            queue: Vec::new(),
            latest: hashbrown::HashMap::new(),
            latest_mips: Default::default(),
            affected_since_commit: ChunkSet::new(),
        }
    }
    /// A new image whose committed state is a deep copy of self's committed state.
    /// Pending operations are not carried over.
    #[must_use]
    pub fn clone_from_committed(&self) -> Self {
        Self {
            committed: self.committed.clone(),
            ..Self::new()
        }
    }

    // ======== Drawing ========
    pub fn draw_rectangle(&mut self, rect: RectI, style: ShapeStyle) {
        self.enqueue_with_own_chunks(Operation::Rectangle(RectangleOp { rect, style }));
    }
    pub fn draw_ellipse(&mut self, rect: RectI, style: ShapeStyle) {
        self.enqueue_with_own_chunks(Operation::Ellipse(EllipseOp { rect, style }));
    }
    pub fn draw_line(&mut self, from: VecI, to: VecI, style: StrokeStyle) {
        self.enqueue_with_own_chunks(Operation::Line(PolylineOp::line(from, to, style)));
    }
    pub fn draw_path(&mut self, points: &[VecI], style: StrokeStyle) {
        self.enqueue_with_own_chunks(Operation::Path(PolylineOp {
            points: points.into(),
            style,
        }));
    }
    pub fn draw_image(&mut self, surface: Surface, pos: VecI, compose: Compose) {
        self.enqueue_with_own_chunks(Operation::Image(ImageOp {
            surface,
            pos,
            compose,
        }));
    }
    pub fn clear_region(&mut self, rect: RectI) {
        self.enqueue_with_own_chunks(Operation::ClearRegion(rect));
    }
    /// Erase the whole image.
    pub fn clear(&mut self) {
        let affected = self.find_all_chunks();
        self.enqueue(Operation::Clear, affected);
    }
    /// Replace the chunk at `pos` wholesale, or drop it when `chunk` is `None`.
    pub fn restore_chunk(&mut self, pos: VecI, chunk: Option<Chunk>) {
        self.enqueue_with_own_chunks(Operation::RestoreChunk { pos, chunk });
    }
    /// Restrict every operation queued after this one to `mask`'s alpha.
    /// Lasts until the queue is committed or cancelled.
    pub fn apply_clip(&mut self, mask: std::sync::Arc<ClipMask>) {
        self.enqueue(Operation::Clip(mask), ChunkSet::new());
    }
    fn enqueue_with_own_chunks(&mut self, operation: Operation) {
        let affected = operation.affected_chunks();
        self.enqueue(operation, affected);
    }
    fn enqueue(&mut self, operation: Operation, affected: ChunkSet) {
        log::trace!(
            "Queued {} over {} chunks",
            operation.name(),
            affected.len()
        );
        {
            let Self {
                committed,
                queue,
                latest,
                latest_mips,
                ..
            } = &mut *self;
            let clips: smallvec::SmallVec<[&ClipMask; 1]> = queue
                .iter()
                .filter_map(|queued| match &queued.operation {
                    Operation::Clip(mask) => Some(&**mask),
                    _ => None,
                })
                .collect();
            for &pos in &affected {
                draw_into_latest(committed, latest, latest_mips, pos, &operation, &clips);
            }
        }
        self.affected_since_commit.extend(affected.iter().copied());
        self.queue.push(QueuedOperation {
            operation,
            affected,
        });
    }

    // ======== Commit ========
    /// Bake every queued operation into the committed chunks. Does nothing if the queue is empty.
    pub fn commit_changes(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        let operations = self.queue.len();
        let chunks = self.latest.len();
        for (pos, chunk) in self.latest.drain() {
            for mips in &mut self.committed_mips {
                mips.remove(&pos);
            }
            match chunk {
                Some(chunk) if !chunk.is_fully_transparent() => {
                    self.committed.insert(pos, chunk);
                }
                _ => {
                    self.committed.remove(&pos);
                }
            }
        }
        self.clear_pending();
        log::trace!("Committed {operations} operations over {chunks} chunks");
    }
    /// Throw away every queued operation, leaving the committed chunks untouched.
    pub fn cancel_changes(&mut self) {
        if !self.queue.is_empty() {
            log::trace!("Cancelled {} operations", self.queue.len());
        }
        self.latest.clear();
        self.clear_pending();
    }
    fn clear_pending(&mut self) {
        self.queue.clear();
        self.affected_since_commit.clear();
        for mips in &mut self.latest_mips {
            mips.clear();
        }
    }

    // ======== Queries ========
    /// Number of operations waiting to be committed.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
    /// Chunks that may differ after the queue is committed.
    #[must_use]
    pub fn find_affected_chunks(&self) -> ChunkSet {
        self.affected_since_commit.clone()
    }
    /// Affected chunks whose preview pixels actually differ from the committed ones.
    #[must_use]
    pub fn find_changed_chunks(&self) -> ChunkSet {
        self.affected_since_commit
            .iter()
            .copied()
            .filter(|pos| {
                fn visible(chunk: Option<&Chunk>) -> Option<&Chunk> {
                    chunk.filter(|chunk| !chunk.is_fully_transparent())
                }
                match (visible(self.committed.get(pos)), visible(self.latest_full(*pos))) {
                    (None, None) => false,
                    (Some(committed), Some(latest)) => committed.as_bytes() != latest.as_bytes(),
                    _ => true,
                }
            })
            .collect()
    }
    /// Chunks that may be modified by operations from `queue_index` onward.
    #[must_use]
    pub fn find_affected_chunks_since(&self, queue_index: usize) -> ChunkSet {
        self.queue
            .iter()
            .skip(queue_index)
            .flat_map(|queued| queued.affected.iter().copied())
            .collect()
    }
    /// Every chunk that has content, committed or pending, along with any pending chunks.
    #[must_use]
    pub fn find_all_chunks(&self) -> ChunkSet {
        self.committed
            .keys()
            .chain(self.latest.keys())
            .chain(self.affected_since_commit.iter())
            .copied()
            .collect()
    }
    /// Positions of committed chunks.
    #[must_use]
    pub fn find_committed_chunks(&self) -> ChunkSet {
        self.committed.keys().copied().collect()
    }
    #[must_use]
    pub fn check_if_committed_is_empty(&self) -> bool {
        self.committed.is_empty()
    }
    /// The committed Full resolution chunk at `pos`.
    #[must_use]
    pub fn committed_chunk(&self, pos: VecI) -> Option<&Chunk> {
        self.committed.get(&pos)
    }
    pub fn committed_chunks(&self) -> impl Iterator<Item = (VecI, &Chunk)> {
        self.committed.iter().map(|(pos, chunk)| (*pos, chunk))
    }
    /// Union of the areas of every committed chunk.
    #[must_use]
    pub fn find_chunk_aligned_committed_bounds(&self) -> Option<RectI> {
        chunk_aligned_bounds(self.committed.keys().copied())
    }
    /// Union of the areas of every chunk with content in the preview.
    #[must_use]
    pub fn find_chunk_aligned_most_up_to_date_bounds(&self) -> Option<RectI> {
        let committed = self
            .committed
            .keys()
            .filter(|pos| !self.latest.contains_key(*pos));
        let latest = self
            .latest
            .iter()
            .filter_map(|(pos, chunk)| chunk.as_ref().map(|_| pos));
        chunk_aligned_bounds(committed.chain(latest).copied())
    }
    /// A committed chunk at the given detail level, deriving it if needed.
    pub fn get_committed_chunk(
        &mut self,
        pos: VecI,
        resolution: ChunkResolution,
    ) -> Option<&Chunk> {
        let full = self.committed.get(&pos)?;
        match resolution {
            ChunkResolution::Full => Some(full),
            lower => Some(
                &*self.committed_mips[lower as usize - 1]
                    .entry(pos)
                    .or_insert_with(|| full.downsample(lower)),
            ),
        }
    }
    /// A chunk as it appears with pending operations applied, deriving lower levels if needed.
    pub fn get_latest_chunk(&mut self, pos: VecI, resolution: ChunkResolution) -> Option<&Chunk> {
        if !self.latest.contains_key(&pos) {
            return self.get_committed_chunk(pos, resolution);
        }
        let full = self.latest.get(&pos)?.as_ref()?;
        match resolution {
            ChunkResolution::Full => Some(full),
            lower => Some(
                &*self.latest_mips[lower as usize - 1]
                    .entry(pos)
                    .or_insert_with(|| full.downsample(lower)),
            ),
        }
    }
    fn latest_full(&self, pos: VecI) -> Option<&Chunk> {
        match self.latest.get(&pos) {
            Some(latest) => latest.as_ref(),
            None => self.committed.get(&pos),
        }
    }
    #[must_use]
    pub fn get_committed_pixel(&self, pos: VecI) -> Color {
        pixel_of(self.committed.get(&pos.chunk_of()), pos)
    }
    #[must_use]
    pub fn get_most_up_to_date_pixel(&self, pos: VecI) -> Color {
        pixel_of(self.latest_full(pos.chunk_of()), pos)
    }
    /// Draw one chunk at the given level onto `target` at `at`, over what's there.
    /// Returns false if there was nothing to draw.
    pub fn draw_most_up_to_date_chunk_on(
        &mut self,
        pos: VecI,
        resolution: ChunkResolution,
        target: &mut Surface,
        at: VecI,
    ) -> bool {
        match self.get_latest_chunk(pos, resolution) {
            Some(chunk) => {
                target.draw_surface(chunk.surface(), at, Compose::Over);
                true
            }
            None => false,
        }
    }
    /// Draw the committed pixels of `region` onto `target`, with `region`'s top left at `at`.
    pub fn draw_committed_region_on(&self, region: RectI, target: &mut Surface, at: VecI) {
        draw_region(|pos| self.committed.get(&pos), region, target, at);
    }
    /// Draw the preview pixels of `region` onto `target`, with `region`'s top left at `at`.
    pub fn draw_most_up_to_date_region_on(&self, region: RectI, target: &mut Surface, at: VecI) {
        draw_region(|pos| self.latest_full(pos), region, target, at);
    }
}
impl std::fmt::Debug for ChunkyImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkyImage")
            .field("committed", &self.committed.len())
            .field("queued", &self.queue.len())
            .field("affected", &self.affected_since_commit.len())
            .finish_non_exhaustive()
    }
}

/// Run one operation over the preview state of the chunk at `pos`.
fn draw_into_latest(
    committed: &ChunkMap,
    latest: &mut hashbrown::HashMap<VecI, Option<Chunk>>,
    latest_mips: &mut MipMaps,
    pos: VecI,
    operation: &Operation,
    clips: &[&ClipMask],
) {
    let mut masks = smallvec::SmallVec::<[&Chunk; 1]>::new();
    for clip in clips {
        match clip.chunk(pos) {
            Some(mask) => masks.push(mask),
            // Fully masked.
            None => return,
        }
    }
    for mips in latest_mips.iter_mut() {
        mips.remove(&pos);
    }
    if masks.is_empty()
        && matches!(
            operation,
            Operation::Clear | Operation::RestoreChunk { chunk: None, .. }
        )
    {
        latest.insert(pos, None);
        return;
    }
    let slot = latest
        .entry(pos)
        .or_insert_with(|| committed.get(&pos).cloned());
    let target = slot.get_or_insert_with(|| Chunk::new(ChunkResolution::Full));
    if masks.is_empty() {
        operation.draw_on_chunk(target, pos);
    } else {
        let mut drawn = target.clone();
        operation.draw_on_chunk(&mut drawn, pos);
        apply_masked(target, &drawn, &masks);
    }
}

fn pixel_of(chunk: Option<&Chunk>, pos: VecI) -> Color {
    chunk
        .and_then(|chunk| chunk.surface().get(pos.within_chunk()))
        .unwrap_or(Color::TRANSPARENT)
}

fn chunk_aligned_bounds(chunks: impl Iterator<Item = VecI>) -> Option<RectI> {
    chunks
        .map(RectI::of_chunk)
        .reduce(|acc, rect| acc.union(&rect))
}

fn draw_region<'a>(
    chunk_at: impl Fn(VecI) -> Option<&'a Chunk>,
    region: RectI,
    target: &mut Surface,
    at: VecI,
) {
    for pos in region.chunks_touching() {
        let Some(chunk) = chunk_at(pos) else {
            continue;
        };
        let area = RectI::of_chunk(pos).intersect(&region);
        target.draw_surface_rect(
            chunk.surface(),
            area.translate(-pos.chunk_origin()),
            at + (area.pos() - region.pos()),
            Compose::Over,
        );
    }
}
