//! Changes that draw into a layer's image or a member's mask.

pub mod clear_image;
pub mod line;
pub mod paste_image;
pub mod pen;
pub mod shape;

pub use clear_image::ClearImage;
pub use line::DrawLine;
pub use paste_image::PasteImage;
pub use pen::Pen;
pub use shape::{DrawEllipse, DrawRectangle};

use super::{ChangeError, ChangeInfo};
use crate::{
    raster::{operation::ClipMask, ChunkyImage, CommittedChunkStorage},
    state::{Document, MemberID},
};

/// Which image of a member to draw on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawTarget {
    pub member: MemberID,
    /// Draw on the member's mask instead of its layer image.
    pub on_mask: bool,
}
impl DrawTarget {
    #[must_use]
    pub fn layer(member: MemberID) -> Self {
        Self {
            member,
            on_mask: false,
        }
    }
    #[must_use]
    pub fn mask(member: MemberID) -> Self {
        Self {
            member,
            on_mask: true,
        }
    }
    /// Whether the targeted image exists.
    #[must_use]
    pub fn is_valid(&self, document: &Document) -> bool {
        let Some(member) = document.structure.find_member(self.member) else {
            return false;
        };
        if self.on_mask {
            member.mask.is_some()
        } else {
            member.is_layer()
        }
    }
    pub fn image<'d>(&self, document: &'d Document) -> Result<&'d ChunkyImage, ChangeError> {
        let member = document.structure.find_member_or_err(self.member)?;
        if self.on_mask {
            member
                .mask
                .as_ref()
                .ok_or(crate::state::DocumentError::NoMask(self.member).into())
        } else {
            member
                .image()
                .ok_or(crate::state::DocumentError::NotALayer(self.member).into())
        }
    }
    pub fn image_mut<'d>(
        &self,
        document: &'d mut Document,
    ) -> Result<&'d mut ChunkyImage, ChangeError> {
        let member = document.structure.find_member_or_err_mut(self.member)?;
        if self.on_mask {
            member
                .mask
                .as_mut()
                .ok_or(crate::state::DocumentError::NoMask(self.member).into())
        } else {
            member
                .image_mut()
                .ok_or(crate::state::DocumentError::NotALayer(self.member).into())
        }
    }
    /// Describe modified chunks of the targeted image.
    #[must_use]
    pub fn chunks_info(&self, chunks: crate::raster::operation::ChunkSet) -> ChangeInfo {
        if self.on_mask {
            ChangeInfo::MaskChunks {
                member: self.member,
                chunks,
            }
        } else {
            ChangeInfo::LayerImageChunks {
                member: self.member,
                chunks,
            }
        }
    }
}

/// Start a drawing on `image`, restricted to the selection if there is one.
pub(crate) fn begin_drawing(image: &mut ChunkyImage, clip: Option<&std::sync::Arc<ClipMask>>) {
    if let Some(clip) = clip {
        image.apply_clip(clip.clone());
    }
}

/// Snapshot the chunks about to change, then commit. Returns the affected chunks.
pub(crate) fn store_and_commit(
    image: &mut ChunkyImage,
    stored: &mut Option<CommittedChunkStorage>,
) -> Result<crate::raster::operation::ChunkSet, ChangeError> {
    if stored.is_some() {
        return Err(ChangeError::AlreadyApplied);
    }
    let affected = image.find_affected_chunks();
    *stored = Some(CommittedChunkStorage::new(image, affected.iter().copied()));
    image.commit_changes();
    Ok(affected)
}

/// Put back stored chunks, commit, and release the storage. Returns the affected chunks.
pub(crate) fn restore_stored_chunks(
    image: &mut ChunkyImage,
    stored: &mut Option<CommittedChunkStorage>,
) -> Result<crate::raster::operation::ChunkSet, ChangeError> {
    let mut storage = stored.take().ok_or(ChangeError::NotApplied)?;
    storage.apply_chunks_to_image(image)?;
    let affected = image.find_affected_chunks();
    image.commit_changes();
    storage.dispose();
    Ok(affected)
}
