use crate::{
    blend::BlendMode,
    raster::operation::ChunkSet,
    state::{Location, MemberID},
};

/// A property of a structure member that can be set on its own.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberProperty {
    Name(String),
    IsVisible(bool),
    BlendMode(BlendMode),
    Opacity(f32),
    MaskIsVisible(bool),
}

/// Description of what a change did to the document, for whoever needs to catch up with it.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeInfo {
    /// Pixels of a layer's image changed within these chunks.
    LayerImageChunks { member: MemberID, chunks: ChunkSet },
    /// Pixels of a member's mask changed within these chunks.
    MaskChunks { member: MemberID, chunks: ChunkSet },
    /// The selection changed within these chunks.
    SelectionChunks { chunks: ChunkSet },
    MemberCreated { member: MemberID, location: Location },
    MemberDeleted { member: MemberID },
    MemberMoved { member: MemberID, location: Location },
    MemberProperty {
        member: MemberID,
        property: MemberProperty,
    },
    MaskCreated { member: MemberID },
    MaskDeleted { member: MemberID },
}

/// Usually just one.
pub type ChangeInfos = smallvec::SmallVec<[ChangeInfo; 1]>;
