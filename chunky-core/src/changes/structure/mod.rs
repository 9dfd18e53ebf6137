//! Changes to the shape of the layer tree and to members' own properties.

pub mod create_member;
pub mod delete_member;
pub mod duplicate_member;
pub mod mask;
pub mod move_member;
pub mod property;

pub use create_member::{CreateStructureMember, NewMemberKind};
pub use delete_member::DeleteStructureMember;
pub use duplicate_member::DuplicateStructureMember;
pub use mask::{CreateMask, DeleteMask};
pub use move_member::MoveStructureMember;
pub use property::SetMemberProperty;

/// Whether `location` names a place that exists: the root, or an existing folder.
fn is_valid_destination(
    document: &crate::state::Document,
    location: crate::state::Location,
) -> bool {
    location.parent().map_or(true, |parent| {
        document
            .structure
            .find_member(parent)
            .is_some_and(crate::state::StructureMember::is_folder)
    })
}
