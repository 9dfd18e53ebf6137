pub mod selection;
pub mod structure;

pub use selection::Selection;
pub use structure::{
    DetachedMember, DocumentError, Location, MemberID, MemberKind, StructureMember, StructureTree,
};

pub type DocumentID = crate::id::LocalID<Document>;

/// Everything that changes can touch. Mutated only by [`crate::changes`], read by anyone.
#[derive(Debug)]
pub struct Document {
    id: DocumentID,
    pub structure: StructureTree,
    pub selection: Selection,
}
impl Default for Document {
    fn default() -> Self {
        Self {
            id: DocumentID::default(),
            structure: StructureTree::default(),
            selection: Selection::default(),
        }
    }
}
impl Document {
    #[must_use]
    pub fn id(&self) -> DocumentID {
        self.id
    }
    pub fn find_member_or_err(&self, id: MemberID) -> Result<&StructureMember, DocumentError> {
        self.structure.find_member_or_err(id)
    }
}
