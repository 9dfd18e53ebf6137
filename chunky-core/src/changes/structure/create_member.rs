use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos},
    state::{Document, Location, MemberID, StructureMember},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum NewMemberKind {
    Layer,
    Folder,
}

/// Add an empty layer or folder.
///
/// The ID is chosen up front, so the member keeps its identity when redone.
#[derive(Debug)]
pub struct CreateStructureMember {
    id: MemberID,
    location: Location,
    kind: NewMemberKind,
    name: String,
}
impl CreateStructureMember {
    #[must_use]
    pub fn new(id: MemberID, location: Location, kind: NewMemberKind, name: String) -> Self {
        Self {
            id,
            location,
            kind,
            name,
        }
    }
}
impl Change for CreateStructureMember {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        !document.structure.contains(self.id)
            && super::is_valid_destination(document, self.location)
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let member = match self.kind {
            NewMemberKind::Layer => StructureMember::new_layer(self.id, self.name.clone()),
            NewMemberKind::Folder => StructureMember::new_folder(self.id, self.name.clone()),
        };
        document.structure.insert(member, self.location)?;
        let location = document.structure.location_of(self.id)?;
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::MemberCreated {
                member: self.id,
                location,
            }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        // Anything created since has been undone already, so this has no children.
        document.structure.detach(self.id)?;
        Ok(smallvec::smallvec![ChangeInfo::MemberDeleted { member: self.id }])
    }
}
