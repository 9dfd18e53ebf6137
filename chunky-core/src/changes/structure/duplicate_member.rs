use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos},
    state::{Document, Location, MemberID},
};

/// Copy a layer or folder, contents and all, placing the copy just above the original.
///
/// The copy's ID is chosen up front. IDs of copied descendants are made on first apply and reused
/// when redone.
#[derive(Debug)]
pub struct DuplicateStructureMember {
    member: MemberID,
    /// The copy first, then its descendants, parents first.
    ids: Vec<MemberID>,
    applied: bool,
}
impl DuplicateStructureMember {
    #[must_use]
    pub fn new(member: MemberID, duplicate: MemberID) -> Self {
        Self {
            member,
            ids: vec![duplicate],
            applied: false,
        }
    }
    fn duplicate(&self) -> MemberID {
        self.ids[0]
    }
}
impl Change for DuplicateStructureMember {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        document.structure.contains(self.member) && !document.structure.contains(self.duplicate())
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        if self.applied {
            return Err(ChangeError::AlreadyApplied);
        }
        let location = match document.structure.location_of(self.member)? {
            Location::IndexIntoFolder(parent, index) => {
                Location::IndexIntoFolder(parent, index + 1)
            }
            Location::IndexIntoRoot(index) => Location::IndexIntoRoot(index + 1),
        };
        let copy = {
            let ids = &mut self.ids;
            let mut used = 0;
            let mut next_id = || {
                let id = match ids.get(used) {
                    Some(&id) => id,
                    None => {
                        let id = MemberID::default();
                        ids.push(id);
                        id
                    }
                };
                used += 1;
                id
            };
            document.structure.duplicate(self.member, &mut next_id)?
        };
        let created: Vec<MemberID> = copy.iter().map(|member| member.id()).collect();
        document.structure.insert_detached(copy, location)?;
        self.applied = true;
        log::debug!(
            "Duplicated {} as {} with {} descendants",
            self.member,
            self.duplicate(),
            created.len() - 1
        );

        let mut infos = ChangeInfos::with_capacity(created.len());
        for member in created {
            infos.push(ChangeInfo::MemberCreated {
                member,
                location: document.structure.location_of(member)?,
            });
        }
        Ok(ApplyResult::Applied(infos))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        if !self.applied {
            return Err(ChangeError::NotApplied);
        }
        let removed = document.structure.detach(self.duplicate())?;
        self.applied = false;
        Ok(removed
            .iter()
            .map(|member| ChangeInfo::MemberDeleted {
                member: member.id(),
            })
            .collect())
    }
}
