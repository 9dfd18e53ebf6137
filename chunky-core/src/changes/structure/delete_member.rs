use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos},
    state::{DetachedMember, Document, Location, MemberID},
};

/// Remove a member and everything inside it. The removed subtree is kept, untouched, until the
/// change is reverted or leaves the history.
#[derive(Debug)]
pub struct DeleteStructureMember {
    member: MemberID,
    /// Where it was and what was taken. Set while applied.
    removed: Option<(Location, DetachedMember)>,
}
impl DeleteStructureMember {
    #[must_use]
    pub fn new(member: MemberID) -> Self {
        Self {
            member,
            removed: None,
        }
    }
}
impl Change for DeleteStructureMember {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        document.structure.contains(self.member)
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        if self.removed.is_some() {
            return Err(ChangeError::AlreadyApplied);
        }
        let location = document.structure.location_of(self.member)?;
        let detached = document.structure.detach(self.member)?;
        let infos = detached
            .iter()
            .map(|member| ChangeInfo::MemberDeleted {
                member: member.id(),
            })
            .collect();
        log::debug!(
            "Deleted {} and {} descendants",
            self.member,
            detached.iter().count() - 1
        );
        self.removed = Some((location, detached));
        Ok(ApplyResult::Applied(infos))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let (location, detached) = self.removed.take().ok_or(ChangeError::NotApplied)?;
        let ids: Vec<MemberID> = detached.iter().map(|member| member.id()).collect();
        document.structure.insert_detached(detached, location)?;
        let mut infos = ChangeInfos::with_capacity(ids.len());
        for member in ids {
            infos.push(ChangeInfo::MemberCreated {
                member,
                location: document.structure.location_of(member)?,
            });
        }
        Ok(infos)
    }
    fn dispose(&mut self) {
        self.removed = None;
    }
}
