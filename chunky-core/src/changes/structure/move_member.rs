use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos},
    state::{Document, Location, MemberID},
};

/// Move a member, along with its children, within the tree.
#[derive(Debug)]
pub struct MoveStructureMember {
    member: MemberID,
    to: Location,
    /// Set while applied.
    from: Option<Location>,
}
impl MoveStructureMember {
    #[must_use]
    pub fn new(member: MemberID, to: Location) -> Self {
        Self {
            member,
            to,
            from: None,
        }
    }
}
impl Change for MoveStructureMember {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        if !document.structure.contains(self.member)
            || !super::is_valid_destination(document, self.to)
        {
            return false;
        }
        // Moving into itself or a descendant.
        match self.to.parent() {
            Some(parent) => document
                .structure
                .find_member_path(parent)
                .is_ok_and(|path| !path.contains(&self.member)),
            None => true,
        }
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let from = document.structure.location_of(self.member)?;
        if from == self.to {
            return Ok(ApplyResult::NoOp);
        }
        document.structure.move_member(self.member, self.to)?;
        self.from = Some(from);
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::MemberMoved {
                member: self.member,
                location: document.structure.location_of(self.member)?,
            }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let from = self.from.take().ok_or(ChangeError::NotApplied)?;
        document.structure.move_member(self.member, from)?;
        Ok(smallvec::smallvec![ChangeInfo::MemberMoved {
            member: self.member,
            location: from,
        }])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{changes::TrackedChange, state::StructureMember};

    fn setup() -> (Document, MemberID, MemberID, MemberID) {
        let mut document = Document::default();
        let (folder, a, b) = (MemberID::default(), MemberID::default(), MemberID::default());
        let structure = &mut document.structure;
        for (member, location) in [
            (
                StructureMember::new_folder(folder, "Folder".to_owned()),
                Location::IndexIntoRoot(0),
            ),
            (
                StructureMember::new_layer(a, "A".to_owned()),
                Location::IndexIntoRoot(1),
            ),
            (
                StructureMember::new_layer(b, "B".to_owned()),
                Location::IndexIntoRoot(2),
            ),
        ] {
            structure.insert(member, location).unwrap();
        }
        (document, folder, a, b)
    }

    #[test]
    fn move_and_back() {
        let (mut document, folder, a, b) = setup();
        let mut change = TrackedChange::new(Box::new(MoveStructureMember::new(
            b,
            Location::IndexIntoFolder(folder, 0),
        )));
        assert!(change.initialize_and_validate(&document));
        change.apply(&mut document).unwrap();
        assert_eq!(document.structure.children_of(None).unwrap(), [folder, a]);
        assert_eq!(document.structure.children_of(Some(folder)).unwrap(), [b]);

        change.revert(&mut document).unwrap();
        assert_eq!(document.structure.children_of(None).unwrap(), [folder, a, b]);
        assert!(document.structure.children_of(Some(folder)).unwrap().is_empty());
    }
    #[test]
    fn same_place_is_noop() {
        let (mut document, _, a, _) = setup();
        let mut change = TrackedChange::new(Box::new(MoveStructureMember::new(
            a,
            Location::IndexIntoRoot(1),
        )));
        assert!(change.initialize_and_validate(&document));
        assert!(matches!(
            change.apply(&mut document).unwrap(),
            ApplyResult::NoOp
        ));
    }
    #[test]
    fn into_self_is_invalid() {
        let (document, folder, _, _) = setup();
        let mut change = MoveStructureMember::new(folder, Location::IndexIntoFolder(folder, 0));
        assert!(!change.initialize_and_validate(&document));
    }
}
