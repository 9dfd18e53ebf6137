use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos},
    raster::ChunkyImage,
    state::{Document, DocumentError, MemberID},
};

/// Give a member an empty mask.
#[derive(Debug)]
pub struct CreateMask {
    member: MemberID,
}
impl CreateMask {
    #[must_use]
    pub fn new(member: MemberID) -> Self {
        Self { member }
    }
}
impl Change for CreateMask {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        document
            .structure
            .find_member(self.member)
            .is_some_and(|member| member.mask.is_none())
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let member = document.structure.find_member_or_err_mut(self.member)?;
        if member.mask.is_some() {
            return Err(DocumentError::AlreadyMasked(self.member).into());
        }
        member.mask = Some(ChunkyImage::new());
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::MaskCreated {
                member: self.member
            }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let member = document.structure.find_member_or_err_mut(self.member)?;
        // Drawing done on the mask since has already been undone, so it's empty again.
        member
            .mask
            .take()
            .ok_or(DocumentError::NoMask(self.member))?;
        Ok(smallvec::smallvec![ChangeInfo::MaskDeleted {
            member: self.member
        }])
    }
}

/// Remove a member's mask, keeping it around for undo.
#[derive(Debug)]
pub struct DeleteMask {
    member: MemberID,
    /// Set while applied.
    removed: Option<ChunkyImage>,
}
impl DeleteMask {
    #[must_use]
    pub fn new(member: MemberID) -> Self {
        Self {
            member,
            removed: None,
        }
    }
}
impl Change for DeleteMask {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        document
            .structure
            .find_member(self.member)
            .is_some_and(|member| member.mask.is_some())
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        if self.removed.is_some() {
            return Err(ChangeError::AlreadyApplied);
        }
        let member = document.structure.find_member_or_err_mut(self.member)?;
        let mut mask = member
            .mask
            .take()
            .ok_or(DocumentError::NoMask(self.member))?;
        mask.cancel_changes();
        self.removed = Some(mask);
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::MaskDeleted {
                member: self.member
            }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let member = document.structure.find_member_or_err_mut(self.member)?;
        if member.mask.is_some() {
            return Err(DocumentError::AlreadyMasked(self.member).into());
        }
        let mask = self.removed.take().ok_or(ChangeError::NotApplied)?;
        let chunks = mask.find_committed_chunks();
        member.mask = Some(mask);
        Ok(smallvec::smallvec![
            ChangeInfo::MaskCreated {
                member: self.member
            },
            ChangeInfo::MaskChunks {
                member: self.member,
                chunks,
            },
        ])
    }
    fn dispose(&mut self) {
        self.removed = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        changes::TrackedChange,
        color::Color,
        geometry::{RectI, VecI},
        raster::operation::ShapeStyle,
        state::{Location, StructureMember},
    };

    #[test]
    fn create_then_delete_mask() {
        let mut document = Document::default();
        let folder = MemberID::default();
        document
            .structure
            .insert(
                StructureMember::new_folder(folder, "Folder".to_owned()),
                Location::IndexIntoRoot(0),
            )
            .unwrap();

        let mut create = TrackedChange::new(Box::new(CreateMask::new(folder)));
        assert!(create.initialize_and_validate(&document));
        create.apply(&mut document).unwrap();
        assert!(!CreateMask::new(folder).initialize_and_validate(&document));

        let mask = document
            .structure
            .find_member_mut(folder)
            .and_then(|member| member.mask.as_mut())
            .unwrap();
        mask.draw_rectangle(RectI::new(VecI::ZERO, VecI::new(2, 2)), ShapeStyle::default());
        mask.commit_changes();

        let mut delete = TrackedChange::new(Box::new(DeleteMask::new(folder)));
        assert!(delete.initialize_and_validate(&document));
        delete.apply(&mut document).unwrap();
        assert!(document.structure.find_member(folder).unwrap().mask.is_none());

        let infos = delete.revert(&mut document).unwrap();
        assert_eq!(infos.len(), 2);
        let mask = document.structure.find_member(folder).unwrap().mask.as_ref().unwrap();
        assert_eq!(mask.get_committed_pixel(VecI::new(1, 1)), Color::BLACK);
    }
}
