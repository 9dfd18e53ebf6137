use crate::{
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos, MemberProperty},
    state::{Document, MemberID, StructureMember},
};

/// Set one property of a member. Setting a property to its current value does nothing.
#[derive(Debug)]
pub struct SetMemberProperty {
    member: MemberID,
    property: MemberProperty,
    /// The overwritten value. Set while applied.
    previous: Option<MemberProperty>,
}
impl SetMemberProperty {
    #[must_use]
    pub fn new(member: MemberID, property: MemberProperty) -> Self {
        Self {
            member,
            property,
            previous: None,
        }
    }
}

/// Current value of the same property `like` describes.
fn read(member: &StructureMember, like: &MemberProperty) -> MemberProperty {
    match like {
        MemberProperty::Name(_) => MemberProperty::Name(member.name.clone()),
        MemberProperty::IsVisible(_) => MemberProperty::IsVisible(member.is_visible),
        MemberProperty::BlendMode(_) => MemberProperty::BlendMode(member.blend_mode),
        MemberProperty::Opacity(_) => MemberProperty::Opacity(member.opacity),
        MemberProperty::MaskIsVisible(_) => MemberProperty::MaskIsVisible(member.mask_is_visible),
    }
}
fn write(member: &mut StructureMember, property: MemberProperty) {
    match property {
        MemberProperty::Name(name) => member.name = name,
        MemberProperty::IsVisible(visible) => member.is_visible = visible,
        MemberProperty::BlendMode(mode) => member.blend_mode = mode,
        MemberProperty::Opacity(opacity) => member.opacity = opacity,
        MemberProperty::MaskIsVisible(visible) => member.mask_is_visible = visible,
    }
}

impl Change for SetMemberProperty {
    fn initialize_and_validate(&mut self, document: &Document) -> bool {
        if let MemberProperty::Opacity(opacity) = &mut self.property {
            if !opacity.is_finite() {
                return false;
            }
            *opacity = opacity.clamp(0.0, 1.0);
        }
        document.structure.contains(self.member)
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let member = document.structure.find_member_or_err_mut(self.member)?;
        let previous = read(member, &self.property);
        if previous == self.property {
            return Ok(ApplyResult::NoOp);
        }
        write(member, self.property.clone());
        self.previous = Some(previous);
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::MemberProperty {
                member: self.member,
                property: self.property.clone(),
            }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let previous = self.previous.take().ok_or(ChangeError::NotApplied)?;
        let member = document.structure.find_member_or_err_mut(self.member)?;
        write(member, previous.clone());
        Ok(smallvec::smallvec![ChangeInfo::MemberProperty {
            member: self.member,
            property: previous,
        }])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        blend::BlendMode,
        changes::TrackedChange,
        state::{Location, StructureMember},
    };

    fn document_with_layer() -> (Document, MemberID) {
        let mut document = Document::default();
        let id = MemberID::default();
        document
            .structure
            .insert(
                StructureMember::new_layer(id, "Layer".to_owned()),
                Location::IndexIntoRoot(0),
            )
            .unwrap();
        (document, id)
    }

    #[test]
    fn set_and_revert() {
        let (mut document, layer) = document_with_layer();
        for property in [
            MemberProperty::Name("Renamed".to_owned()),
            MemberProperty::IsVisible(false),
            MemberProperty::BlendMode(BlendMode::Multiply),
            MemberProperty::Opacity(0.25),
            MemberProperty::MaskIsVisible(false),
        ] {
            let mut change = TrackedChange::new(Box::new(SetMemberProperty::new(
                layer,
                property.clone(),
            )));
            assert!(change.initialize_and_validate(&document));
            change.apply(&mut document).unwrap();
            let member = document.structure.find_member(layer).unwrap();
            assert_eq!(read(member, &property), property);

            let reverted = change.revert(&mut document).unwrap();
            let member = document.structure.find_member(layer).unwrap();
            let ChangeInfo::MemberProperty { property: restored, .. } = &reverted[0] else {
                panic!("unexpected {reverted:?}");
            };
            assert_eq!(&read(member, &property), restored);
            assert_ne!(restored, &property);
        }
    }
    #[test]
    fn same_value_is_noop() {
        let (mut document, layer) = document_with_layer();
        let mut change = TrackedChange::new(Box::new(SetMemberProperty::new(
            layer,
            MemberProperty::IsVisible(true),
        )));
        assert!(change.initialize_and_validate(&document));
        assert!(matches!(
            change.apply(&mut document).unwrap(),
            ApplyResult::NoOp
        ));
    }
    #[test]
    fn opacity_clamped() {
        let (mut document, layer) = document_with_layer();
        let mut change = TrackedChange::new(Box::new(SetMemberProperty::new(
            layer,
            MemberProperty::Opacity(-3.0),
        )));
        assert!(change.initialize_and_validate(&document));
        change.apply(&mut document).unwrap();
        assert!(document.structure.find_member(layer).unwrap().opacity.abs() < f32::EPSILON);

        let mut nan = SetMemberProperty::new(layer, MemberProperty::Opacity(f32::NAN));
        assert!(!nan.initialize_and_validate(&document));
    }
}
