//! # Actions
//!
//! Actions are plain, immutable descriptions of what the user wants done. They are the only way to
//! construct a [`Change`]: each action maps to exactly one change, or to an update of the currently
//! active [`UpdateableChange`].

use crate::{
    changes::{
        drawing::{
            ClearImage, DrawEllipse, DrawLine, DrawRectangle, DrawTarget, PasteImage, Pen,
        },
        selection::{ClearSelection, SelectRectangle, SelectionMode},
        structure::{
            CreateMask, CreateStructureMember, DeleteMask, DeleteStructureMember,
            DuplicateStructureMember, MoveStructureMember, NewMemberKind, SetMemberProperty,
        },
        Change, MemberProperty, UpdateableChange,
    },
    geometry::{RectI, VecI},
    raster::{
        operation::{ShapeStyle, StrokeStyle},
        Surface,
    },
    state::{Location, MemberID},
};

#[derive(Debug)]
pub enum Action {
    /// Make and apply a one-shot change.
    Make(MakeChangeAction),
    /// Start the interactive change if none is active, otherwise update it, then preview it.
    StartOrUpdate(UpdateableAction),
    /// Finish the active interactive change, recording it.
    End(UpdateableKind),
    Undo,
    Redo,
    /// Close the current undo step. Changes made before the next boundary undo together.
    ChangeBoundary,
    /// Forget all undo and redo history.
    DeleteRecordedChanges,
}

/// Actions that make a change in one go.
#[derive(Debug)]
pub enum MakeChangeAction {
    PasteImage {
        target: DrawTarget,
        surface: Surface,
        pos: VecI,
    },
    ClearImage {
        target: DrawTarget,
    },
    CreateStructureMember {
        id: MemberID,
        location: Location,
        kind: NewMemberKind,
        name: String,
    },
    DeleteStructureMember {
        member: MemberID,
    },
    /// Copy `member` and its contents. The copy gets the ID `duplicate`.
    DuplicateStructureMember {
        member: MemberID,
        duplicate: MemberID,
    },
    MoveStructureMember {
        member: MemberID,
        to: Location,
    },
    SetMemberProperty {
        member: MemberID,
        property: MemberProperty,
    },
    CreateMask {
        member: MemberID,
    },
    DeleteMask {
        member: MemberID,
    },
    ClearSelection,
}
impl MakeChangeAction {
    #[must_use]
    pub fn create_change(self) -> Box<dyn Change> {
        match self {
            Self::PasteImage {
                target,
                surface,
                pos,
            } => Box::new(PasteImage::new(target, surface, pos)),
            Self::ClearImage { target } => Box::new(ClearImage::new(target)),
            Self::CreateStructureMember {
                id,
                location,
                kind,
                name,
            } => Box::new(CreateStructureMember::new(id, location, kind, name)),
            Self::DeleteStructureMember { member } => Box::new(DeleteStructureMember::new(member)),
            Self::DuplicateStructureMember { member, duplicate } => {
                Box::new(DuplicateStructureMember::new(member, duplicate))
            }
            Self::MoveStructureMember { member, to } => {
                Box::new(MoveStructureMember::new(member, to))
            }
            Self::SetMemberProperty { member, property } => {
                Box::new(SetMemberProperty::new(member, property))
            }
            Self::CreateMask { member } => Box::new(CreateMask::new(member)),
            Self::DeleteMask { member } => Box::new(DeleteMask::new(member)),
            Self::ClearSelection => Box::new(ClearSelection::new()),
        }
    }
}

/// Identifies which interactive change an action belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::AsRefStr, strum::EnumIter)]
pub enum UpdateableKind {
    DrawRectangle,
    DrawEllipse,
    DrawLine,
    Pen,
    SelectRectangle,
}

/// Parameters for one frame of an interactive change.
#[derive(Clone, Debug)]
pub enum UpdateableAction {
    DrawRectangle {
        target: DrawTarget,
        rect: RectI,
        style: ShapeStyle,
    },
    DrawEllipse {
        target: DrawTarget,
        rect: RectI,
        style: ShapeStyle,
    },
    DrawLine {
        target: DrawTarget,
        from: VecI,
        to: VecI,
        style: StrokeStyle,
    },
    /// Add a point to the stroke. The style of the first action is used for the whole stroke.
    Pen {
        target: DrawTarget,
        point: VecI,
        style: StrokeStyle,
    },
    SelectRectangle {
        rect: RectI,
        mode: SelectionMode,
    },
}
impl UpdateableAction {
    #[must_use]
    pub fn kind(&self) -> UpdateableKind {
        match self {
            Self::DrawRectangle { .. } => UpdateableKind::DrawRectangle,
            Self::DrawEllipse { .. } => UpdateableKind::DrawEllipse,
            Self::DrawLine { .. } => UpdateableKind::DrawLine,
            Self::Pen { .. } => UpdateableKind::Pen,
            Self::SelectRectangle { .. } => UpdateableKind::SelectRectangle,
        }
    }
    /// Start a new interactive change from these parameters.
    #[must_use]
    pub fn create_change(self) -> Box<dyn UpdateableChange> {
        match self {
            Self::DrawRectangle {
                target,
                rect,
                style,
            } => Box::new(DrawRectangle::new(target, rect, style)),
            Self::DrawEllipse {
                target,
                rect,
                style,
            } => Box::new(DrawEllipse::new(target, rect, style)),
            Self::DrawLine {
                target,
                from,
                to,
                style,
            } => Box::new(DrawLine::new(target, from, to, style)),
            Self::Pen {
                target,
                point,
                style,
            } => Box::new(Pen::new(target, point, style)),
            Self::SelectRectangle { rect, mode } => Box::new(SelectRectangle::new(rect, mode)),
        }
    }
    /// Feed these parameters into an existing change.
    ///
    /// Returns false, leaving the change untouched, if it's not the kind of change this action
    /// makes or it targets a different image.
    pub fn update_change(self, change: &mut dyn UpdateableChange) -> bool {
        let any = change.as_any_mut();
        match self {
            Self::DrawRectangle {
                target,
                rect,
                style,
            } => match any.downcast_mut::<DrawRectangle>() {
                Some(change) if change.target() == target => change.update(rect, style),
                _ => return false,
            },
            Self::DrawEllipse {
                target,
                rect,
                style,
            } => match any.downcast_mut::<DrawEllipse>() {
                Some(change) if change.target() == target => change.update(rect, style),
                _ => return false,
            },
            Self::DrawLine {
                target,
                from,
                to,
                style,
            } => match any.downcast_mut::<DrawLine>() {
                Some(change) if change.target() == target => change.update(from, to, style),
                _ => return false,
            },
            Self::Pen { target, point, .. } => match any.downcast_mut::<Pen>() {
                Some(change) if change.target() == target => change.update(point),
                _ => return false,
            },
            Self::SelectRectangle { rect, mode } => match any.downcast_mut::<SelectRectangle>() {
                Some(change) => change.update(rect, mode),
                None => return false,
            },
        }
        true
    }
}
