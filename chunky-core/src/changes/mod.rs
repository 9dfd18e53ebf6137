//! # Changes
//!
//! Changes are the only way the [`Document`] is modified. Every change knows how to undo itself exactly,
//! usually by keeping a [`CommittedChunkStorage`](crate::raster::CommittedChunkStorage) of the chunks it is
//! about to overwrite.
//!
//! A change goes through `initialize_and_validate`, then any number of `apply`/`revert` pairs, then `dispose`.
//! [`TrackedChange`] enforces that order. [`UpdateableChange`]s additionally show a live preview through
//! `apply_temporarily` before their single real `apply`.

pub mod drawing;
pub mod info;
pub mod selection;
pub mod structure;

pub use info::{ChangeInfo, ChangeInfos, MemberProperty};

use crate::{
    raster::StorageError,
    state::{Document, DocumentError},
};

#[derive(thiserror::Error, Debug)]
pub enum ChangeError {
    #[error("change reverted without being applied")]
    NotApplied,
    #[error("change applied again without being reverted")]
    AlreadyApplied,
    #[error("change used after being disposed")]
    Disposed,
    #[error("change used before being validated")]
    NotValidated,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of applying a change.
#[derive(Debug)]
pub enum ApplyResult {
    Applied(ChangeInfos),
    /// The change had no effect, and should not take up a spot in the undo history.
    NoOp,
}
impl ApplyResult {
    /// The infos of an applied change, or none for a no-op.
    #[must_use]
    pub fn into_infos(self) -> ChangeInfos {
        match self {
            Self::Applied(infos) => infos,
            Self::NoOp => ChangeInfos::new(),
        }
    }
}

/// Conversions every change gets for free.
pub trait AnyChange {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
    fn into_boxed_change(self: Box<Self>) -> Box<dyn Change>;
}
impl<T: Change + 'static> AnyChange for T {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
    fn into_boxed_change(self: Box<Self>) -> Box<dyn Change> {
        self
    }
}

pub trait Change: AnyChange + std::fmt::Debug {
    /// Check the change makes sense for this document, gathering anything it needs from it.
    /// A change that fails validation is discarded without ever being applied.
    fn initialize_and_validate(&mut self, document: &Document) -> bool;
    /// Perform the change. Anything needed to revert it must be captured before mutating.
    ///
    /// `first_apply` is false when re-applying after a revert.
    fn apply(
        &mut self,
        document: &mut Document,
        first_apply: bool,
    ) -> Result<ApplyResult, ChangeError>;
    /// Restore the document to exactly how it was before the last `apply`.
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError>;
    /// Release anything held for reverting. Called once the change leaves the history.
    fn dispose(&mut self) {}
}

/// A change with a live preview phase. Parameters are updated between preview frames through the
/// concrete type, each frame is shown with `apply_temporarily`, and `apply` finishes the interaction.
pub trait UpdateableChange: Change {
    /// Show the current parameters as pending, uncommitted drawing. Never touches undo state.
    fn apply_temporarily(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
pub enum ChangeState {
    Uninitialized,
    Validated,
    Applied,
    Reverted,
    Disposed,
}

/// Owns a change and holds it to the `validate -> apply <-> revert -> dispose` lifecycle.
pub struct TrackedChange<C: Change + ?Sized> {
    change: Box<C>,
    state: ChangeState,
}
impl<C: Change + ?Sized> TrackedChange<C> {
    pub fn new(change: Box<C>) -> Self {
        Self {
            change,
            state: ChangeState::Uninitialized,
        }
    }
    #[must_use]
    pub fn state(&self) -> ChangeState {
        self.state
    }
    pub fn inner(&self) -> &C {
        &self.change
    }
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.change
    }
    /// Validate against the document. Only an uninitialized change can be validated.
    pub fn initialize_and_validate(&mut self, document: &Document) -> bool {
        if self.state != ChangeState::Uninitialized {
            return false;
        }
        let valid = self.change.initialize_and_validate(document);
        if valid {
            self.state = ChangeState::Validated;
        }
        valid
    }
    /// Apply for the first time, or again after a revert.
    pub fn apply(&mut self, document: &mut Document) -> Result<ApplyResult, ChangeError> {
        let first_apply = match self.state {
            ChangeState::Validated => true,
            ChangeState::Reverted => false,
            ChangeState::Applied => return Err(ChangeError::AlreadyApplied),
            ChangeState::Uninitialized => return Err(ChangeError::NotValidated),
            ChangeState::Disposed => return Err(ChangeError::Disposed),
        };
        let result = self.change.apply(document, first_apply)?;
        log::debug!(
            "Applied {:?}{}",
            self.change,
            if first_apply { "" } else { " (redo)" }
        );
        self.state = ChangeState::Applied;
        Ok(result)
    }
    pub fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        match self.state {
            ChangeState::Applied => (),
            ChangeState::Disposed => return Err(ChangeError::Disposed),
            _ => return Err(ChangeError::NotApplied),
        }
        let infos = self.change.revert(document)?;
        log::debug!("Reverted {:?}", self.change);
        self.state = ChangeState::Reverted;
        Ok(infos)
    }
    /// Release held resources. Repeated calls do nothing.
    pub fn dispose(&mut self) {
        if self.state != ChangeState::Disposed {
            self.change.dispose();
            self.state = ChangeState::Disposed;
        }
    }
}
impl<C: UpdateableChange + ?Sized> TrackedChange<C> {
    /// Preview. Only valid between validation and the first real apply.
    pub fn apply_temporarily(
        &mut self,
        document: &mut Document,
    ) -> Result<ChangeInfos, ChangeError> {
        match self.state {
            ChangeState::Validated => self.change.apply_temporarily(document),
            ChangeState::Uninitialized => Err(ChangeError::NotValidated),
            ChangeState::Disposed => Err(ChangeError::Disposed),
            ChangeState::Applied | ChangeState::Reverted => Err(ChangeError::AlreadyApplied),
        }
    }
}
impl TrackedChange<dyn UpdateableChange> {
    /// Forget the updateable part, for storing alongside plain changes.
    #[must_use]
    pub fn into_plain(self) -> TrackedChange<dyn Change> {
        TrackedChange {
            change: self.change.into_boxed_change(),
            state: self.state,
        }
    }
}
impl<C: Change + ?Sized> std::fmt::Debug for TrackedChange<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedChange")
            .field("change", &self.change)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Counts calls, changes nothing.
    #[derive(Debug, Default)]
    struct Probe {
        valid: bool,
        applies: usize,
        reverts: usize,
        disposes: usize,
        first_applies: usize,
    }
    impl Change for Probe {
        fn initialize_and_validate(&mut self, _: &Document) -> bool {
            self.valid
        }
        fn apply(
            &mut self,
            _: &mut Document,
            first_apply: bool,
        ) -> Result<ApplyResult, ChangeError> {
            self.applies += 1;
            self.first_applies += usize::from(first_apply);
            Ok(ApplyResult::Applied(ChangeInfos::new()))
        }
        fn revert(&mut self, _: &mut Document) -> Result<ChangeInfos, ChangeError> {
            self.reverts += 1;
            Ok(ChangeInfos::new())
        }
        fn dispose(&mut self) {
            self.disposes += 1;
        }
    }

    #[test]
    fn lifecycle_order() {
        let mut document = Document::default();
        let mut change = TrackedChange::new(Box::new(Probe {
            valid: true,
            ..Probe::default()
        }));
        assert!(matches!(
            change.apply(&mut document),
            Err(ChangeError::NotValidated)
        ));
        assert!(matches!(
            change.revert(&mut document),
            Err(ChangeError::NotApplied)
        ));
        assert!(change.initialize_and_validate(&document));
        change.apply(&mut document).unwrap();
        assert!(matches!(
            change.apply(&mut document),
            Err(ChangeError::AlreadyApplied)
        ));
        change.revert(&mut document).unwrap();
        assert!(matches!(
            change.revert(&mut document),
            Err(ChangeError::NotApplied)
        ));
        change.apply(&mut document).unwrap();
        assert_eq!(change.state(), ChangeState::Applied);
        change.dispose();
        change.dispose();
        assert!(matches!(
            change.revert(&mut document),
            Err(ChangeError::Disposed)
        ));

        let counts = change.inner();
        assert_eq!(counts.applies, 2);
        assert_eq!(counts.first_applies, 1);
        assert_eq!(counts.reverts, 1);
        assert_eq!(counts.disposes, 1);
    }
    #[test]
    fn invalid_stays_uninitialized() {
        let document = Document::default();
        let mut change = TrackedChange::new(Box::new(Probe::default()));
        assert!(!change.initialize_and_validate(&document));
        assert_eq!(change.state(), ChangeState::Uninitialized);
    }
}
