use crate::{
    changes::{
        drawing::{restore_stored_chunks, store_and_commit},
        ApplyResult, Change, ChangeError, ChangeInfo, ChangeInfos,
    },
    raster::CommittedChunkStorage,
    state::Document,
};

/// Deselect everything.
#[derive(Debug, Default)]
pub struct ClearSelection {
    stored: Option<CommittedChunkStorage>,
    was_empty_and_inactive: bool,
}
impl ClearSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
impl Change for ClearSelection {
    fn initialize_and_validate(&mut self, _document: &Document) -> bool {
        true
    }
    fn apply(
        &mut self,
        document: &mut Document,
        _first_apply: bool,
    ) -> Result<ApplyResult, ChangeError> {
        let selection = &mut document.selection;
        if selection.is_empty_and_inactive && selection.mask.check_if_committed_is_empty() {
            return Ok(ApplyResult::NoOp);
        }
        selection.mask.cancel_changes();
        selection.mask.clear();
        let chunks = store_and_commit(&mut selection.mask, &mut self.stored)?;
        self.was_empty_and_inactive = selection.is_empty_and_inactive;
        selection.is_empty_and_inactive = true;
        Ok(ApplyResult::Applied(smallvec::smallvec![
            ChangeInfo::SelectionChunks { chunks }
        ]))
    }
    fn revert(&mut self, document: &mut Document) -> Result<ChangeInfos, ChangeError> {
        let selection = &mut document.selection;
        let chunks = restore_stored_chunks(&mut selection.mask, &mut self.stored)?;
        selection.is_empty_and_inactive = self.was_empty_and_inactive;
        Ok(smallvec::smallvec![ChangeInfo::SelectionChunks { chunks }])
    }
    fn dispose(&mut self) {
        if let Some(mut stored) = self.stored.take() {
            stored.dispose();
        }
    }
}
