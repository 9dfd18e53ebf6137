//! Change Queue
//!
//! The queue owns a [`Document`] and is the only thing that mutates it. It turns [`Action`]s into
//! changes, applies them, and keeps the undo/redo history.
//!
//! History is kept as packets: every change recorded between two [`Action::ChangeBoundary`]s is undone
//! and redone together. At most one interactive change is in flight at a time, and history can't be
//! navigated until it ends.

use std::collections::VecDeque;

use crate::{
    actions::{Action, UpdateableKind},
    changes::{ApplyResult, Change, ChangeError, ChangeInfo, TrackedChange, UpdateableChange},
    config::HistoryConfig,
    state::Document,
};

#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    #[error("can't do that while an interactive change is in progress")]
    ChangeActive,
    #[error("tried to end {requested:?} while {active:?} is in progress")]
    MismatchedEnd {
        active: UpdateableKind,
        requested: UpdateableKind,
    },
    #[error("{action:?} can't update the {active:?} in progress")]
    MismatchedUpdate {
        active: UpdateableKind,
        action: UpdateableKind,
    },
    #[error(transparent)]
    Change(#[from] ChangeError),
}

/// Changes that are undone and redone as one step.
type Packet = smallvec::SmallVec<[TrackedChange<dyn Change>; 1]>;

fn dispose_packet(packet: Packet) {
    for mut change in packet {
        change.dispose();
    }
}

pub struct DocumentChangeQueue {
    document: Document,
    /// Oldest first.
    undo_stack: VecDeque<Packet>,
    /// Most recently undone last.
    redo_stack: Vec<Packet>,
    /// Changes recorded since the last boundary.
    open_packet: Packet,
    active_change: Option<(UpdateableKind, TrackedChange<dyn UpdateableChange>)>,
    config: HistoryConfig,
}
impl DocumentChangeQueue {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self::with_config(document, HistoryConfig::default())
    }
    #[must_use]
    pub fn with_config(document: Document, config: HistoryConfig) -> Self {
        Self {
            document,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            open_packet: Packet::new(),
            active_change: None,
            config,
        }
    }
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
    /// Number of completed undo steps. Changes since the last boundary aren't counted until it's closed.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
    #[must_use]
    pub fn has_active_change(&self) -> bool {
        self.active_change.is_some()
    }
    /// Perform every action in order, returning what changed.
    ///
    /// The first error aborts the rest of the batch. Actions before it have taken effect.
    pub fn process_actions(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<Vec<ChangeInfo>, QueueError> {
        let mut infos = Vec::new();
        for action in actions {
            if let Err(err) = self.process(action, &mut infos) {
                log::error!("Action batch aborted: {err}");
                return Err(err);
            }
        }
        Ok(infos)
    }
    fn process(&mut self, action: Action, infos: &mut Vec<ChangeInfo>) -> Result<(), QueueError> {
        log::trace!("Processing {action:?}");
        match action {
            Action::Make(action) => {
                if self.active_change.is_some() {
                    return Err(QueueError::ChangeActive);
                }
                let mut change = TrackedChange::new(action.create_change());
                if !change.initialize_and_validate(&self.document) {
                    log::debug!("Discarded invalid {:?}", change.inner());
                    return Ok(());
                }
                match change.apply(&mut self.document)? {
                    ApplyResult::Applied(applied) => {
                        infos.extend(applied);
                        self.record(change);
                    }
                    ApplyResult::NoOp => {
                        log::debug!("Discarded no-op {:?}", change.inner());
                        change.dispose();
                    }
                }
            }
            Action::StartOrUpdate(action) => {
                let kind = action.kind();
                if let Some((active, change)) = &mut self.active_change {
                    if *active != kind || !action.update_change(change.inner_mut()) {
                        return Err(QueueError::MismatchedUpdate {
                            active: *active,
                            action: kind,
                        });
                    }
                } else {
                    let mut change = TrackedChange::new(action.create_change());
                    if !change.initialize_and_validate(&self.document) {
                        log::debug!("Discarded invalid {:?}", change.inner());
                        return Ok(());
                    }
                    log::debug!("Started {}", kind.as_ref());
                    self.active_change = Some((kind, change));
                }
                if let Some((_, change)) = &mut self.active_change {
                    infos.extend(change.apply_temporarily(&mut self.document)?);
                }
            }
            Action::End(kind) => match self.active_change.take() {
                None => log::warn!("Ignoring end of {}, nothing in progress", kind.as_ref()),
                Some((active, change)) if active != kind => {
                    self.active_change = Some((active, change));
                    return Err(QueueError::MismatchedEnd {
                        active,
                        requested: kind,
                    });
                }
                Some((_, mut change)) => match change.apply(&mut self.document)? {
                    ApplyResult::Applied(applied) => {
                        infos.extend(applied);
                        self.record(change.into_plain());
                    }
                    ApplyResult::NoOp => {
                        log::debug!("Discarded no-op {:?}", change.inner());
                        change.dispose();
                    }
                },
            },
            Action::Undo => {
                self.ensure_idle()?;
                self.close_packet();
                let Some(mut packet) = self.undo_stack.pop_back() else {
                    log::debug!("Nothing to undo");
                    return Ok(());
                };
                for change in packet.iter_mut().rev() {
                    infos.extend(change.revert(&mut self.document)?);
                }
                log::debug!("Undid {} changes", packet.len());
                self.redo_stack.push(packet);
            }
            Action::Redo => {
                self.ensure_idle()?;
                self.close_packet();
                let Some(mut packet) = self.redo_stack.pop() else {
                    log::debug!("Nothing to redo");
                    return Ok(());
                };
                for change in &mut packet {
                    infos.extend(change.apply(&mut self.document)?.into_infos());
                }
                log::debug!("Redid {} changes", packet.len());
                self.undo_stack.push_back(packet);
                self.trim_history();
            }
            Action::ChangeBoundary => {
                self.ensure_idle()?;
                self.close_packet();
            }
            Action::DeleteRecordedChanges => {
                self.ensure_idle()?;
                dispose_packet(std::mem::take(&mut self.open_packet));
                for packet in self.undo_stack.drain(..) {
                    dispose_packet(packet);
                }
                self.clear_redo();
                log::debug!("Deleted recorded changes");
            }
        }
        Ok(())
    }
    fn ensure_idle(&self) -> Result<(), QueueError> {
        if self.active_change.is_some() {
            Err(QueueError::ChangeActive)
        } else {
            Ok(())
        }
    }
    /// Add an applied change to the history. Anything that could be redone is lost.
    fn record(&mut self, change: TrackedChange<dyn Change>) {
        self.clear_redo();
        self.open_packet.push(change);
    }
    fn clear_redo(&mut self) {
        for packet in self.redo_stack.drain(..) {
            dispose_packet(packet);
        }
    }
    fn close_packet(&mut self) {
        if self.open_packet.is_empty() {
            return;
        }
        let packet = std::mem::take(&mut self.open_packet);
        log::debug!("Recorded packet of {} changes", packet.len());
        self.undo_stack.push_back(packet);
        self.trim_history();
    }
    fn trim_history(&mut self) {
        let Some(max) = self.config.max_undo_packets else {
            return;
        };
        while self.undo_stack.len() > max {
            if let Some(oldest) = self.undo_stack.pop_front() {
                dispose_packet(oldest);
            }
        }
    }
}
impl std::fmt::Debug for DocumentChangeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentChangeQueue")
            .field("document", &self.document.id())
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("open", &self.open_packet.len())
            .field("active", &self.active_change.as_ref().map(|(kind, _)| kind))
            .finish_non_exhaustive()
    }
}
