// State management module
//
// This module provides the StateManager which holds the controller's session
// state and emits change events so a rendering layer can follow along
// without polling.

use crate::models::{AppState, FileDescriptor, SessionState, UploadSession};
use crate::services::{Delivery, UploadError};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

/// Broadcast buffer. Progress only emits on increase, so one attempt sends
/// at most ~105 events.
const EVENT_CAPACITY: usize = 256;

/// User-facing notification at the end of an attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Uploaded {
        file: FileDescriptor,
        delivery: Delivery,
    },
    Failed {
        error: UploadError,
    },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Uploaded { .. } => "Success",
            Notice::Failed { error } => error.title(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::Uploaded { .. } => "File uploaded successfully".to_string(),
            Notice::Failed { error } => error.to_string(),
        }
    }
}

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateChange {
    /// The pipeline moved to a new phase
    PhaseChanged {
        from: SessionState,
        to: SessionState,
    },

    /// A file was chosen and a session opened for it
    FileSelected { file: FileDescriptor },

    /// Upload progress moved
    ProgressUpdated { percent: u8 },

    /// The session was dropped after its terminal transition
    SessionCleared,

    /// An attempt concluded with something to tell the user
    Notified(Notice),
}

/// Session state holder with event emission
///
/// Only the [`UploadController`](crate::controller::UploadController)
/// mutates it; anyone may [`subscribe`](Self::subscribe) or take a
/// [`snapshot`](Self::snapshot). Transition helpers enforce the pipeline's
/// invariants:
/// - a pick only starts from `Idle`
/// - progress never goes down within an attempt
/// - progress reads 0 once the session is gone
pub struct StateManager {
    state: RwLock<AppState>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(AppState::default()),
            state_tx,
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.read(|state| state.clone())
    }

    /// Execute a function with read access to the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Apply a mutation and broadcast whatever it changed.
    ///
    /// Returns the events that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // Nobody listening is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.phase != new.phase {
            changes.push(StateChange::PhaseChanged {
                from: old.phase,
                to: new.phase,
            });
        }

        if let Some(file) = new.current_file() {
            if old.current_file() != Some(file) {
                changes.push(StateChange::FileSelected { file: file.clone() });
            }
        }

        if old.progress_percent() != new.progress_percent() {
            changes.push(StateChange::ProgressUpdated {
                percent: new.progress_percent(),
            });
        }

        if old.session.is_some() && new.session.is_none() {
            changes.push(StateChange::SessionCleared);
        }

        changes
    }

    // Transitions

    /// `Idle -> Picking`. Returns false, changing nothing, if an attempt is
    /// already running.
    pub fn try_begin_pick(&self) -> bool {
        let mut accepted = false;
        self.update(|state| {
            if state.phase == SessionState::Idle {
                state.phase = SessionState::Picking;
                state.session = None;
                accepted = true;
            }
        });
        accepted
    }

    /// `Picking -> Validating`, opening a session for the chosen file.
    pub fn begin_validation(&self, file: FileDescriptor) -> Vec<StateChange> {
        self.update(|state| {
            state.phase = SessionState::Validating;
            state.session = Some(UploadSession::new(file));
        })
    }

    /// `Validating -> Uploading` with progress starting from 0.
    pub fn begin_upload(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.phase = SessionState::Uploading;
            if let Some(session) = state.session.as_mut() {
                session.progress_percent = 0;
            }
        })
    }

    /// Record upload progress. Ignored outside `Uploading` and when it would
    /// not move progress forward.
    pub fn record_progress(&self, percent: u8) -> Vec<StateChange> {
        let percent = percent.min(100);
        self.update(|state| {
            if state.phase != SessionState::Uploading {
                return;
            }
            if let Some(session) = state.session.as_mut() {
                if percent > session.progress_percent {
                    session.progress_percent = percent;
                }
            }
        })
    }

    /// Any phase `-> Idle`: drop the session, then publish `notice` if given.
    pub fn finish(&self, notice: Option<Notice>) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.phase = SessionState::Idle;
            state.session = None;
        });

        if let Some(notice) = notice {
            let event = StateChange::Notified(notice);
            let _ = self.state_tx.send(event.clone());
            changes.push(event);
        }

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
