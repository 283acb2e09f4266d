use crate::models::FileDescriptor;
use std::fmt;

/// Phase of the upload pipeline.
///
/// `Idle` is the only resting state. Success and failure are reported and
/// then collapse straight back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Picking,
    Validating,
    Uploading,
}

impl SessionState {
    pub fn is_busy(self) -> bool {
        self != SessionState::Idle
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Picking => "picking",
            SessionState::Validating => "validating",
            SessionState::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

/// The one in-flight attempt, from file choice until the terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub file: FileDescriptor,
    pub progress_percent: u8,
}

impl UploadSession {
    pub fn new(file: FileDescriptor) -> Self {
        Self {
            file,
            progress_percent: 0,
        }
    }
}

/// Everything the controller tracks between awaits.
///
/// Owned by [`StateManager`](crate::state::StateManager) and only mutated by
/// the [`UploadController`](crate::controller::UploadController). The view
/// reads snapshots and events, never this struct directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub phase: SessionState,
    pub session: Option<UploadSession>,
}

impl AppState {
    /// Current progress; 0 whenever no session exists.
    pub fn progress_percent(&self) -> u8 {
        self.session
            .as_ref()
            .map(|s| s.progress_percent)
            .unwrap_or(0)
    }

    pub fn current_file(&self) -> Option<&FileDescriptor> {
        self.session.as_ref().map(|s| &s.file)
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == SessionState::Uploading
    }
}
