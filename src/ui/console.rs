// Console view - renders controller state changes as text
//
// Purely an observer: it subscribes to StateManager events and never calls
// back into the controller.

use crate::models::{FileDescriptor, SessionState};
use crate::services::TypeRegistry;
use crate::state::StateChange;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

pub struct ConsoleView {
    registry: Arc<TypeRegistry>,
}

impl ConsoleView {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Title, description and the supported type list.
    pub fn banner(&self) -> String {
        let mut text = String::from(
            "FileMitra Bot\nUpload files securely to your Telegram storage.\n\nSupported File Types:\n",
        );
        for label in self.registry.labels() {
            text.push_str(&format!("  • {}\n", label));
        }
        text
    }

    pub fn describe_file(&self, file: &FileDescriptor) -> String {
        format!(
            "Selected File:\n  Name: {}\n  Size: {:.2} MB\n  Type: {}",
            file.name,
            file.size_mb(),
            self.registry.label_for(&file.mime_type)
        )
    }

    /// Text for one event, or `None` if it has no visible effect.
    pub fn render(&self, change: &StateChange) -> Option<String> {
        match change {
            StateChange::PhaseChanged { to, .. } => match to {
                SessionState::Picking => Some("Pick a File...".to_string()),
                SessionState::Uploading => Some("Uploading...".to_string()),
                SessionState::Validating | SessionState::Idle => None,
            },
            StateChange::FileSelected { file } => Some(self.describe_file(file)),
            // A drop to 0 is the post-attempt reset, not progress
            StateChange::ProgressUpdated { percent: 0 } => None,
            StateChange::ProgressUpdated { percent } => Some(format!("Uploading: {}%", percent)),
            StateChange::SessionCleared => None,
            StateChange::Notified(notice) => {
                Some(format!("{}: {}", notice.title(), notice.message()))
            }
        }
    }

    /// Print events until the state manager goes away.
    pub async fn run(self, mut rx: broadcast::Receiver<StateChange>) {
        loop {
            match rx.recv().await {
                Ok(change) => {
                    if let Some(line) = self.render(&change) {
                        println!("{}", line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Console view fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
