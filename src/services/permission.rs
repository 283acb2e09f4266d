//! Storage access checks that run before the picker is allowed to open.
//!
//! The OS prompt itself is an external collaborator behind
//! [`PermissionPrompt`]. [`PermissionGate`] asks it for the capability the
//! current platform needs and collapses every answer other than an explicit
//! grant (including prompt failures) into [`Access::Denied`].

use crate::models::PermissionMode;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Desktop
        }
    }

    /// The capability that gates reading user files on this platform.
    pub fn storage_capability(self) -> StorageCapability {
        match self {
            Platform::Android => StorageCapability::ReadExternalStorage,
            Platform::Ios => StorageCapability::MediaLibrary,
            Platform::Desktop => StorageCapability::FileSystem,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageCapability {
    ReadExternalStorage,
    MediaLibrary,
    FileSystem,
}

impl StorageCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageCapability::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
            StorageCapability::MediaLibrary => "ios.permission.MEDIA_LIBRARY",
            StorageCapability::FileSystem => "file_system",
        }
    }
}

impl fmt::Display for StorageCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw answer from the OS prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied earlier with "don't ask again"; the OS no longer prompts
    Blocked,
    /// The capability does not exist on this device
    Unavailable,
}

#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("permission prompt failed: {0}")]
    Prompt(String),
}

/// OS-level permission prompt.
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    async fn request(
        &self,
        capability: StorageCapability,
    ) -> Result<PermissionStatus, PermissionError>;
}

/// Gate outcome seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

#[derive(Clone)]
pub struct PermissionGate {
    prompt: Arc<dyn PermissionPrompt>,
}

impl PermissionGate {
    pub fn new(prompt: Arc<dyn PermissionPrompt>) -> Self {
        Self { prompt }
    }

    /// Ask for storage access. Suspends until the user answers.
    ///
    /// Never fails: prompt errors are logged and treated as a denial.
    pub async fn request_access(&self, platform: Platform) -> Access {
        let capability = platform.storage_capability();
        tracing::debug!("Requesting {} on {:?}", capability, platform);

        match self.prompt.request(capability).await {
            Ok(PermissionStatus::Granted) => {
                tracing::info!("Storage access granted ({})", capability);
                Access::Granted
            }
            Ok(status) => {
                tracing::warn!("Storage access not granted ({}): {:?}", capability, status);
                Access::Denied
            }
            Err(e) => {
                tracing::error!("Permission error: {}", e);
                Access::Denied
            }
        }
    }
}

/// Asks with a native yes/no message dialog.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogPrompt;

#[async_trait]
impl PermissionPrompt for DialogPrompt {
    async fn request(
        &self,
        capability: StorageCapability,
    ) -> Result<PermissionStatus, PermissionError> {
        let answer = rfd::AsyncMessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title("Storage Access")
            .set_description(format!(
                "FileMitra needs to read the file you pick ({}). Allow access?",
                capability
            ))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            .await;

        Ok(status_for_answer(&answer))
    }
}

/// Only an affirmative button counts as a grant.
fn status_for_answer(answer: &rfd::MessageDialogResult) -> PermissionStatus {
    match answer {
        rfd::MessageDialogResult::Yes | rfd::MessageDialogResult::Ok => PermissionStatus::Granted,
        _ => PermissionStatus::Denied,
    }
}

/// Always gives the same answer without asking.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub PermissionStatus);

#[async_trait]
impl PermissionPrompt for FixedPrompt {
    async fn request(
        &self,
        _capability: StorageCapability,
    ) -> Result<PermissionStatus, PermissionError> {
        Ok(self.0)
    }
}

/// Prompt implementation for the configured mode.
pub fn prompt_for(mode: PermissionMode) -> Arc<dyn PermissionPrompt> {
    match mode {
        PermissionMode::Prompt => Arc::new(DialogPrompt),
        PermissionMode::Granted => Arc::new(FixedPrompt(PermissionStatus::Granted)),
    }
}
