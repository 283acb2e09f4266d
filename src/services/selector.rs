use crate::models::FileDescriptor;
use crate::services::error::UploadError;
use crate::services::registry::{OCTET_STREAM, TypeRegistry};
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// What the user did with the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen(FileDescriptor),
    Cancelled,
}

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("picker unavailable: {0}")]
    Platform(String),

    #[error("selected path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("failed to read metadata for {path}: {source}")]
    Metadata {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("selected path is not a regular file: {0}")]
    NotAFile(Utf8PathBuf),
}

/// External file-picker collaborator.
///
/// `Ok(None)` means the user closed the picker without choosing.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick(&self, allowed_types: &[String]) -> Result<Option<FileDescriptor>, PickerError>;
}

#[derive(Clone)]
pub struct FileSelector {
    picker: Arc<dyn FilePicker>,
}

impl FileSelector {
    pub fn new(picker: Arc<dyn FilePicker>) -> Self {
        Self { picker }
    }

    /// Open the picker restricted to `allowed_types`.
    ///
    /// Cancellation is a normal result, not an error; only picker failures
    /// surface as [`UploadError::PickerFailed`].
    pub async fn pick_file(&self, allowed_types: &[String]) -> Result<Selection, UploadError> {
        match self.picker.pick(allowed_types).await {
            Ok(Some(file)) => {
                tracing::info!(
                    "Picked {} ({}, {} bytes)",
                    file.name,
                    file.mime_type,
                    file.size_bytes
                );
                Ok(Selection::Chosen(file))
            }
            Ok(None) => {
                tracing::debug!("Picker cancelled");
                Ok(Selection::Cancelled)
            }
            Err(e) => {
                tracing::error!("Picker Error: {}", e);
                Err(UploadError::PickerFailed(e.to_string()))
            }
        }
    }
}

/// Native file dialog via `rfd`, filtered by the registry's extensions.
pub struct NativePicker {
    registry: Arc<TypeRegistry>,
}

impl NativePicker {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl FilePicker for NativePicker {
    async fn pick(&self, allowed_types: &[String]) -> Result<Option<FileDescriptor>, PickerError> {
        let extensions = self.registry.extensions_for(allowed_types);

        let mut dialog = rfd::AsyncFileDialog::new().set_title("Pick a File");
        if !extensions.is_empty() {
            dialog = dialog.add_filter("Supported files", extensions.as_slice());
        }

        let Some(handle) = dialog.pick_file().await else {
            return Ok(None);
        };

        describe_picked(handle.path().to_path_buf(), &self.registry)
            .await
            .map(Some)
    }
}

/// Descriptor for a path handed back by a native dialog.
async fn describe_picked(
    path: PathBuf,
    registry: &TypeRegistry,
) -> Result<FileDescriptor, PickerError> {
    let path = Utf8PathBuf::from_path_buf(path)
        .map_err(|p| PickerError::NonUtf8Path(p.display().to_string()))?;

    describe_path(&path, registry).await
}

/// Build a descriptor for a file on disk.
///
/// The MIME type comes from the extension; unknown extensions get
/// `application/octet-stream` and are left for the validator to reject.
pub async fn describe_path(
    path: &Utf8Path,
    registry: &TypeRegistry,
) -> Result<FileDescriptor, PickerError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| PickerError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

    if !metadata.is_file() {
        return Err(PickerError::NotAFile(path.to_path_buf()));
    }

    let name = path.file_name().unwrap_or(path.as_str()).to_string();
    let mime_type = registry.mime_for_path(path).unwrap_or(OCTET_STREAM);

    Ok(FileDescriptor::new(path, name, mime_type, metadata.len()))
}
