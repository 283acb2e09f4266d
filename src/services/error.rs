use thiserror::Error;

/// Generic text used when the server rejects an upload without saying why.
pub const GENERIC_REJECTION: &str = "Failed to upload file";

/// Everything that can end an upload attempt early.
///
/// Picker cancellation is not an error and has no variant here. Every
/// variant ends the attempt and returns the controller to idle. `Display`
/// is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Storage access is needed to pick files")]
    PermissionDenied,

    #[error("Failed to pick file")]
    PickerFailed(String),

    #[error("File size must be less than {}", format_limit(.limit_bytes))]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Unsupported file type")]
    UnsupportedType(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("{0}")]
    ServerRejected(String),

    #[error("Could not read the selected file: {0}")]
    FileUnreadable(String),
}

impl UploadError {
    /// Heading for the notification that carries this error.
    pub fn title(&self) -> &'static str {
        match self {
            UploadError::PermissionDenied => "Permission Required",
            _ => "Error",
        }
    }
}

/// A file exactly at the limit is accepted even though the message says
/// "less than".
fn format_limit(bytes: &u64) -> String {
    const MIB: u64 = 1024 * 1024;
    let bytes = *bytes;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.2}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
