use camino::Utf8PathBuf;

/// A file chosen by the user, as handed to validation and upload.
///
/// Built once by the [`FileSelector`](crate::services::FileSelector) and never
/// mutated afterwards. `path` is the handle the uploader streams from; the
/// other fields are what the picker reported about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub path: Utf8PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Size in mebibytes, the unit used when showing the file to the user.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}
