use camino::Utf8Path;
use indexmap::IndexMap;

/// Label returned for MIME types the registry does not know.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Fallback MIME type for picked files with an unrecognised extension.
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedType {
    pub label: String,
    pub extensions: Vec<String>,
}

/// The set of document types accepted for upload.
///
/// Built once at startup and only read afterwards. Keys are stored
/// lowercase; lookups ignore ASCII case. Iteration follows insertion order,
/// which is the order types are listed to the user.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: IndexMap<String, SupportedType>,
}

impl TypeRegistry {
    pub fn empty() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Add a type. Re-registering a MIME type replaces its entry.
    pub fn with_type(mut self, mime_type: &str, label: &str, extensions: &[&str]) -> Self {
        self.types.insert(
            mime_type.to_ascii_lowercase(),
            SupportedType {
                label: label.to_string(),
                extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            },
        );
        self
    }

    pub fn is_supported(&self, mime_type: &str) -> bool {
        self.types.contains_key(&mime_type.to_ascii_lowercase())
    }

    pub fn label_for(&self, mime_type: &str) -> &str {
        self.types
            .get(&mime_type.to_ascii_lowercase())
            .map(|t| t.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// MIME types handed to the picker as the allowed set.
    pub fn mime_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.types.values().map(|t| t.label.as_str())
    }

    /// Extensions for the given MIME types, in registry order, deduplicated.
    /// Unknown MIME types contribute nothing.
    pub fn extensions_for(&self, mime_types: &[String]) -> Vec<String> {
        let mut extensions: Vec<String> = Vec::new();

        for mime in mime_types {
            if let Some(entry) = self.types.get(&mime.to_ascii_lowercase()) {
                for ext in &entry.extensions {
                    if !extensions.contains(ext) {
                        extensions.push(ext.clone());
                    }
                }
            }
        }

        extensions
    }

    /// MIME type for a path, judged by its extension.
    pub fn mime_for_path(&self, path: &Utf8Path) -> Option<&str> {
        let ext = path.extension()?.to_ascii_lowercase();

        self.types
            .iter()
            .find(|(_, entry)| entry.extensions.contains(&ext))
            .map(|(mime, _)| mime.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    /// The document types the Bot API upload flow accepts.
    fn default() -> Self {
        Self::empty()
            .with_type("application/pdf", "PDF", &["pdf"])
            .with_type("image/jpeg", "JPEG Image", &["jpg", "jpeg"])
            .with_type("image/png", "PNG Image", &["png"])
            .with_type("application/msword", "DOC", &["doc"])
            .with_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "DOCX",
                &["docx"],
            )
    }
}
