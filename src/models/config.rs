use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Public Bot API host used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.telegram.org";

/// Largest file accepted for upload by default (10 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Full application configuration, resolved once at startup.
///
/// Loaded by [`ConfigManager`](crate::config::ConfigManager) from built-in
/// defaults, an optional `filemitra.yaml`, and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub remote: RemoteConfig,
    pub upload: UploadSettings,
    pub permission: PermissionSettings,
    pub logging: LoggingSettings,
}

/// Where documents are delivered.
///
/// Immutable for the lifetime of the process and shared with the uploader
/// behind an `Arc`. The token never appears in `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint_base_url: String,
    pub auth_token: String,
    pub target_chat_id: String,
}

impl RemoteConfig {
    pub fn new(
        endpoint_base_url: impl Into<String>,
        auth_token: impl Into<String>,
        target_chat_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_base_url: endpoint_base_url.into(),
            auth_token: auth_token.into(),
            target_chat_id: target_chat_id.into(),
        }
    }

    /// Full `sendDocument` URL. Contains the token, so never log it.
    pub fn send_document_url(&self) -> String {
        format!(
            "{}/bot{}/sendDocument",
            self.endpoint_base_url.trim_end_matches('/'),
            self.auth_token
        )
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint_base_url: DEFAULT_ENDPOINT.to_string(),
            auth_token: String::new(),
            target_chat_id: String::new(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.auth_token.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };

        f.debug_struct("RemoteConfig")
            .field("endpoint_base_url", &self.endpoint_base_url)
            .field("auth_token", &token)
            .field("target_chat_id", &self.target_chat_id)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Inclusive upper bound on file size
    pub max_size_bytes: u64,

    /// Whole-request timeout enforced by the HTTP client
    pub request_timeout_secs: u64,

    /// Read size for the streamed file part; one progress report per chunk
    pub chunk_size_bytes: usize,
}

impl UploadSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            request_timeout_secs: 120,
            chunk_size_bytes: 64 * 1024,
        }
    }
}

/// How storage access is obtained before the picker opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Ask the user with a native yes/no dialog
    #[default]
    Prompt,
    /// Access is implicit on this platform; never ask
    Granted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSettings {
    pub mode: PermissionMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Utf8PathBuf,
    pub prefix: String,
    pub debug: bool,
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("logs"),
            prefix: "filemitra".to_string(),
            debug: false,
            console: true,
        }
    }
}
