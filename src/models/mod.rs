//! Data models for FileMitra.
//!
//! - [`AppState`]: the controller's session state (phase + optional [`UploadSession`])
//! - [`FileDescriptor`]: a picked file as seen by validation and upload
//! - [`AppConfig`]: resolved configuration, including the [`RemoteConfig`] the uploader targets

pub mod app_state;
pub mod config;
pub mod file;

pub use app_state::{AppState, SessionState, UploadSession};
pub use config::{
    AppConfig, LoggingSettings, PermissionMode, PermissionSettings, RemoteConfig, UploadSettings,
};
pub use file::FileDescriptor;
