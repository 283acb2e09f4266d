// FileMitra - send a picked file to a Telegram chat as a document
//
// This is the library crate containing the upload pipeline and its state.
// The binary crate (main.rs) wires it to native dialogs and the console.

pub mod config;
pub mod controller;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use controller::{AttemptReport, UploadController};
pub use models::{AppConfig, AppState, FileDescriptor, RemoteConfig, SessionState};
pub use services::{TypeRegistry, UploadError};
pub use state::{Notice, StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
