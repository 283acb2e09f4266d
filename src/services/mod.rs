//! Services module - the stages of the upload pipeline.
//!
//! Each stage is framework-agnostic and knows nothing about rendering. The
//! OS-facing collaborators (permission prompt, file picker, remote endpoint)
//! sit behind async traits so the controller can be driven by mocks in tests.
//!
//! # Components
//!
//! - [`TypeRegistry`]: supported MIME types, their labels and extensions
//! - [`PermissionGate`]: storage access via a [`PermissionPrompt`]
//! - [`FileSelector`]: file choice via a [`FilePicker`]
//! - [`Validator`]: size and type policy
//! - [`DocumentUploader`] / [`TelegramUploader`]: multipart delivery with progress
//! - [`UploadError`]: everything that ends an attempt early

pub mod error;
pub mod permission;
pub mod registry;
pub mod selector;
pub mod upload;
pub mod validation;

pub use error::{GENERIC_REJECTION, UploadError};
pub use permission::{
    Access, DialogPrompt, FixedPrompt, PermissionError, PermissionGate, PermissionPrompt,
    PermissionStatus, Platform, StorageCapability, prompt_for,
};
pub use registry::{OCTET_STREAM, SupportedType, TypeRegistry, UNKNOWN_LABEL};
pub use selector::{FilePicker, FileSelector, NativePicker, PickerError, Selection, describe_path};
pub use upload::{
    Delivery, DocumentUploader, ProgressReporter, TelegramUploader, UploadOutcome,
    classify_response, percent_of,
};
pub use validation::{ValidationResult, Validator};
