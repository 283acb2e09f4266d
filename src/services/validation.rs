use crate::models::FileDescriptor;
use crate::services::error::UploadError;
use crate::services::registry::TypeRegistry;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(UploadError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Size and type policy applied before anything is sent.
///
/// Rules run in order and the first failure wins: size first, so an
/// oversized file of an unsupported type reports `FileTooLarge`.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<TypeRegistry>,
}

impl Validator {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn validate(&self, file: &FileDescriptor, max_size_bytes: u64) -> ValidationResult {
        if file.size_bytes > max_size_bytes {
            return ValidationResult::Invalid(UploadError::FileTooLarge {
                size_bytes: file.size_bytes,
                limit_bytes: max_size_bytes,
            });
        }

        if !self.registry.is_supported(&file.mime_type) {
            return ValidationResult::Invalid(UploadError::UnsupportedType(
                file.mime_type.clone(),
            ));
        }

        ValidationResult::Valid
    }
}
