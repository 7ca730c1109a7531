//! Checks applied to a menu file before upload.

use cafeteria_core::MenuFileKind;

use crate::error::UploadError;

/// Maximum accepted file size (10 MiB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted MIME types.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Validate a file and return its kind.
pub fn validate(content_type: &str, size: usize) -> Result<MenuFileKind, UploadError> {
    let content_type = content_type.trim().to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType(content_type));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }
    Ok(MenuFileKind::from_content_type(&content_type))
}
