use serde::Serialize;

use crate::error::AppError;
use crate::models::ImageFile;

pub const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];
pub const MAX_FILE_SIZE: usize = 32 * 1024 * 1024; // 32MB

pub const NO_FILE_MESSAGE: &str = "No file selected";
pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Please upload a JPEG, PNG or WebP image.";
pub const TOO_LARGE_MESSAGE: &str = "File size exceeds the 32MB limit.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageValidation {
    pub valid: bool,
    pub error: Option<String>,
}

impl ImageValidation {
    fn ok() -> Self {
        Self { valid: true, error: None }
    }

    fn rejected(message: &str) -> Self {
        Self {
            valid: false,
            error: Some(message.to_string()),
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self.error {
            Some(message) => Err(AppError::Validation(message)),
            None => Ok(()),
        }
    }
}

/// Checks presence, then type, then size, and stops at the first failure.
pub fn validate_image_file(file: Option<&ImageFile>) -> ImageValidation {
    let Some(file) = file else {
        return ImageValidation::rejected(NO_FILE_MESSAGE);
    };

    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return ImageValidation::rejected(INVALID_TYPE_MESSAGE);
    }

    if file.size() > MAX_FILE_SIZE {
        return ImageValidation::rejected(TOO_LARGE_MESSAGE);
    }

    ImageValidation::ok()
}
