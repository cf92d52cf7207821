use crate::error::DomainError;

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Lower-cased extension of an uploaded file, if it is on the allow-list.
pub fn image_extension(filename: &str) -> Result<String, DomainError> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            DomainError::validation("Invalid file type. Allowed: png, jpg, jpeg, gif")
        })
}
