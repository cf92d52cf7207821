//! Buffered multipart form reading with a size cap.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::StreamExt;

use playgrade_core::domain::image_extension;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// A file part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text fields and files of one multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Drain the payload. Fails with 413 once more than `max_bytes` arrive.
    pub async fn read(mut payload: Multipart, max_bytes: usize) -> AppResult<Self> {
        let mut form = Self::default();
        let mut total = 0usize;

        while let Some(field) = payload.next().await {
            let mut field =
                field.map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;

            let name = field.name().unwrap_or_default().to_owned();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_owned);

            let mut data = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;
                total += chunk.len();
                if total > max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Upload exceeds the {max_bytes} byte limit"
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match filename {
                // Browsers send an unnamed empty part for an untouched file input.
                Some(filename) if filename.is_empty() && data.is_empty() => {}
                Some(filename) => {
                    form.files.insert(
                        name,
                        UploadedFile {
                            filename,
                            bytes: data,
                        },
                    );
                }
                None => {
                    let value = String::from_utf8(data).map_err(|_| {
                        AppError::bad_request(format!("Field '{name}' is not valid UTF-8"))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field, trimmed; `None` if missing or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Check the extension and store the file under a random name.
/// Returns the public URL.
pub async fn store_image(state: &AppState, file: &UploadedFile) -> AppResult<String> {
    let extension = image_extension(&file.filename)?;
    let url = state.images.save(&extension, &file.bytes).await?;
    Ok(url)
}
