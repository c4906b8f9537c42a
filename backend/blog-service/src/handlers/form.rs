/// Multipart form reader shared by the upload endpoints
use actix_multipart::Multipart;
use futures_util::stream::StreamExt;
use std::collections::HashMap;

use crate::assets::ImageUpload;
use crate::error::{AppError, Result};

/// Multipart field carrying the image file
pub const IMAGE_FIELD: &str = "image";

/// Text fields plus the optional `image` file of a multipart request
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}

/// Drain a multipart payload, buffering at most `max_bytes` across all fields
pub async fn read_upload_form(mut payload: Multipart, max_bytes: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    let mut total_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes =
                chunk.map_err(|e| AppError::validation(format!("Error reading upload field: {e}")))?;
            total_bytes += bytes.len();
            if total_bytes > max_bytes {
                return Err(AppError::validation(format!(
                    "Upload exceeds the {max_bytes} byte limit"
                )));
            }
            data.extend_from_slice(&bytes);
        }

        if name == IMAGE_FIELD {
            // browsers send an empty part when no file was picked
            if data.is_empty() && filename.as_deref().map_or(true, str::is_empty) {
                continue;
            }
            form.image = Some(ImageUpload::new(
                data,
                filename.unwrap_or_default(),
                content_type,
            ));
        } else {
            let value = String::from_utf8(data)
                .map_err(|_| AppError::validation(format!("Field '{name}' is not valid UTF-8")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
