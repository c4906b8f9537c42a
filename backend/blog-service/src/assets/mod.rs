/// Asset store for post and profile images
///
/// The engine only sees [`AssetStore::upload`]: bytes in, stable URL out.
/// Failures are reported, never retried. An upload that succeeds before a
/// later document write fails leaves an orphaned asset behind; nothing tries
/// to clean it up.
pub mod cloudinary;
pub mod memory;

pub use cloudinary::{CloudinaryAssetStore, CloudinaryConfig};
pub use memory::InMemoryAssetStore;

use async_trait::async_trait;
use thiserror::Error;

/// Folder for blog post images
pub const POST_IMAGE_FOLDER: &str = "blogs";
/// Folder for profile pictures
pub const PROFILE_IMAGE_FOLDER: &str = "profile_images";

/// Image formats accepted for upload (matched against extension and MIME subtype)
const ALLOWED_IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum AssetError {
    /// Asset host answered but refused the upload
    #[error("asset host rejected upload: {0}")]
    Rejected(String),

    /// Request never completed
    #[error("asset host unreachable: {0}")]
    Transport(String),

    /// Asset host answered with something we cannot read
    #[error("unexpected asset host response: {0}")]
    InvalidResponse(String),
}

/// Binary image received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type,
        }
    }

    /// Lower-cased file extension, if any
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    /// Check the upload is a non-empty image of an accepted type
    ///
    /// Both the file extension and the declared MIME type must name an
    /// accepted format.
    pub fn validate(&self) -> Result<(), String> {
        if self.bytes.is_empty() {
            return Err("Image file is empty".to_string());
        }

        let ext_ok = self
            .extension()
            .map_or(false, |ext| ALLOWED_IMAGE_TYPES.contains(&ext.as_str()));

        let mime_ok = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .map_or(false, |m| {
                m.type_() == mime::IMAGE && ALLOWED_IMAGE_TYPES.contains(&m.subtype().as_str())
            });

        if ext_ok && mime_ok {
            Ok(())
        } else {
            Err("Only image files are allowed (jpeg, jpg, png, gif, webp)".to_string())
        }
    }

    pub fn mime_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Third-party asset host
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload an image into `folder` and return its public URL
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, AssetError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
