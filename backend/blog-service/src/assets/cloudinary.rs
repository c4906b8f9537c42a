/// Cloudinary signed upload client
///
/// Uses the plain REST upload endpoint with an SHA-1 request signature:
/// `sha1("folder=<f>&timestamp=<t>" + api_secret)`.
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{AssetError, AssetStore, ImageUpload};
use crate::metrics::ASSET_UPLOADS_TOTAL;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Full upload URL override (tests, proxies)
    pub upload_url: Option<String>,
}

impl CloudinaryConfig {
    pub fn upload_url(&self) -> String {
        self.upload_url.clone().unwrap_or_else(|| {
            format!("{}/{}/image/upload", DEFAULT_API_BASE, self.cloud_name)
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryAssetStore {
    config: CloudinaryConfig,
    http_client: HttpClient,
}

impl CloudinaryAssetStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        tracing::info!(cloud = %config.cloud_name, "Cloudinary asset store initialized");
        Self {
            config,
            http_client: HttpClient::new(),
        }
    }

    /// Request signature over the signed params, sorted by name
    fn sign(&self, folder: &str, timestamp: i64) -> String {
        let to_sign = format!(
            "folder={folder}&timestamp={timestamp}{}",
            self.config.api_secret
        );
        hex::encode(Sha1::digest(to_sign.as_bytes()))
    }

    async fn send(&self, image: ImageUpload, folder: &str) -> Result<String, AssetError> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = self.sign(folder, timestamp);
        let mime = image.mime_or_default().to_string();

        let file_part = Part::bytes(image.bytes)
            .file_name(image.filename)
            .mime_str(&mime)
            .map_err(|e| AssetError::Rejected(format!("invalid content type {mime}: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", folder.to_string())
            .text("signature", signature);

        let response = self
            .http_client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("HTTP {status}"),
            };
            return Err(AssetError::Rejected(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AssetError::InvalidResponse(e.to_string()))?;

        Ok(body.secure_url)
    }
}

#[async_trait]
impl AssetStore for CloudinaryAssetStore {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, AssetError> {
        let size = image.bytes.len();
        match self.send(image, folder).await {
            Ok(url) => {
                ASSET_UPLOADS_TOTAL.with_label_values(&["success"]).inc();
                tracing::info!(%folder, size, "image uploaded to Cloudinary");
                Ok(url)
            }
            Err(err) => {
                ASSET_UPLOADS_TOTAL.with_label_values(&["error"]).inc();
                tracing::warn!(%folder, size, error = %err, "Cloudinary upload failed");
                Err(err)
            }
        }
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}
