/// Process-local asset store for development and tests
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{AssetError, AssetStore, ImageUpload};
use crate::metrics::ASSET_UPLOADS_TOTAL;

#[derive(Clone, Default)]
pub struct InMemoryAssetStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(url).cloned()
    }
}

#[async_trait]
impl AssetStore for InMemoryAssetStore {
    async fn upload(&self, image: ImageUpload, folder: &str) -> Result<String, AssetError> {
        let ext = image.extension().unwrap_or_else(|| "bin".to_string());
        let url = format!("memory://{folder}/{}.{ext}", Uuid::new_v4());

        self.objects
            .lock()
            .map_err(|_| AssetError::Transport("asset map poisoned".to_string()))?
            .insert(url.clone(), image.bytes);

        ASSET_UPLOADS_TOTAL.with_label_values(&["success"]).inc();
        Ok(url)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
