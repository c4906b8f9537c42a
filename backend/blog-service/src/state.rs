/// Shared application context
///
/// Built once at start-up and handed to every handler through
/// `web::Data<AppContext>`. Nothing in here is mutated after construction.
use crypto_core::JwtKeys;
use std::sync::Arc;

use crate::assets::AssetStore;
use crate::db::DocumentStore;

/// Default cap for a multipart request body, all fields combined (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DocumentStore>,
    pub assets: Arc<dyn AssetStore>,
    pub jwt: Arc<JwtKeys>,
    pub max_upload_bytes: usize,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        assets: Arc<dyn AssetStore>,
        jwt: Arc<JwtKeys>,
    ) -> Self {
        Self {
            store,
            assets,
            jwt,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
