//! Shared fixtures for blog-service integration tests
//!
//! Builds an [`AppContext`] over the in-memory document and asset stores and
//! signs tokens with the RSA test key pair.
#![allow(dead_code)]

use async_trait::async_trait;
use blog_service::assets::{AssetError, AssetStore, ImageUpload, InMemoryAssetStore};
use blog_service::db::{DocumentStore, InMemoryDocumentStore};
use blog_service::models::{Caller, User};
use blog_service::AppContext;
use crypto_core::{hash_password, JwtKeys};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_keys() -> Arc<JwtKeys> {
    Arc::new(
        JwtKeys::from_pem(
            include_str!("../fixtures/jwt_test_private.pem"),
            include_str!("../fixtures/jwt_test_public.pem"),
        )
        .expect("test key pair"),
    )
}

/// Asset store that refuses every upload
#[derive(Default)]
pub struct FailingAssetStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl AssetStore for FailingAssetStore {
    async fn upload(&self, _image: ImageUpload, _folder: &str) -> Result<String, AssetError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AssetError::Transport("connection refused".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct TestContext {
    pub ctx: AppContext,
    pub store: InMemoryDocumentStore,
    pub assets: InMemoryAssetStore,
}

pub fn memory_context() -> TestContext {
    let store = InMemoryDocumentStore::new();
    let assets = InMemoryAssetStore::new();
    let ctx = AppContext::new(
        Arc::new(store.clone()),
        Arc::new(assets.clone()),
        test_keys(),
    );
    TestContext { ctx, store, assets }
}

/// Context whose asset store always fails
pub fn failing_upload_context() -> (TestContext, Arc<FailingAssetStore>) {
    let store = InMemoryDocumentStore::new();
    let failing = Arc::new(FailingAssetStore::default());
    let ctx = AppContext::new(Arc::new(store.clone()), failing.clone(), test_keys());
    (
        TestContext {
            ctx,
            store,
            assets: InMemoryAssetStore::new(),
        },
        failing,
    )
}

/// Store a user with [`TEST_PASSWORD`] and return it
pub async fn seed_user(store: &InMemoryDocumentStore, username: &str, is_admin: bool) -> User {
    let mut user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        hash_password(TEST_PASSWORD).expect("hash"),
    );
    user.is_admin = is_admin;
    store.save_user(&user).await.expect("seed user");
    user
}

pub fn caller_for(user: &User) -> Caller {
    Caller {
        user_id: user.id,
        is_admin: user.is_admin,
    }
}

/// `Authorization` header value for `user`
pub fn bearer(keys: &JwtKeys, user: &User) -> String {
    let token = keys
        .generate_access_token(user.id, &user.email, &user.username, user.is_admin)
        .expect("token");
    format!("Bearer {token}")
}

pub fn png(name: &str) -> ImageUpload {
    ImageUpload::new(vec![0x89, b'P', b'N', b'G'], name, Some("image/png".to_string()))
}
