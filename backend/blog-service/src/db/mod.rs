/// Document store access layer
///
/// The engine persists two document kinds: `User` and `BlogPost` (with its
/// comments embedded). Every write replaces a whole document; there are no
/// multi-document transactions.
pub mod memory;
pub mod pg_store;

pub use memory::InMemoryDocumentStore;
pub use pg_store::PgDocumentStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{BlogPost, PostFilter, User};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Users for the given ids; unknown ids are skipped
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Insert or replace a user document
    async fn save_user(&self, user: &User) -> Result<()>;

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<BlogPost>>;

    /// Posts matching `filter`, newest first
    async fn find_posts(&self, filter: PostFilter) -> Result<Vec<BlogPost>>;

    /// Insert or replace a post document, comments included
    async fn save_post(&self, post: &BlogPost) -> Result<()>;

    /// Delete a post and its comments; `false` if it did not exist
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Readiness probe
    async fn ping(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}
