/// Process-local document store for development and tests
///
/// Enforces the same username/email uniqueness as the Postgres indexes so the
/// engine sees identical conflict behavior on either backend.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{BlogPost, PostFilter, User};

#[derive(Default)]
struct Documents {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, BlogPost>,
}

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<RwLock<Documents>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn post_count(&self) -> usize {
        self.inner.read().await.posts.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let docs = self.inner.read().await;
        Ok(docs.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let docs = self.inner.read().await;
        Ok(docs.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let docs = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| docs.users.get(id).cloned()).collect())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let mut docs = self.inner.write().await;

        let clash = docs.users.values().any(|other| {
            other.id != user.id && (other.username == user.username || other.email == user.email)
        });
        if clash {
            return Err(AppError::Conflict(
                "Username or email already in use".to_string(),
            ));
        }

        docs.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<BlogPost>> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    async fn find_posts(&self, filter: PostFilter) -> Result<Vec<BlogPost>> {
        let docs = self.inner.read().await;
        let mut posts: Vec<BlogPost> = docs
            .posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn save_post(&self, post: &BlogPost) -> Result<()> {
        let mut docs = self.inner.write().await;
        if !docs.users.contains_key(&post.author_id) {
            return Err(AppError::Database(format!(
                "post author {} does not exist",
                post.author_id
            )));
        }
        docs.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.write().await.posts.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
