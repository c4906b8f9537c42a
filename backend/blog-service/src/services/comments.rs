/// Comment service - comments live inside their parent post document
///
/// Every mutation loads the parent, changes its comment sequence in place and
/// writes the whole post back.
use std::sync::Arc;
use uuid::Uuid;

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_comment_deletion, check_comment_update};
use crate::models::{BlogPost, Caller, Comment};
use crate::state::AppContext;
use crate::validators::is_blank;

pub struct CommentService {
    store: Arc<dyn DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.store.clone())
    }

    async fn load_post(&self, post_id: Uuid) -> Result<BlogPost> {
        self.store
            .find_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog post not found"))
    }

    fn require_content(content: &str) -> Result<()> {
        if is_blank(content) {
            return Err(AppError::validation("Comment content is required"));
        }
        Ok(())
    }

    /// Append a comment authored by the caller; returns the updated post
    pub async fn add_comment(
        &self,
        caller: Caller,
        post_id: Uuid,
        content: String,
    ) -> Result<BlogPost> {
        Self::require_content(&content)?;

        let mut post = self.load_post(post_id).await?;
        let comment_id = post.push_comment(caller.user_id, content).id;
        self.store.save_post(&post).await?;

        tracing::info!(%post_id, %comment_id, user_id = %caller.user_id, "comment added");
        Ok(post)
    }

    /// Edit a comment in place; comment author only
    pub async fn update_comment(
        &self,
        caller: Caller,
        post_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> Result<Comment> {
        Self::require_content(&content)?;

        let mut post = self.load_post(post_id).await?;
        let comment = post
            .comment_mut(comment_id)
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
        check_comment_update(caller, comment)?;

        comment.edit(content);
        let updated = comment.clone();
        post.touch();
        self.store.save_post(&post).await?;

        tracing::info!(%post_id, %comment_id, user_id = %caller.user_id, "comment updated");
        Ok(updated)
    }

    /// Remove a comment; comment author or admin. Returns the updated post.
    pub async fn delete_comment(
        &self,
        caller: Caller,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<BlogPost> {
        let mut post = self.load_post(post_id).await?;
        let comment = post
            .comment(comment_id)
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
        check_comment_deletion(caller, comment)?;

        post.remove_comment(comment_id);
        self.store.save_post(&post).await?;

        tracing::info!(%post_id, %comment_id, user_id = %caller.user_id, "comment deleted");
        Ok(post)
    }
}
