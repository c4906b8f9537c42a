/// Post service - post authoring, listing and ownership-checked mutation
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::assets::{AssetStore, ImageUpload, POST_IMAGE_FOLDER};
use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_post_deletion, check_post_update};
use crate::models::{BlogPost, Caller, PostFilter, PostView, User};
use crate::state::AppContext;
use crate::validators::{is_blank, non_blank};

/// Input for [`PostService::create_post`]
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

/// Field changes for [`PostService::update_post`]; blank values count as absent
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub struct PostService {
    store: Arc<dyn DocumentStore>,
    assets: Arc<dyn AssetStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { store, assets }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.store.clone(), ctx.assets.clone())
    }

    async fn load(&self, post_id: Uuid) -> Result<BlogPost> {
        self.store
            .find_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Blog post not found"))
    }

    async fn users_by_id(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, User>> {
        let users = self.store.find_users_by_ids(ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    /// Create a post owned by the caller
    ///
    /// Input (including the image type) is validated before anything is
    /// uploaded or written, and the caller's account must still exist. An
    /// upload failure aborts without storing a post.
    pub async fn create_post(&self, caller: Caller, input: NewPost) -> Result<BlogPost> {
        let title = non_blank(Some(input.title.as_str()))
            .ok_or_else(|| AppError::validation("Title and content are required"))?
            .to_string();
        if is_blank(&input.content) {
            return Err(AppError::validation("Title and content are required"));
        }
        if let Some(image) = &input.image {
            image.validate().map_err(AppError::Validation)?;
        }

        // a token can outlive its account
        if self.store.find_user_by_id(caller.user_id).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        let image_url = match input.image {
            Some(image) => Some(self.assets.upload(image, POST_IMAGE_FOLDER).await?),
            None => None,
        };

        let post = BlogPost::new(title, input.content, caller.user_id, image_url);
        self.store.save_post(&post).await?;

        tracing::info!(post_id = %post.id, user_id = %caller.user_id, "post created");
        Ok(post)
    }

    /// Update title and/or content; author only
    pub async fn update_post(
        &self,
        caller: Caller,
        post_id: Uuid,
        changes: PostChanges,
    ) -> Result<BlogPost> {
        let title = non_blank(changes.title.as_deref()).map(str::to_string);
        let content = changes.content.filter(|c| !is_blank(c));
        if title.is_none() && content.is_none() {
            return Err(AppError::validation(
                "At least one of title or content must be provided",
            ));
        }

        let mut post = self.load(post_id).await?;
        check_post_update(caller, &post)?;

        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        post.touch();

        self.store.save_post(&post).await?;

        tracing::info!(post_id = %post.id, user_id = %caller.user_id, "post updated");
        Ok(post)
    }

    /// Delete a post with all of its comments; author or admin
    pub async fn delete_post(&self, caller: Caller, post_id: Uuid) -> Result<()> {
        let post = self.load(post_id).await?;
        check_post_deletion(caller, &post)?;

        if !self.store.delete_post(post_id).await? {
            return Err(AppError::not_found("Blog post not found"));
        }

        tracing::info!(
            %post_id,
            user_id = %caller.user_id,
            comments = post.comments.len(),
            "post deleted"
        );
        Ok(())
    }

    /// All posts, newest first, with the post author resolved
    pub async fn list_posts(&self) -> Result<Vec<PostView>> {
        let posts = self.store.find_posts(PostFilter::all()).await?;

        let mut author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let users = self.users_by_id(&author_ids).await?;

        Ok(posts
            .into_iter()
            .map(|p| PostView::with_author(p, &users))
            .collect())
    }

    /// One post with its author and every commenter resolved
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostView> {
        let post = self.load(post_id).await?;
        let users = self.users_by_id(&post.referenced_user_ids()).await?;
        Ok(PostView::with_all_authors(post, &users))
    }

    /// The caller's own posts, newest first
    pub async fn list_own_posts(&self, caller: Caller) -> Result<Vec<BlogPost>> {
        self.store
            .find_posts(PostFilter::by_author(caller.user_id))
            .await
    }
}
