use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{AuthorSummary, User};

/// Blog post document
///
/// `comments` is an owning, insertion-ordered sequence. A comment id is only
/// meaningful inside the post that holds it; removing one never reorders the
/// rest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    /// Empty when the post has no image
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<Comment>,
}

/// Comment embedded in a [`BlogPost`]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn new(title: String, content: String, author_id: Uuid, image_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            author_id,
            image_url: image_url.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        }
    }

    /// Refresh `updated_at`, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = std::cmp::max(Utc::now(), self.updated_at);
    }

    fn comment_index(&self, comment_id: Uuid) -> Option<usize> {
        self.comments.iter().position(|c| c.id == comment_id)
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comment_index(comment_id).map(|idx| &self.comments[idx])
    }

    pub fn comment_mut(&mut self, comment_id: Uuid) -> Option<&mut Comment> {
        let idx = self.comment_index(comment_id)?;
        self.comments.get_mut(idx)
    }

    /// Append a comment at the end of the sequence
    pub fn push_comment(&mut self, author_id: Uuid, content: String) -> &Comment {
        let now = Utc::now();
        self.comments.push(Comment {
            id: Uuid::new_v4(),
            author_id,
            content,
            created_at: now,
            updated_at: now,
        });
        self.touch();
        // just pushed
        &self.comments[self.comments.len() - 1]
    }

    /// Remove a comment by identity, keeping the relative order of the rest
    pub fn remove_comment(&mut self, comment_id: Uuid) -> Option<Comment> {
        let idx = self.comment_index(comment_id)?;
        let removed = self.comments.remove(idx);
        self.touch();
        Some(removed)
    }

    /// Every user id this post references (author first, then commenters)
    pub fn referenced_user_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.author_id];
        for comment in &self.comments {
            if !ids.contains(&comment.author_id) {
                ids.push(comment.author_id);
            }
        }
        ids
    }
}

impl Comment {
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = std::cmp::max(Utc::now(), self.updated_at);
    }
}

/// Filter for post listings; results are always newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
        }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        self.author_id.map_or(true, |id| post.author_id == id)
    }
}

/// Post with author identities resolved for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    /// `None` when the author account no longer resolves
    pub author: Option<AuthorSummary>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: Option<AuthorSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    /// Resolve the post author only; commenters keep their bare ids
    pub fn with_author(post: BlogPost, users: &HashMap<Uuid, User>) -> Self {
        Self::build(post, users, false)
    }

    /// Resolve the post author and every commenter
    pub fn with_all_authors(post: BlogPost, users: &HashMap<Uuid, User>) -> Self {
        Self::build(post, users, true)
    }

    fn build(post: BlogPost, users: &HashMap<Uuid, User>, resolve_comments: bool) -> Self {
        let summary = |id: &Uuid| users.get(id).map(AuthorSummary::from);

        let comments = post
            .comments
            .into_iter()
            .map(|c| CommentView {
                author: if resolve_comments {
                    summary(&c.author_id)
                } else {
                    None
                },
                id: c.id,
                author_id: c.author_id,
                content: c.content,
                created_at: c.created_at,
                updated_at: c.updated_at,
            })
            .collect();

        Self {
            author: summary(&post.author_id),
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            image_url: post.image_url,
            created_at: post.created_at,
            updated_at: post.updated_at,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_comments(n: usize) -> BlogPost {
        let mut post = BlogPost::new("t".into(), "c".into(), Uuid::new_v4(), None);
        for i in 0..n {
            post.push_comment(Uuid::new_v4(), format!("comment {i}"));
        }
        post
    }

    #[test]
    fn test_new_post_without_image_has_empty_url() {
        let post = BlogPost::new("Hello".into(), "World".into(), Uuid::new_v4(), None);
        assert_eq!(post.image_url, "");
        assert!(post.comments.is_empty());
    }

    #[test]
    fn test_push_comment_appends_in_order() {
        let post = post_with_comments(3);
        let contents: Vec<_> = post.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["comment 0", "comment 1", "comment 2"]);
    }

    #[test]
    fn test_remove_middle_comment_preserves_order() {
        let mut post = post_with_comments(3);
        let ids: Vec<Uuid> = post.comments.iter().map(|c| c.id).collect();

        let removed = post.remove_comment(ids[1]).expect("comment exists");
        assert_eq!(removed.id, ids[1]);

        let remaining: Vec<Uuid> = post.comments.iter().map(|c| c.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_remove_unknown_comment_is_none() {
        let mut post = post_with_comments(2);
        assert!(post.remove_comment(Uuid::new_v4()).is_none());
        assert_eq!(post.comments.len(), 2);
    }

    #[test]
    fn test_comment_edit_keeps_position() {
        let mut post = post_with_comments(3);
        let target = post.comments[1].id;
        post.comment_mut(target).expect("exists").edit("edited".into());

        assert_eq!(post.comments[1].id, target);
        assert_eq!(post.comments[1].content, "edited");
        assert!(post.comments[1].updated_at >= post.comments[1].created_at);
    }

    #[test]
    fn test_referenced_user_ids_are_unique() {
        let author = Uuid::new_v4();
        let commenter = Uuid::new_v4();
        let mut post = BlogPost::new("t".into(), "c".into(), author, None);
        post.push_comment(commenter, "one".into());
        post.push_comment(commenter, "two".into());
        post.push_comment(author, "three".into());

        assert_eq!(post.referenced_user_ids(), vec![author, commenter]);
    }

    #[test]
    fn test_filter_by_author() {
        let author = Uuid::new_v4();
        let post = BlogPost::new("t".into(), "c".into(), author, None);
        assert!(PostFilter::all().matches(&post));
        assert!(PostFilter::by_author(author).matches(&post));
        assert!(!PostFilter::by_author(Uuid::new_v4()).matches(&post));
    }
}
