/// Data models for blog-service
///
/// This module defines structures for:
/// - User: registered account with credentials and profile image
/// - BlogPost: authored post owning an ordered sequence of comments
/// - Comment: embedded in its parent post, never stored on its own
/// - Caller: authenticated identity attached to a request
pub mod post;
pub mod user;

pub use post::{BlogPost, Comment, CommentView, PostFilter, PostView};
pub use user::{AuthorSummary, User, UserProfile};

use uuid::Uuid;

/// Authenticated identity making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}
