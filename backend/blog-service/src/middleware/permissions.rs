/// Authorization module for blog-service
///
/// Ownership rules for posts and their embedded comments:
/// - post update: post author only
/// - post delete: post author or admin
/// - comment update: comment author only
/// - comment delete: comment author or admin (the post author has no
///   special right over other people's comments)
use crate::error::AppError;
use crate::metrics::OWNERSHIP_DECISIONS_TOTAL;
use crate::models::{BlogPost, Caller, Comment};

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

fn decide(action: &'static str, caller: Caller, allowed: bool, denial: &str) -> PermissionResult {
    let outcome = if allowed { "allowed" } else { "denied" };
    OWNERSHIP_DECISIONS_TOTAL
        .with_label_values(&[action, outcome])
        .inc();

    if allowed {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %caller.user_id,
            is_admin = caller.is_admin,
            action,
            "ownership check denied"
        );
        Err(AppError::forbidden(denial))
    }
}

/// Only the owner can update their own posts
pub fn check_post_update(caller: Caller, post: &BlogPost) -> PermissionResult {
    decide(
        "post_update",
        caller,
        post.author_id == caller.user_id,
        "You don't have permission to modify this post",
    )
}

/// Owner or admin can delete a post
pub fn check_post_deletion(caller: Caller, post: &BlogPost) -> PermissionResult {
    decide(
        "post_delete",
        caller,
        post.author_id == caller.user_id || caller.is_admin,
        "You don't have permission to delete this post",
    )
}

pub fn check_comment_update(caller: Caller, comment: &Comment) -> PermissionResult {
    decide(
        "comment_update",
        caller,
        comment.author_id == caller.user_id,
        "You don't have permission to modify this comment",
    )
}

pub fn check_comment_deletion(caller: Caller, comment: &Comment) -> PermissionResult {
    decide(
        "comment_delete",
        caller,
        comment.author_id == caller.user_id || caller.is_admin,
        "You don't have permission to delete this comment",
    )
}
