/// Business logic layer for blog-service
///
/// - Post service: post authoring, listing, ownership-checked updates/deletes
/// - Comment service: comments embedded in their parent post
/// - User service: registration, login, profile and profile image
pub mod comments;
pub mod posts;
pub mod users;

pub use comments::CommentService;
pub use posts::{NewPost, PostChanges, PostService};
pub use users::{LoginOutcome, ProfileChanges, Registration, UserService};
