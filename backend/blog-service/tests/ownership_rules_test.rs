//! Integration Tests: Post & Comment Ownership
//!
//! Exercises the post, comment and user services against the in-memory
//! document store.
//!
//! Coverage:
//! - Post update is author-only (admins included)
//! - Post delete allowed to author or admin, and drops embedded comments
//! - Comment edit is author-only; comment delete allows author or admin
//! - Comment order survives deletion
//! - Blank content is rejected before the store is touched
//! - Missing posts, comments and accounts surface as not-found
//! - Upload failure leaves no post behind
//! - Registration conflicts and login outcomes

mod common;

use blog_service::db::DocumentStore;
use blog_service::error::AppError;
use blog_service::models::Caller;
use blog_service::services::{
    CommentService, NewPost, PostChanges, PostService, ProfileChanges, Registration, UserService,
};
use common::{caller_for, failing_upload_context, memory_context, png, seed_user, TEST_PASSWORD};
use std::sync::atomic::Ordering;
use uuid::Uuid;

fn new_post(title: &str, content: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: content.to_string(),
        image: None,
    }
}

#[tokio::test]
async fn test_create_post_without_image() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;

    let post = PostService::from_context(&t.ctx)
        .create_post(caller_for(&u1), new_post("Hello", "World"))
        .await
        .expect("create");

    assert_eq!(post.author_id, u1.id);
    assert_eq!(post.image_url, "");
    assert_eq!(post.title, "Hello");
    assert!(t.store.find_post_by_id(post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_post_trims_title_and_uploads_image() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;

    let mut input = new_post("  Spaced  ", "body");
    input.image = Some(png("cover.png"));
    let post = PostService::from_context(&t.ctx)
        .create_post(caller_for(&u1), input)
        .await
        .expect("create");

    assert_eq!(post.title, "Spaced");
    assert!(post.image_url.starts_with("memory://blogs/"));
    assert_eq!(t.assets.len(), 1);
}

#[tokio::test]
async fn test_create_post_validates_before_upload() {
    let (t, failing) = failing_upload_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let service = PostService::from_context(&t.ctx);

    let mut blank_title = new_post("   ", "body");
    blank_title.image = Some(png("a.png"));
    let err = service
        .create_post(caller_for(&u1), blank_title)
        .await
        .expect_err("blank title");
    assert!(matches!(err, AppError::Validation(_)));

    let mut wrong_type = new_post("t", "c");
    wrong_type.image = Some(blog_service::assets::ImageUpload::new(
        vec![1, 2, 3],
        "doc.pdf",
        Some("application/pdf".to_string()),
    ));
    let err = service
        .create_post(caller_for(&u1), wrong_type)
        .await
        .expect_err("pdf");
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(failing.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_failure_stores_no_post() {
    let (t, failing) = failing_upload_context();
    let u1 = seed_user(&t.store, "u1", false).await;

    let mut input = new_post("Hello", "World");
    input.image = Some(png("cover.png"));
    let err = PostService::from_context(&t.ctx)
        .create_post(caller_for(&u1), input)
        .await
        .expect_err("upload fails");

    assert!(matches!(err, AppError::Upload(_)));
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
    assert_eq!(t.store.post_count().await, 0);
}

#[tokio::test]
async fn test_update_post_is_author_only_even_for_admin() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let u2 = seed_user(&t.store, "u2", false).await;
    let admin = seed_user(&t.store, "admin", true).await;
    let service = PostService::from_context(&t.ctx);

    let post = service
        .create_post(caller_for(&u1), new_post("Hello", "World"))
        .await
        .unwrap();

    for intruder in [&u2, &admin] {
        let err = service
            .update_post(
                caller_for(intruder),
                post.id,
                PostChanges {
                    title: Some("Hijacked".into()),
                    content: None,
                },
            )
            .await
            .expect_err("not the author");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let stored = t.store.find_post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);

    let updated = service
        .update_post(
            caller_for(&u1),
            post.id,
            PostChanges {
                title: None,
                content: Some("Edited".into()),
            },
        )
        .await
        .expect("author update");
    assert_eq!(updated.title, "Hello");
    assert_eq!(updated.content, "Edited");
    assert!(updated.updated_at >= post.updated_at);
}

#[tokio::test]
async fn test_update_post_requires_a_field_and_existing_post() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let service = PostService::from_context(&t.ctx);

    let err = service
        .update_post(
            caller_for(&u1),
            Uuid::new_v4(),
            PostChanges {
                title: Some("  ".into()),
                content: Some("".into()),
            },
        )
        .await
        .expect_err("nothing supplied");
    assert!(matches!(err, AppError::Validation(_)));

    let err = service
        .update_post(
            caller_for(&u1),
            Uuid::new_v4(),
            PostChanges {
                title: Some("t".into()),
                content: None,
            },
        )
        .await
        .expect_err("missing");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_post_owner_admin_and_stranger() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let u2 = seed_user(&t.store, "u2", false).await;
    let admin = seed_user(&t.store, "admin", true).await;
    let service = PostService::from_context(&t.ctx);

    let first = service
        .create_post(caller_for(&u1), new_post("one", "c"))
        .await
        .unwrap();
    let second = service
        .create_post(caller_for(&u1), new_post("two", "c"))
        .await
        .unwrap();

    let err = service
        .delete_post(caller_for(&u2), first.id)
        .await
        .expect_err("stranger");
    assert!(matches!(err, AppError::Forbidden(_)));

    service
        .delete_post(caller_for(&u1), first.id)
        .await
        .expect("owner");
    service
        .delete_post(caller_for(&admin), second.id)
        .await
        .expect("admin");

    let err = service
        .delete_post(caller_for(&u1), first.id)
        .await
        .expect_err("already gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_admin_delete_removes_embedded_comments() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let u2 = seed_user(&t.store, "u2", false).await;
    let admin = seed_user(&t.store, "admin", true).await;
    let posts = PostService::from_context(&t.ctx);
    let comments = CommentService::from_context(&t.ctx);

    let post = posts
        .create_post(caller_for(&u1), new_post("Hello", "World"))
        .await
        .unwrap();
    comments
        .add_comment(caller_for(&u2), post.id, "first".into())
        .await
        .unwrap();
    let with_two = comments
        .add_comment(caller_for(&u1), post.id, "second".into())
        .await
        .unwrap();
    assert_eq!(with_two.comments.len(), 2);
    let comment_id = with_two.comments[0].id;

    posts.delete_post(caller_for(&admin), post.id).await.unwrap();

    assert!(matches!(
        posts.get_post(post.id).await,
        Err(AppError::NotFound(_))
    ));
    let err = comments
        .update_comment(caller_for(&u2), post.id, comment_id, "edit".into())
        .await
        .expect_err("parent gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_comment_edit_is_author_only() {
    let t = memory_context();
    let author = seed_user(&t.store, "author", false).await;
    let commenter = seed_user(&t.store, "commenter", false).await;
    let admin = seed_user(&t.store, "admin", true).await;
    let posts = PostService::from_context(&t.ctx);
    let comments = CommentService::from_context(&t.ctx);

    let post = posts
        .create_post(caller_for(&author), new_post("t", "c"))
        .await
        .unwrap();
    let post = comments
        .add_comment(caller_for(&commenter), post.id, "original".into())
        .await
        .unwrap();
    let comment_id = post.comments[0].id;

    for intruder in [&admin, &author] {
        let err = comments
            .update_comment(caller_for(intruder), post.id, comment_id, "x".into())
            .await
            .expect_err("not the comment author");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    let edited = comments
        .update_comment(caller_for(&commenter), post.id, comment_id, "edited".into())
        .await
        .expect("author edit");
    assert_eq!(edited.id, comment_id);
    assert_eq!(edited.content, "edited");
}

#[tokio::test]
async fn test_comment_delete_rules() {
    let t = memory_context();
    let post_author = seed_user(&t.store, "post_author", false).await;
    let commenter = seed_user(&t.store, "commenter", false).await;
    let admin = seed_user(&t.store, "admin", true).await;
    let posts = PostService::from_context(&t.ctx);
    let comments = CommentService::from_context(&t.ctx);

    let post = posts
        .create_post(caller_for(&post_author), new_post("t", "c"))
        .await
        .unwrap();
    comments
        .add_comment(caller_for(&commenter), post.id, "one".into())
        .await
        .unwrap();
    let post = comments
        .add_comment(caller_for(&commenter), post.id, "two".into())
        .await
        .unwrap();
    let (one, two) = (post.comments[0].id, post.comments[1].id);

    let err = comments
        .delete_comment(caller_for(&post_author), post.id, one)
        .await
        .expect_err("post author has no special right");
    assert!(matches!(err, AppError::Forbidden(_)));

    let after_admin = comments
        .delete_comment(caller_for(&admin), post.id, one)
        .await
        .expect("admin");
    assert_eq!(after_admin.comments.len(), 1);

    let after_author = comments
        .delete_comment(caller_for(&commenter), post.id, two)
        .await
        .expect("comment author");
    assert!(after_author.comments.is_empty());

    let err = comments
        .delete_comment(caller_for(&commenter), post.id, two)
        .await
        .expect_err("already deleted");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_deleting_middle_comment_preserves_order() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let posts = PostService::from_context(&t.ctx);
    let comments = CommentService::from_context(&t.ctx);

    let post = posts
        .create_post(caller_for(&u1), new_post("t", "c"))
        .await
        .unwrap();
    for text in ["c1", "c2", "c3"] {
        comments
            .add_comment(caller_for(&u1), post.id, text.into())
            .await
            .unwrap();
    }
    let stored = t.store.find_post_by_id(post.id).await.unwrap().unwrap();
    let c2 = stored.comments[1].id;

    comments
        .delete_comment(caller_for(&u1), post.id, c2)
        .await
        .unwrap();

    let view = posts.get_post(post.id).await.unwrap();
    let texts: Vec<_> = view.comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["c1", "c3"]);
}

#[tokio::test]
async fn test_blank_comment_content_is_rejected_before_lookup() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let comments = CommentService::from_context(&t.ctx);
    let missing_post = Uuid::new_v4();

    for content in ["", "   \n\t"] {
        let err = comments
            .add_comment(caller_for(&u1), missing_post, content.into())
            .await
            .expect_err("blank add");
        assert!(matches!(err, AppError::Validation(_)));

        let err = comments
            .update_comment(caller_for(&u1), missing_post, Uuid::new_v4(), content.into())
            .await
            .expect_err("blank update");
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn test_comment_on_missing_post_or_comment_is_not_found() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let comments = CommentService::from_context(&t.ctx);

    let err = comments
        .add_comment(caller_for(&u1), Uuid::new_v4(), "hello".into())
        .await
        .expect_err("missing post");
    assert!(matches!(err, AppError::NotFound(_)));

    let post = PostService::from_context(&t.ctx)
        .create_post(caller_for(&u1), new_post("Hello", "World"))
        .await
        .unwrap();
    comments
        .add_comment(caller_for(&u1), post.id, "kept".into())
        .await
        .unwrap();

    let err = comments
        .update_comment(caller_for(&u1), post.id, Uuid::new_v4(), "edit".into())
        .await
        .expect_err("missing comment");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = comments
        .delete_comment(caller_for(&u1), post.id, Uuid::new_v4())
        .await
        .expect_err("missing comment");
    assert!(matches!(err, AppError::NotFound(_)));

    let stored = t.store.find_post_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.comments[0].content, "kept");
}

#[tokio::test]
async fn test_create_post_for_vanished_account_is_not_found() {
    let (t, failing) = failing_upload_context();
    let ghost = Caller {
        user_id: Uuid::new_v4(),
        is_admin: false,
    };

    let mut input = new_post("Hello", "World");
    input.image = Some(png("cover.png"));
    let err = PostService::from_context(&t.ctx)
        .create_post(ghost, input)
        .await
        .expect_err("no account");

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(failing.attempts.load(Ordering::SeqCst), 0);
    assert_eq!(t.store.post_count().await, 0);
}

#[tokio::test]
async fn test_listing_resolves_authors_newest_first() {
    let t = memory_context();
    let u1 = seed_user(&t.store, "u1", false).await;
    let u2 = seed_user(&t.store, "u2", false).await;
    let posts = PostService::from_context(&t.ctx);
    let comments = CommentService::from_context(&t.ctx);

    assert!(posts.list_posts().await.unwrap().is_empty());

    let older = posts
        .create_post(caller_for(&u1), new_post("older", "c"))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    posts
        .create_post(caller_for(&u2), new_post("newer", "c"))
        .await
        .unwrap();
    comments
        .add_comment(caller_for(&u2), older.id, "nice".into())
        .await
        .unwrap();

    let listed = posts.list_posts().await.unwrap();
    let titles: Vec<_> = listed.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
    assert_eq!(listed[1].author.as_ref().unwrap().username, "u1");
    assert!(listed[1].comments[0].author.is_none());

    let detail = posts.get_post(older.id).await.unwrap();
    assert_eq!(detail.comments[0].author.as_ref().unwrap().username, "u2");

    let json = serde_json::to_value(&detail).unwrap();
    assert!(json["author"].get("password_hash").is_none());

    let own = posts.list_own_posts(caller_for(&u1)).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].id, older.id);
}

#[tokio::test]
async fn test_register_conflicts_and_login() {
    let t = memory_context();
    let users = UserService::from_context(&t.ctx);

    let profile = users
        .register(Registration {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: TEST_PASSWORD.into(),
        })
        .await
        .expect("register");
    assert!(!profile.is_admin);

    for (username, email) in [("alice", "other@example.com"), ("other", "alice@example.com")] {
        let err = users
            .register(Registration {
                username: username.into(),
                email: email.into(),
                password: TEST_PASSWORD.into(),
            })
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    let err = users
        .register(Registration {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "short".into(),
        })
        .await
        .expect_err("weak password");
    assert!(matches!(err, AppError::Validation(_)));

    assert!(matches!(
        users.login("alice", "wrong-password").await,
        Err(AppError::Unauthorized(_))
    ));
    assert!(matches!(
        users.login("nobody", TEST_PASSWORD).await,
        Err(AppError::NotFound(_))
    ));

    let outcome = users.login("alice", TEST_PASSWORD).await.expect("login");
    assert_eq!(outcome.token_type, "Bearer");
    let claims = t.ctx.jwt.validate_token(&outcome.access_token).unwrap().claims;
    assert_eq!(claims.user_id().unwrap(), profile.id);
    assert!(!claims.is_admin);
}

#[tokio::test]
async fn test_admin_flag_travels_in_token() {
    let t = memory_context();
    let admin = seed_user(&t.store, "root", true).await;

    let outcome = UserService::from_context(&t.ctx)
        .login("root", TEST_PASSWORD)
        .await
        .unwrap();
    let claims = t.ctx.jwt.validate_token(&outcome.access_token).unwrap().claims;

    assert_eq!(
        Caller {
            user_id: claims.user_id().unwrap(),
            is_admin: claims.is_admin
        },
        Caller::admin(admin.id)
    );
}

#[tokio::test]
async fn test_update_info_and_image() {
    let t = memory_context();
    let alice = seed_user(&t.store, "alice", false).await;
    seed_user(&t.store, "bob", false).await;
    let users = UserService::from_context(&t.ctx);

    let err = users
        .update_info(
            caller_for(&alice),
            ProfileChanges {
                username: Some("bob".into()),
                email: None,
            },
        )
        .await
        .expect_err("taken");
    assert!(matches!(err, AppError::Conflict(_)));

    let profile = users
        .update_info(
            caller_for(&alice),
            ProfileChanges {
                username: Some("alicia".into()),
                email: Some("alicia@example.com".into()),
            },
        )
        .await
        .expect("update");
    assert_eq!(profile.username, "alicia");
    assert_eq!(profile.email, "alicia@example.com");

    let err = users
        .update_image(caller_for(&alice), None)
        .await
        .expect_err("no image");
    assert!(matches!(err, AppError::Validation(_)));

    let profile = users
        .update_image(caller_for(&alice), Some(png("me.png")))
        .await
        .expect("image");
    assert!(profile
        .image_url
        .as_deref()
        .unwrap()
        .starts_with("memory://profile_images/"));
}
