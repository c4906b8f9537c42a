/// Post handlers - HTTP endpoints for post operations
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::form::read_upload_form;
use crate::error::Result;
use crate::models::Caller;
use crate::services::{NewPost, PostChanges, PostService};
use crate::state::AppContext;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Create a new post (multipart: `title`, `content`, optional `image`)
pub async fn create_post(
    ctx: web::Data<AppContext>,
    caller: Caller,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_upload_form(payload, ctx.max_upload_bytes).await?;
    let input = NewPost {
        title: form.text("title").unwrap_or_default(),
        content: form.text("content").unwrap_or_default(),
        image: form.image,
    };

    let post = PostService::from_context(&ctx)
        .create_post(caller, input)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// List every post, newest first
pub async fn list_posts(ctx: web::Data<AppContext>) -> Result<HttpResponse> {
    let posts = PostService::from_context(&ctx).list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(ctx: web::Data<AppContext>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let post = PostService::from_context(&ctx).get_post(*post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Posts written by the authenticated caller
pub async fn get_own_posts(ctx: web::Data<AppContext>, caller: Caller) -> Result<HttpResponse> {
    let posts = PostService::from_context(&ctx).list_own_posts(caller).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn update_post(
    ctx: web::Data<AppContext>,
    caller: Caller,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let changes = PostChanges {
        title: req.title,
        content: req.content,
    };

    let post = PostService::from_context(&ctx)
        .update_post(caller, *post_id, changes)
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    ctx: web::Data<AppContext>,
    caller: Caller,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    PostService::from_context(&ctx)
        .delete_post(caller, *post_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Blog post deleted successfully",
        "id": *post_id,
    })))
}
