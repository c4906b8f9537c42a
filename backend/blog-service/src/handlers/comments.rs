/// Comment handlers - comments are addressed through their parent post
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Caller;
use crate::services::CommentService;
use crate::state::AppContext;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

pub async fn add_comment(
    ctx: web::Data<AppContext>,
    caller: Caller,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let post = CommentService::from_context(&ctx)
        .add_comment(caller, *post_id, req.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

pub async fn update_comment(
    ctx: web::Data<AppContext>,
    caller: Caller,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = CommentService::from_context(&ctx)
        .update_comment(caller, post_id, comment_id, req.into_inner().content)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

pub async fn delete_comment(
    ctx: web::Data<AppContext>,
    caller: Caller,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post = CommentService::from_context(&ctx)
        .delete_comment(caller, post_id, comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Comment deleted successfully",
        "post": post,
    })))
}
