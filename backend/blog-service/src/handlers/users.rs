/// User handlers - registration, login and profile endpoints
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::form::read_upload_form;
use crate::error::Result;
use crate::models::Caller;
use crate::services::{ProfileChanges, Registration, UserService};
use crate::state::AppContext;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserInfoRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub async fn register(
    ctx: web::Data<AppContext>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let profile = UserService::from_context(&ctx)
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(profile))
}

pub async fn login(ctx: web::Data<AppContext>, req: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let outcome = UserService::from_context(&ctx)
        .login(&req.username, &req.password)
        .await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// The authenticated caller's own account
pub async fn user_details(ctx: web::Data<AppContext>, caller: Caller) -> Result<HttpResponse> {
    let profile = UserService::from_context(&ctx).details(caller).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn get_user(ctx: web::Data<AppContext>, user_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let profile = UserService::from_context(&ctx).get_user(*user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_user_info(
    ctx: web::Data<AppContext>,
    caller: Caller,
    req: web::Json<UpdateUserInfoRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let profile = UserService::from_context(&ctx)
        .update_info(
            caller,
            ProfileChanges {
                username: req.username,
                email: req.email,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Replace the profile picture (multipart `image`)
pub async fn update_user_image(
    ctx: web::Data<AppContext>,
    caller: Caller,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_upload_form(payload, ctx.max_upload_bytes).await?;
    let profile = UserService::from_context(&ctx)
        .update_image(caller, form.image)
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}
