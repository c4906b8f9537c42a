/// HTTP handlers for blog-service endpoints
///
/// This module contains handlers for:
/// - Users: registration, login, profile reads and updates
/// - Posts: create (with optional image), list, read, update, delete
/// - Comments: add, edit and delete comments inside a post
/// - Health: summary, readiness and liveness probes
pub mod comments;
pub mod form;
pub mod health;
pub mod posts;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};
use crypto_core::JwtKeys;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};

/// Malformed or missing JSON bodies become `Validation` errors
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::validation(format!("Invalid JSON body: {err}")).into()
}

/// Register every `/api/v1` route
///
/// Health probes sit ahead of the scope; everything else goes through the
/// bearer-token and metrics middleware.
pub fn configure_routes(cfg: &mut web::ServiceConfig, jwt: Arc<JwtKeys>) {
    cfg.route("/api/v1/health", web::get().to(health::health_summary))
        .route("/api/v1/health/ready", web::get().to(health::readiness))
        .route("/api/v1/health/live", web::get().to(health::liveness))
        .service(
            web::scope("/api/v1")
                .app_data(web::JsonConfig::default().error_handler(json_error))
                .wrap(JwtAuthMiddleware::new(jwt))
                .wrap(MetricsMiddleware)
                .service(
                    web::scope("/users")
                        .route("/register", web::post().to(users::register))
                        .route("/login", web::post().to(users::login))
                        .route("/details", web::get().to(users::user_details))
                        .route("/updateUserInfo", web::put().to(users::update_user_info))
                        .route("/updateUserImage", web::put().to(users::update_user_image))
                        .route("/{user_id}", web::get().to(users::get_user)),
                )
                .service(
                    web::scope("/posts")
                        .service(
                            web::resource("")
                                .route(web::post().to(posts::create_post))
                                .route(web::get().to(posts::list_posts)),
                        )
                        .route("/user", web::get().to(posts::get_own_posts))
                        .service(
                            web::resource("/{post_id}")
                                .route(web::get().to(posts::get_post))
                                .route(web::put().to(posts::update_post))
                                .route(web::delete().to(posts::delete_post)),
                        )
                        .route("/{post_id}/comments", web::post().to(comments::add_comment))
                        .service(
                            web::resource("/{post_id}/comments/{comment_id}")
                                .route(web::put().to(comments::update_comment))
                                .route(web::delete().to(comments::delete_comment)),
                        ),
                ),
        );
}
