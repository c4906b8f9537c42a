/// OpenAPI documentation for Blog Service
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers::comments::CommentRequest;
use crate::handlers::posts::UpdatePostRequest;
use crate::handlers::users::{LoginRequest, RegisterRequest, UpdateUserInfoRequest};
use crate::models::{AuthorSummary, BlogPost, Comment, CommentView, PostView, UserProfile};
use crate::services::LoginOutcome;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blog Service API",
        version = "1.0.0",
        description = "Blogging backend: user accounts, posts with optional images, and comments embedded in their post. Posts may be edited only by their author and deleted by their author or an admin; comments may be edited only by their author and deleted by their author or an admin.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "users", description = "Registration, login and profile management"),
        (name = "posts", description = "Post creation, retrieval, updates, and deletion"),
        (name = "comments", description = "Comment management on posts"),
    ),
    components(schemas(
        BlogPost,
        Comment,
        PostView,
        CommentView,
        UserProfile,
        AuthorSummary,
        LoginOutcome,
        RegisterRequest,
        LoginRequest,
        UpdateUserInfoRequest,
        UpdatePostRequest,
        CommentRequest,
    )),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token returned by /api/v1/users/login"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
