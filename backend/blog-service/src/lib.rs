/// Blog Service Library
///
/// CRUD backend for a blogging platform: user accounts, posts with an
/// optional image, and comments embedded in their parent post.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: users, posts, embedded comments, display views
/// - `services`: post/comment ownership engine and account service
/// - `db`: document store trait with Postgres and in-memory backends
/// - `assets`: image asset store (Cloudinary, in-memory)
/// - `middleware`: bearer-token authentication, ownership checks, metrics
/// - `state`: the shared application context
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod state;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppContext;
