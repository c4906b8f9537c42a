use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::assets::{AssetStore, CloudinaryAssetStore, InMemoryAssetStore};
use blog_service::config::{AssetBackend, Config, StoreBackend};
use blog_service::db::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};
use blog_service::handlers;
use blog_service::openapi::ApiDoc;
use blog_service::AppContext;
use crypto_core::JwtKeys;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable ({}); waiting for Ctrl+C", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// `blog-service healthcheck`: probe the local HTTP health endpoint
async fn run_healthcheck() -> io::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8080".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

async fn build_store(config: &Config) -> io::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.store.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.store.database_url)
                .await
                .map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::Other,
                        format!("Failed to create database pool: {e}"),
                    )
                })?;

            sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {e}"))
            })?;

            tracing::info!(
                max_connections = config.store.max_connections,
                "Connected to PostgreSQL, migrations applied"
            );
            Ok(Arc::new(PgDocumentStore::new(pool)))
        }
    }
}

fn build_assets(config: &Config) -> io::Result<Arc<dyn AssetStore>> {
    match (config.assets.backend, config.assets.cloudinary.clone()) {
        (AssetBackend::Cloudinary, Some(cloudinary)) => {
            Ok(Arc::new(CloudinaryAssetStore::new(cloudinary)))
        }
        (AssetBackend::Cloudinary, None) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Cloudinary backend selected without credentials",
        )),
        (AssetBackend::Memory, _) => {
            tracing::warn!("Using in-memory asset store; uploaded images are not persisted");
            Ok(Arc::new(InMemoryAssetStore::new()))
        }
    }
}

/// Blog Service
///
/// HTTP backend for a blogging platform.
///
/// # Routes
///
/// - `/api/v1/users/*` - Registration, login, profile
/// - `/api/v1/posts/*` - Posts and their embedded comments
/// - `/api/v1/health*` - Health probes
/// - `/metrics` - Prometheus metrics
#[actix_web::main]
async fn main() -> io::Result<()> {
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck().await;
    }

    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let jwt = JwtKeys::from_pem(&config.jwt.private_key_pem, &config.jwt.public_key_pem)
        .map(Arc::new)
        .map_err(|err| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to initialize JWT keys: {err}"),
            )
        })?;

    let store = build_store(&config).await?;
    let assets = build_assets(&config)?;
    tracing::info!(store = store.name(), assets = assets.name(), "Backends ready");

    let ctx = web::Data::new(
        AppContext::new(store, assets, jwt).with_max_upload_bytes(config.app.max_upload_bytes),
    );

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let openapi_doc = ApiDoc::openapi();
        let jwt = ctx.jwt.clone();

        App::new()
            .app_data(web::Data::new(openapi_doc.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url(ApiDoc::openapi_json_path(), openapi_doc.clone()),
            )
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .app_data(ctx.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(blog_service::metrics::serve_metrics),
            )
            .configure(|cfg| handlers::configure_routes(cfg, jwt))
    })
    .disable_signals()
    .bind(&http_bind_address)?
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            tracing::error!("HTTP server stopped unexpectedly");
            return match result {
                Ok(result) => result,
                Err(e) => Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
            };
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    if let Err(e) = server_task.await {
        tracing::error!("HTTP server task join error: {}", e);
    }

    tracing::info!("blog-service shutting down");
    Ok(())
}
