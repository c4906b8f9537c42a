/// Configuration management for Blog Service
///
/// Everything is read from environment variables (a `.env` file is loaded
/// by `main` in development). Backends default to Postgres and Cloudinary;
/// the in-memory variants exist for local runs and are refused in production.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::assets::CloudinaryConfig;
use crate::state::DEFAULT_MAX_UPLOAD_BYTES;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Document store configuration
    pub store: StoreConfig,
    /// Token signing keys
    pub jwt: JwtConfig,
    /// Asset store configuration
    pub assets: AssetConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Largest accepted multipart body (image plus text fields)
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetBackend {
    Cloudinary,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("Unknown STORE_BACKEND '{other}'")),
        }
    }
}

impl FromStr for AssetBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloudinary" => Ok(AssetBackend::Cloudinary),
            "memory" => Ok(AssetBackend::Memory),
            other => Err(format!("Unknown ASSET_BACKEND '{other}'")),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database URL (Postgres backend)
    pub database_url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// RS256 key material, already read from env or file
#[derive(Clone)]
pub struct JwtConfig {
    pub private_key_pem: String,
    pub public_key_pem: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("private_key_pem", &"<redacted>")
            .field("public_key_pem", &format!("{} bytes", self.public_key_pem.len()))
            .finish()
    }
}

/// Asset store configuration
#[derive(Debug, Clone)]
pub struct AssetConfig {
    pub backend: AssetBackend,
    /// Present when `backend` is Cloudinary
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppConfig {
            env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: lookup("BLOG_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or_default(&lookup, "BLOG_SERVICE_PORT", 8080)?,
            max_upload_bytes: parse_or_default(
                &lookup,
                "MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        };
        let production = app.is_production();

        let cors = {
            let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
                Some(value) => value,
                None if production => {
                    return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                }
                None => "http://localhost:3000".to_string(),
            };

            if production && allowed_origins.trim() == "*" {
                return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
            }

            CorsConfig { allowed_origins }
        };

        let store = StoreConfig {
            backend: lookup("STORE_BACKEND")
                .map(|v| v.parse::<StoreBackend>())
                .transpose()?
                .unwrap_or(StoreBackend::Postgres),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgresql://localhost/blog".to_string()),
            max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let jwt = JwtConfig {
            private_key_pem: read_pem(&lookup, "JWT_PRIVATE_KEY_PEM", "JWT_PRIVATE_KEY_FILE")?,
            public_key_pem: read_pem(&lookup, "JWT_PUBLIC_KEY_PEM", "JWT_PUBLIC_KEY_FILE")?,
        };

        let asset_backend = lookup("ASSET_BACKEND")
            .map(|v| v.parse::<AssetBackend>())
            .transpose()?
            .unwrap_or(AssetBackend::Cloudinary);
        let cloudinary = match asset_backend {
            AssetBackend::Cloudinary => Some(CloudinaryConfig {
                cloud_name: required(&lookup, "CLOUDINARY_CLOUD_NAME")?,
                api_key: required(&lookup, "CLOUDINARY_API_KEY")?,
                api_secret: required(&lookup, "CLOUDINARY_API_SECRET")?,
                upload_url: lookup("CLOUDINARY_UPLOAD_URL"),
            }),
            AssetBackend::Memory => None,
        };

        if production && store.backend == StoreBackend::Memory {
            return Err("STORE_BACKEND=memory is not allowed in production".to_string());
        }
        if production && asset_backend == AssetBackend::Memory {
            return Err("ASSET_BACKEND=memory is not allowed in production".to_string());
        }

        Ok(Config {
            app,
            cors,
            store,
            jwt,
            assets: AssetConfig {
                backend: asset_backend,
                cloudinary,
            },
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("{key} must be set"))
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}

/// PEM given inline, or read from the file the second key points at
fn read_pem<F>(lookup: &F, inline_key: &str, file_key: &str) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pem) = lookup(inline_key).filter(|v| !v.trim().is_empty()) {
        // allow single-line values with escaped newlines
        return Ok(pem.replace("\\n", "\n"));
    }

    let path = lookup(file_key).ok_or_else(|| format!("{inline_key} or {file_key} must be set"))?;
    std::fs::read_to_string(&path).map_err(|e| format!("Failed to read {file_key}='{path}': {e}"))
}
