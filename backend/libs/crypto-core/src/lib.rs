/// Shared credential primitives for the blog backend
///
/// - `jwt`: RS256 access token issuance and validation
/// - `password`: Argon2id password hashing and verification
///
/// Nothing in this crate holds process-global state. Services build a
/// [`jwt::JwtKeys`] once at startup and pass it to whoever needs it.
pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtKeys, TokenResponse};
pub use password::{hash_password, verify_password, PasswordError};
