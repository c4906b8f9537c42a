/// JWT issuance and validation for the blog backend
///
/// Tokens are signed with RS256 only. Symmetric algorithms are never accepted,
/// which rules out algorithm confusion between the signing and validation side.
///
/// ## Usage
///
/// Build the keys once during startup and share them behind an `Arc`:
///
/// ```rust,no_run
/// use crypto_core::jwt::JwtKeys;
///
/// # fn main() -> anyhow::Result<()> {
/// let private_key = std::env::var("JWT_PRIVATE_KEY_PEM")?;
/// let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")?;
/// let keys = JwtKeys::from_pem(&private_key, &public_key)?;
///
/// let token = keys.generate_access_token(uuid::Uuid::new_v4(), "a@b.io", "alice", false)?;
/// let claims = keys.validate_token(&token)?.claims;
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;

const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

const ACCESS_TOKEN_TYPE: &str = "access";

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by every access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access" for tokens issued here
    pub token_type: String,
    /// Whether the subject holds the global admin role
    #[serde(default)]
    pub is_admin: bool,
    pub email: String,
    pub username: String,
}

impl Claims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

/// Login response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================================================
// Key material
// ============================================================================

/// RSA key pair used to sign and verify tokens
///
/// A validation-only instance (no private key) can verify tokens but refuses
/// to issue them.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Option<EncodingKey>,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Build a signing + validating key pair from PEM strings
    ///
    /// ## Errors
    ///
    /// Returns error if either PEM block is malformed or not an RSA key.
    pub fn from_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA private key: {e}"))?;

        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

        Ok(Self {
            encoding: Some(encoding),
            decoding,
        })
    }

    /// Build a validation-only key from a public PEM
    pub fn validation_only(public_key_pem: &str) -> Result<Self> {
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| anyhow!("Failed to parse RSA public key: {e}"))?;

        Ok(Self {
            encoding: None,
            decoding,
        })
    }

    /// True when this instance holds a private key
    pub fn can_sign(&self) -> bool {
        self.encoding.is_some()
    }

    /// Seconds an access token stays valid
    pub fn access_token_ttl_secs() -> i64 {
        ACCESS_TOKEN_EXPIRY_HOURS * 3600
    }

    // ========================================================================
    // Token Generation
    // ========================================================================

    /// Generate a new access token for a user
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        username: &str,
        is_admin: bool,
    ) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            is_admin,
            email: email.to_string(),
            username: username.to_string(),
        };

        self.sign(&claims)
    }

    /// Wrap an access token in the login response shape
    pub fn token_response(&self, access_token: String) -> TokenResponse {
        TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: Self::access_token_ttl_secs(),
        }
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let encoding_key = self
            .encoding
            .as_ref()
            .ok_or_else(|| anyhow!("JWT private key not configured; cannot issue tokens"))?;

        encode(&Header::new(JWT_ALGORITHM), claims, encoding_key)
            .map_err(|e| anyhow!("Failed to generate access token: {e}"))
    }

    // ========================================================================
    // Token Validation
    // ========================================================================

    /// Validate and decode a token
    ///
    /// ## Errors
    ///
    /// Returns error if the signature is invalid, the token is expired or
    /// malformed, or the token is not an access token.
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(anyhow!(
                "Unexpected token type: {}",
                data.claims.token_type
            ));
        }

        Ok(data)
    }
}

// ============================================================================
// Tests
// ============================================================================
