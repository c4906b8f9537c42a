/// User account service - registration, login and profile management
use crypto_core::{hash_password, verify_password, JwtKeys, TokenResponse};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::assets::{AssetStore, ImageUpload, PROFILE_IMAGE_FOLDER};
use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{Caller, User, UserProfile};
use crate::state::AppContext;
use crate::validators::{non_blank, validate_email, validate_password, MIN_PASSWORD_LEN};

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Successful login: bearer token plus the account it belongs to
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginOutcome {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

impl LoginOutcome {
    fn new(token: TokenResponse, user: UserProfile) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            user,
        }
    }
}

pub struct UserService {
    store: Arc<dyn DocumentStore>,
    assets: Arc<dyn AssetStore>,
    jwt: Arc<JwtKeys>,
}

impl UserService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        assets: Arc<dyn AssetStore>,
        jwt: Arc<JwtKeys>,
    ) -> Self {
        Self { store, assets, jwt }
    }

    pub fn from_context(ctx: &AppContext) -> Self {
        Self::new(ctx.store.clone(), ctx.assets.clone(), ctx.jwt.clone())
    }

    async fn load(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> Result<()> {
        match self.store.find_user_by_email(email).await? {
            Some(other) if Some(other.id) != owner => {
                Err(AppError::Conflict("Email already in use".to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_username_free(&self, username: &str, owner: Option<Uuid>) -> Result<()> {
        match self.store.find_user_by_username(username).await? {
            Some(other) if Some(other.id) != owner => {
                Err(AppError::Conflict("Username already in use".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub async fn register(&self, input: Registration) -> Result<UserProfile> {
        let (Some(username), Some(email)) = (
            non_blank(Some(input.username.as_str())),
            non_blank(Some(input.email.as_str())),
        ) else {
            return Err(AppError::validation("All fields are required"));
        };
        if input.password.is_empty() {
            return Err(AppError::validation("All fields are required"));
        }
        if !validate_email(email) {
            return Err(AppError::validation("Invalid email format"));
        }
        if !validate_password(&input.password) {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        self.ensure_email_free(email, None).await?;
        self.ensure_username_free(username, None).await?;

        let password_hash = hash_password(&input.password)?;
        let user = User::new(username.to_string(), email.to_string(), password_hash);
        self.store.save_user(&user).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user.profile())
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Username not found"))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login failed: incorrect password");
            return Err(AppError::Unauthorized("Incorrect password".to_string()));
        }

        let token = self
            .jwt
            .generate_access_token(user.id, &user.email, &user.username, user.is_admin)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome::new(
            self.jwt.token_response(token),
            user.profile(),
        ))
    }

    /// The caller's own account
    pub async fn details(&self, caller: Caller) -> Result<UserProfile> {
        Ok(self.load(caller.user_id).await?.profile())
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserProfile> {
        Ok(self.load(user_id).await?.profile())
    }

    /// Change username and/or email; values held by another account conflict
    pub async fn update_info(&self, caller: Caller, changes: ProfileChanges) -> Result<UserProfile> {
        let username = non_blank(changes.username.as_deref()).map(str::to_string);
        let email = non_blank(changes.email.as_deref()).map(str::to_string);
        if username.is_none() && email.is_none() {
            return Err(AppError::validation(
                "At least one of username or email must be provided",
            ));
        }
        if let Some(email) = &email {
            if !validate_email(email) {
                return Err(AppError::validation("Invalid email format"));
            }
        }

        let mut user = self.load(caller.user_id).await?;

        if let Some(email) = email {
            self.ensure_email_free(&email, Some(user.id)).await?;
            user.email = email;
        }
        if let Some(username) = username {
            self.ensure_username_free(&username, Some(user.id)).await?;
            user.username = username;
        }
        user.updated_at = chrono::Utc::now();
        self.store.save_user(&user).await?;

        tracing::info!(user_id = %user.id, "user info updated");
        Ok(user.profile())
    }

    /// Upload a new profile picture and store its URL on the account
    pub async fn update_image(
        &self,
        caller: Caller,
        image: Option<ImageUpload>,
    ) -> Result<UserProfile> {
        let image = image.ok_or_else(|| AppError::validation("No image file provided"))?;
        image.validate().map_err(AppError::Validation)?;

        let mut user = self.load(caller.user_id).await?;
        let url = self.assets.upload(image, PROFILE_IMAGE_FOLDER).await?;

        user.image_url = Some(url);
        user.updated_at = chrono::Utc::now();
        self.store.save_user(&user).await?;

        tracing::info!(user_id = %user.id, "profile image updated");
        Ok(user.profile())
    }
}
