use actix_web::web;
use sqlx::PgPool;
use std::fmt::Display;
use uuid::Uuid;

use crate::auth::{
    hash_password, verify_password, LoginRequest, LoginResponse, RegisterRequest, TokenPair,
    TokenService,
};
use crate::error::AppError;
use crate::models::UserResponse;
use crate::repositories::{self, refresh_tokens, users};

const WRONG_CREDENTIALS: &str = "Username or password wrong";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Registration, login, logout, token refresh and profile lookup.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    tokens: TokenService,
    debug: bool,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: TokenService, debug: bool) -> Self {
        Self { pool, tokens, debug }
    }

    fn internal(&self, operation: &str, message: &str, err: impl Display) -> AppError {
        log::error!(operation = operation, error:% = err; "{}", message);
        AppError::internal(message, err, self.debug)
    }

    /// Creates an account. Usernames are unique; a taken one is a 422.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AppError> {
        let existing = users::find_by_username(&self.pool, &req.username)
            .await
            .map_err(|e| self.internal("Register", "Failed to create user", e))?;
        if existing.is_some() {
            log::debug!(username = req.username.as_str(); "Username already exists during registration");
            return Err(AppError::Unprocessable("Username already exists".into()));
        }

        let password = req.password;
        let hashed = web::block(move || hash_password(&password))
            .await
            .map_err(|e| self.internal("Register", "Failed to hash password", e))?
            .map_err(|e| self.internal("Register", "Failed to hash password", e))?;

        let user = match users::create(&self.pool, &req.username, &hashed).await {
            Ok(user) => user,
            // Lost a race with a concurrent registration of the same name.
            Err(e) if repositories::is_unique_violation(&e) => {
                return Err(AppError::Unprocessable("Username already exists".into()));
            }
            Err(e) => return Err(self.internal("Register", "Failed to create user", e)),
        };

        log::info!(user_id:% = user.id, username = user.username.as_str(); "User registered");
        Ok(user.into())
    }

    /// Checks credentials and issues an access token plus a stored refresh token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = users::find_by_username(&self.pool, &req.username)
            .await
            .map_err(|e| self.internal("Login", "Failed to login", e))?;
        let user = match user {
            Some(user) => user,
            None => {
                log::debug!(username = req.username.as_str(); "User not found during login");
                return Err(AppError::Unauthorized(WRONG_CREDENTIALS.into()));
            }
        };

        let password = req.password;
        let stored_hash = user.password.clone();
        let matches = web::block(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| self.internal("Login", "Failed to verify password", e))?
            .map_err(|e| self.internal("Login", "Failed to verify password", e))?;
        if !matches {
            log::debug!(username = req.username.as_str(); "Invalid password attempt");
            return Err(AppError::Unauthorized(WRONG_CREDENTIALS.into()));
        }

        let access_token = self
            .tokens
            .generate_access_token(user.id)
            .map_err(|e| self.internal("Login", "Failed to create access token", e))?;
        let refresh_token = self.tokens.generate_refresh_token();
        refresh_tokens::create(&self.pool, &refresh_token, user.id, self.tokens.refresh_expires_at())
            .await
            .map_err(|e| self.internal("Login", "Failed to save refresh token", e))?;

        log::info!(user_id:% = user.id; "User logged in");
        Ok(LoginResponse {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    /// Deletes the caller's refresh token. Unknown tokens, or tokens that
    /// belong to someone else, are a 404.
    pub async fn logout(&self, user_id: Uuid, refresh_token: &str) -> Result<(), AppError> {
        let deleted = refresh_tokens::delete_for_user(&self.pool, refresh_token, user_id)
            .await
            .map_err(|e| self.internal("Logout", "Failed to logout", e))?;
        if deleted == 0 {
            log::debug!(user_id:% = user_id; "Refresh token not found during logout");
            return Err(AppError::NotFound("Refresh token not exist".into()));
        }

        log::info!(user_id:% = user_id; "User logged out");
        Ok(())
    }

    /// Exchanges a refresh token for a new access token and a new refresh
    /// token. The presented token is consumed.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let stored = refresh_tokens::find_by_token(&self.pool, refresh_token)
            .await
            .map_err(|e| self.internal("Refresh token", "Failed to refresh token", e))?
            .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH_TOKEN.into()))?;

        if stored.is_expired() {
            log::debug!(user_id:% = stored.user_id; "Expired refresh token presented");
            refresh_tokens::delete_by_id(&self.pool, stored.id)
                .await
                .map_err(|e| self.internal("Refresh token", "Failed to refresh token", e))?;
            return Err(AppError::Unauthorized("Refresh token expired".into()));
        }

        let access_token = self
            .tokens
            .generate_access_token(stored.user_id)
            .map_err(|e| self.internal("Refresh token", "Failed to create access token", e))?;
        let new_refresh_token = self.tokens.generate_refresh_token();
        let rotated = refresh_tokens::rotate(
            &self.pool,
            stored.id,
            stored.user_id,
            &new_refresh_token,
            self.tokens.refresh_expires_at(),
        )
        .await
        .map_err(|e| self.internal("Refresh token", "Failed to save refresh token", e))?;
        if rotated.is_none() {
            return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.into()));
        }

        log::info!(user_id:% = stored.user_id; "Access token refreshed");
        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        users::find_by_id(&self.pool, user_id)
            .await
            .map_err(|e| self.internal("Me", "Failed to get user", e))?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}
