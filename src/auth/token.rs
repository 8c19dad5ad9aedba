use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{ConfigError, JwtConfig};
use crate::error::AppError;

/// Number of random bytes behind each refresh token.
const REFRESH_TOKEN_BYTES: usize = 64;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// The user's id, as a UUID string.
    pub sub: String,
    /// Issuer; the application name.
    pub iss: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies HS256 access tokens and mints opaque refresh tokens.
///
/// Cloning is cheap; the keys are shared.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    keys: Arc<Keys>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(issuer: impl Into<String>, secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            issuer: issuer.into(),
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(issuer: &str, config: &JwtConfig) -> Result<Self, ConfigError> {
        let hours = |key: &'static str, value: i64| {
            Duration::try_hours(value).ok_or_else(|| ConfigError::Invalid {
                key,
                value: value.to_string(),
            })
        };
        Ok(Self::new(
            issuer,
            config.secret.as_bytes(),
            hours("JWT_EXP_IN_HOUR", config.access_ttl_hours)?,
            hours("JWT_REFRESH_EXP_IN_HOUR", config.refresh_ttl_hours)?,
        ))
    }

    /// Signs an access token whose subject is `user_id`.
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_after(now, self.access_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding)
    }

    /// Verifies signature, expiry and issuer and returns the decoded claims.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {:?}", e.kind())))
    }

    /// A fresh opaque refresh token: 64 random bytes, URL-safe base64.
    pub fn generate_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE.encode(bytes)
    }

    pub fn refresh_expires_at(&self) -> DateTime<Utc> {
        expires_after(Utc::now(), self.refresh_ttl)
    }
}

/// `now + ttl`, saturating at the latest representable instant.
fn expires_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
