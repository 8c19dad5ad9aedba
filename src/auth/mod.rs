pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserResponse;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

lazy_static! {
    // Letters, digits, underscores, dots and hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Payload for a login request.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

/// Payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// 1 to 255 characters: letters, digits, underscores, dots or hyphens.
    #[validate(
        length(min = 1, max = 255),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, underscores, dots or hyphens"
        )
    )]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
    /// Must equal `password`.
    #[validate(
        length(min = 1, max = 100),
        must_match(other = "password", message = "Password confirmation does not match")
    )]
    pub password_confirmation: String,
}

/// Payload carrying a refresh token, used by logout and refresh.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserData {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register(username: &str, password: &str, confirmation: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            username: "alice".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_username = LoginRequest {
            username: String::new(),
            password: "password123".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let long_password = LoginRequest {
            username: "alice".to_string(),
            password: "p".repeat(101),
        };
        assert!(long_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("test_user-1.2", "secret", "secret").validate().is_ok());
        assert!(register("test user!", "secret", "secret").validate().is_err());
        assert!(register("", "secret", "secret").validate().is_err());
    }

    #[test]
    fn test_register_password_confirmation_must_match() {
        let errors = register("alice", "secret", "Secret").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn test_refresh_token_request_requires_token() {
        let empty = RefreshTokenRequest {
            refresh_token: String::new(),
        };
        assert!(empty.validate().is_err());
    }
}
