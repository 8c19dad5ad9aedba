use actix_web::{get, http::StatusCode, post, web, HttpResponse};
use validator::Validate;

use crate::{
    auth::{AuthenticatedUser, LoginRequest, RefreshTokenRequest, RegisterRequest, UserData},
    error::AppError,
    response::ApiResponse,
    services::AuthService,
};

/// Register a new user
///
/// Creates an account. The username must not be taken and
/// `password_confirmation` must equal `password`.
///
/// ## Responses:
/// - `201 Created`: `data.user` holds the new user.
/// - `422 Unprocessable Entity`: invalid body, failed validation, or duplicate username.
/// - `500 Internal Server Error`: storage or hashing failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; envelope `data` is `UserData`", body = UserData),
        (status = 422, description = "Validation failed or username taken", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[post("/register")]
pub async fn register(
    service: web::Data<AuthService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let user = service.register(body.into_inner()).await?;
    Ok(ApiResponse::created("Success to register", UserData { user }).into_response())
}

/// Login user
///
/// Authenticates with username and password and returns an access token,
/// a refresh token and the user.
///
/// ## Responses:
/// - `200 OK`: `data` holds `access_token`, `refresh_token` and `user`.
/// - `401 Unauthorized`: unknown username or wrong password.
/// - `422 Unprocessable Entity`: invalid body or failed validation.
/// - `500 Internal Server Error`: storage or token failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; envelope `data` is `LoginResponse`", body = crate::auth::LoginResponse),
        (status = 401, description = "Username or password wrong", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Validation failed", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[post("/login")]
pub async fn login(
    service: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let response = service.login(body.into_inner()).await?;
    Ok(ApiResponse::ok("Success to login", response).into_response())
}

/// Logout user
///
/// Deletes the given refresh token, which must belong to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Logged out; envelope `data` is null", body = crate::routes::docs::ApiEnvelope),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 404, description = "Refresh token not found", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Validation failed", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[post("/logout")]
pub async fn logout(
    service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    service.logout(user.0, &body.refresh_token).await?;
    Ok(ApiResponse::message_only(StatusCode::CREATED, "Success to logout").into_response())
}

/// Refresh access token
///
/// Exchanges a refresh token for a new access token. The presented refresh
/// token is consumed and a new one is returned.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh-token",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 201, description = "Tokens issued; envelope `data` is `TokenPair`", body = crate::auth::TokenPair),
        (status = 401, description = "Unknown or expired refresh token", body = crate::routes::docs::ApiEnvelope),
        (status = 422, description = "Validation failed", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[post("/refresh-token")]
pub async fn refresh_token(
    service: web::Data<AuthService>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let tokens = service.refresh(&body.refresh_token).await?;
    let response = ApiResponse::new(StatusCode::CREATED, "Success to refresh token", Some(tokens));
    Ok(response.into_response())
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Envelope `data` is `UserData`", body = UserData),
        (status = 401, description = "Missing or invalid access token", body = crate::routes::docs::ApiEnvelope),
        (status = 404, description = "User no longer exists", body = crate::routes::docs::ApiEnvelope),
        (status = 500, description = "Unexpected failure", body = crate::routes::docs::ApiEnvelope)
    )
)]
#[get("/me")]
pub async fn me(service: web::Data<AuthService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let user = service.me(user.0).await?;
    Ok(ApiResponse::ok("Success to get user", UserData { user }).into_response())
}
