mod common;

use actix_web::{http::StatusCode, test};
use common::{bearer, call_json, cleanup_user, database_state, register_and_login, test_app, unique_username};
use pretty_assertions::assert_eq;
use serde_json::json;

#[actix_rt::test]
async fn test_register_login_and_me() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_flow");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": username,
            "password": "Password123",
            "password_confirmation": "Password123"
        }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Registration failed. Body: {}", body);
    assert_eq!(body["message"], "Success to register");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["user"]["username"], username.as_str());
    assert!(body["data"]["user"].get("password").is_none(), "password hash must not leak");

    // Registering the same name again
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "username": username,
            "password": "Other456",
            "password_confirmation": "Other456"
        }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Username already exists");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "username": username, "password": "Password123" }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK, "Login failed. Body: {}", body);
    assert_eq!(body["message"], "Success to login");
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["refresh_token"].as_str().unwrap().len(), 88);

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .append_header(bearer(&access_token))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Success to get user");
    assert_eq!(body["data"]["user"]["username"], username.as_str());

    cleanup_user(&pool, &username).await;
}

#[actix_rt::test]
async fn test_login_failures_share_one_message() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_fail");
    register_and_login(&app, &username, "Password123").await;

    let test_cases = vec![
        (json!({ "username": username, "password": "WrongPassword" }), "incorrect password"),
        (json!({ "username": unique_username("nobody"), "password": "Password123" }), "unknown user"),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(&payload)
            .to_request();
        let (status, body) = call_json(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "Test case failed: {}", description);
        assert_eq!(body["message"], "Username or password wrong", "{}", description);
    }

    cleanup_user(&pool, &username).await;
}

#[actix_rt::test]
async fn test_refresh_rotates_token() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_refresh");
    let user = register_and_login(&app, &username, "Password123").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Refresh failed. Body: {}", body);
    assert_eq!(body["message"], "Success to refresh token");
    let new_access = body["data"]["access_token"].as_str().unwrap().to_string();
    let new_refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, user.refresh_token);

    // The consumed token is gone.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid refresh token");

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .append_header(bearer(&new_access))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refresh_token": new_refresh }))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    cleanup_user(&pool, &username).await;
}

#[actix_rt::test]
async fn test_expired_refresh_token_is_rejected_and_removed() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_expired");
    let user = register_and_login(&app, &username, "Password123").await;

    sqlx::query("UPDATE refresh_tokens SET expires_at = NOW() - INTERVAL '1 minute' WHERE token = $1")
        .bind(&user.refresh_token)
        .execute(&pool)
        .await
        .expect("Failed to expire token");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Refresh token expired");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE token = $1")
        .bind(&user.refresh_token)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    cleanup_user(&pool, &username).await;
}

#[actix_rt::test]
async fn test_logout_invalidates_refresh_token() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_logout");
    let other_name = unique_username("auth_other");
    let user = register_and_login(&app, &username, "Password123").await;
    let other = register_and_login(&app, &other_name, "Password123").await;

    // A token that belongs to someone else cannot be logged out.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .append_header(bearer(&other.access_token))
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .append_header(bearer(&user.access_token))
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Success to logout");
    assert!(body["data"].is_null());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .append_header(bearer(&user.access_token))
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Refresh token not exist");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh-token")
        .set_json(json!({ "refresh_token": user.refresh_token }))
        .to_request();
    let (status, _) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    cleanup_user(&pool, &username).await;
    cleanup_user(&pool, &other_name).await;
}

#[actix_rt::test]
async fn test_me_for_deleted_user() {
    let Some((pool, state)) = database_state().await else {
        return;
    };
    let app = test_app!(state);
    let username = unique_username("auth_gone");
    let user = register_and_login(&app, &username, "Password123").await;

    cleanup_user(&pool, &username).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .append_header(bearer(&user.access_token))
        .to_request();
    let (status, body) = call_json(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}
