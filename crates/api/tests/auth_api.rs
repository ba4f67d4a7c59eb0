//! HTTP-level integration tests for signup, login, `/auth/me` and bearer
//! token handling.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_auth, post_json, TEST_PASSWORD};
use serde_json::json;
use taskflow_core::roles::Role;
use taskflow_db::UserStore;

// ---------------------------------------------------------------------------
// Signup / login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_then_login_succeeds() {
    let t = build_test_app();

    let response = post_json(
        t.app(),
        "/api/auth/signup",
        json!({ "name": "Ada", "email": "ada@example.com", "password": "s3cret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["name"], "Ada");
    assert_eq!(json["user"]["role"], "user");
    assert!(json["user"].get("password_hash").is_none());

    let response = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "ada@example.com", "password": "s3cret-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["role"], "user");
}

#[tokio::test]
async fn signup_with_taken_email_is_bad_request() {
    let t = build_test_app();
    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "s3cret-pass" });

    let first = post_json(t.app(), "/api/auth/signup", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(t.app(), "/api/auth/signup", body).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "User already exists");

    assert_eq!(t.store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn signup_always_creates_plain_user() {
    let t = build_test_app();
    let response = post_json(
        t.app(),
        "/api/auth/signup",
        json!({ "name": "Eve", "email": "eve@example.com", "password": "s3cret-pass", "role": "admin" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["user"]["role"], "user");
}

#[tokio::test]
async fn signup_validates_input() {
    let t = build_test_app();
    let response = post_json(
        t.app(),
        "/api/auth/signup",
        json!({ "name": "", "email": "not-an-email", "password": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("name is required"));
    assert!(message.contains("email must be a valid email address"));
    assert!(message.contains("password is required"));
}

#[tokio::test]
async fn short_password_is_accepted() {
    let t = build_test_app();
    let response = post_json(
        t.app(),
        "/api/auth/signup",
        json!({ "name": "Bo", "email": "bo@example.com", "password": "abc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "bo@example.com", "password": "abc" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_bad_request() {
    let t = build_test_app();
    t.user_with_token("bob@example.com", Role::User).await;

    let response = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "bob@example.com", "password": "nope-nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_with_unknown_email_matches_wrong_password() {
    let t = build_test_app();
    let response = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_CREDENTIALS");
    assert_eq!(json["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_email_match_is_case_sensitive() {
    let t = build_test_app();
    t.user_with_token("carol@example.com", Role::User).await;

    let response = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "Carol@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Bearer tokens
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_returns_caller_profile() {
    let t = build_test_app();
    let (user, token) = t.user_with_token("mgr@example.com", Role::Manager).await;

    let response = get_auth(t.app(), "/api/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["role"], "manager");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let t = build_test_app();
    let response = get(t.app(), "/api/projects").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let t = build_test_app();
    let response = get_auth(t.app(), "/api/tasks", "definitely.not.valid").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_login_is_accepted() {
    let t = build_test_app();
    t.user_with_token("dan@example.com", Role::User).await;

    let login = post_json(
        t.app(),
        "/api/auth/login",
        json!({ "email": "dan@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    let token = body_json(login).await["token"].as_str().unwrap().to_string();

    let response = get_auth(t.app(), "/api/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["email"], "dan@example.com");
    assert!(users[0].get("password_hash").is_none());
}
