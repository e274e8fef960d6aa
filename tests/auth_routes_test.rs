// ABOUTME: Integration tests for registration, login and bearer token handling
// ABOUTME: Exercises /auth/register and /auth/login through the full router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::StatusCode;
use calorie_api::auth::AuthManager;
use calorie_api::users::User;
use common::{post_json, read_json, TestApp, TEST_JWT_SECRET};
use serde_json::{json, Value};

fn registration() -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": "Ada@Example.com",
        "password": "analytical-engine",
    })
}

#[tokio::test]
async fn test_register_returns_token_and_profile() {
    let app = TestApp::new();

    let (status, body) = read_json(app.send(post_json("/auth/register", &registration())).await).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["first_name"], "Ada");
    assert!(body["user"].get("password_hash").is_none());

    let stored = app.resources.users.find_by_email("ada@example.com").unwrap();
    assert_ne!(stored.password_hash, "analytical-engine");
    assert_eq!(body["user"]["id"], stored.id.to_string());
}

#[tokio::test]
async fn test_register_token_unlocks_calorie_lookup() {
    let app = TestApp::new();
    let (_, body) = read_json(app.send(post_json("/auth/register", &registration())).await).await;
    let token = body["token"].as_str().unwrap();

    let response = app
        .get_calories(token, &json!({"dish_name": "apple", "servings": 1}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.send(post_json("/auth/register", &registration())).await;

    let mut again = registration();
    again["email"] = json!("ada@example.COM");
    let (status, body) = read_json(app.send(post_json("/auth/register", &again)).await).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User already exists");
    assert_eq!(app.resources.users.len(), 1);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, body) = read_json(
        app.send(post_json(
            "/auth/register",
            &json!({"first_name": "Ada", "last_name": "", "email": "ada", "password": "short"}),
        ))
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["last_name", "email", "password"]);
    assert!(app.resources.users.is_empty());
}

#[tokio::test]
async fn test_login_round_trip() {
    let app = TestApp::new();
    app.send(post_json("/auth/register", &registration())).await;

    let (status, body) = read_json(
        app.send(post_json(
            "/auth/login",
            &json!({"email": "ADA@example.com", "password": "analytical-engine"}),
        ))
        .await,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let claims = app
        .resources
        .auth_manager
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.email, "ada@example.com");
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = TestApp::new();
    app.send(post_json("/auth/register", &registration())).await;

    for credentials in [
        json!({"email": "ada@example.com", "password": "wrong-password"}),
        json!({"email": "nobody@example.com", "password": "analytical-engine"}),
    ] {
        let (status, body) = read_json(app.send(post_json("/auth/login", &credentials)).await).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let app = TestApp::new();
    let user = User::new("Eve", "Mallory", "eve@example.com", "x".to_owned());
    let forged = AuthManager::new(b"some-other-secret", 24)
        .generate_token(&user)
        .unwrap();

    let (status, body) = read_json(
        app.get_calories(&forged, &json!({"dish_name": "apple", "servings": 1}))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();
    let user = User::new("Old", "Timer", "old@example.com", "x".to_owned());
    let expired = AuthManager::new(TEST_JWT_SECRET.as_bytes(), -1)
        .generate_token(&user)
        .unwrap();

    let (status, body) = read_json(
        app.get_calories(&expired, &json!({"dish_name": "apple", "servings": 1}))
            .await,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}
