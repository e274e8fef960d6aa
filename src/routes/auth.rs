// ABOUTME: Registration and login route handlers issuing JWT session tokens
// ABOUTME: Validates credentials, hashes passwords with bcrypt and stores users in memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::{hash_password, verify_password};
use crate::constants::limits::{NAME_MAX_CHARS, PASSWORD_MIN_CHARS};
use crate::constants::messages::{
    BODY_NOT_OBJECT, EMAIL_INVALID, FIRST_NAME_INVALID, INVALID_CREDENTIALS, LAST_NAME_INVALID,
    PASSWORD_REQUIRED, PASSWORD_TOO_SHORT, USER_ALREADY_EXISTS,
};
use crate::errors::{AppError, AppResult, FieldError};
use crate::middleware::auth_rate_limit;
use crate::resources::ServerResources;
use crate::routes::parse_json_body;
use crate::users::{User, UserProfile};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Token and profile returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed session token
    pub token: String,
    /// Public view of the user
    pub user: UserProfile,
}

/// Validated registration payload
#[derive(Debug)]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
}

/// Validated login payload
#[derive(Debug)]
struct LoginRequest {
    email: String,
    password: String,
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn is_valid_email(email: &str) -> bool {
    email_regex().map_or_else(
        || email.contains('@') && !email.contains(char::is_whitespace),
        |re| re.is_match(email),
    )
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object.get(field).and_then(Value::as_str).map(str::trim)
}

fn name_field(
    object: &Map<String, Value>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match string_field(object, field) {
        Some(name) if !name.is_empty() && name.chars().count() <= NAME_MAX_CHARS => {
            name.to_owned()
        }
        _ => {
            errors.push(FieldError::new(field, message));
            String::new()
        }
    }
}

fn as_object(body: &Value) -> AppResult<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| AppError::validation(vec![FieldError::new("body", BODY_NOT_OBJECT)]))
}

impl RegisterRequest {
    fn from_json(body: &Value) -> AppResult<Self> {
        let object = as_object(body)?;
        let mut errors = Vec::new();

        let first_name = name_field(object, "first_name", FIRST_NAME_INVALID, &mut errors);
        let last_name = name_field(object, "last_name", LAST_NAME_INVALID, &mut errors);

        let email = match string_field(object, "email") {
            Some(email) if is_valid_email(email) => email.to_lowercase(),
            _ => {
                errors.push(FieldError::new("email", EMAIL_INVALID));
                String::new()
            }
        };

        // Passwords are taken verbatim, surrounding whitespace included
        let password = match object.get("password").and_then(Value::as_str) {
            Some(password) if password.chars().count() >= PASSWORD_MIN_CHARS => {
                password.to_owned()
            }
            _ => {
                errors.push(FieldError::new("password", PASSWORD_TOO_SHORT));
                String::new()
            }
        };

        if errors.is_empty() {
            Ok(Self {
                first_name,
                last_name,
                email,
                password,
            })
        } else {
            Err(AppError::validation(errors))
        }
    }
}

impl LoginRequest {
    fn from_json(body: &Value) -> AppResult<Self> {
        let object = as_object(body)?;
        let mut errors = Vec::new();

        let email = match string_field(object, "email") {
            Some(email) if is_valid_email(email) => email.to_lowercase(),
            _ => {
                errors.push(FieldError::new("email", EMAIL_INVALID));
                String::new()
            }
        };
        let password = match object.get("password").and_then(Value::as_str) {
            Some(password) if !password.is_empty() => password.to_owned(),
            _ => {
                errors.push(FieldError::new("password", PASSWORD_REQUIRED));
                String::new()
            }
        };

        if errors.is_empty() {
            Ok(Self { email, password })
        } else {
            Err(AppError::validation(errors))
        }
    }
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create `/auth/register` and `/auth/login`, both behind the auth limiter
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/auth/register", post(Self::handle_register))
            .route("/auth/login", post(Self::handle_login))
            .layer(middleware::from_fn_with_state(
                resources.clone(),
                auth_rate_limit,
            ))
            .with_state(resources)
    }

    /// Handle POST /auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let request = RegisterRequest::from_json(&parse_json_body(&body)?)?;

        if resources.users.find_by_email(&request.email).is_some() {
            info!("Registration rejected: email already registered");
            return Err(AppError::already_exists(USER_ALREADY_EXISTS));
        }

        let password_hash =
            hash_password(request.password, resources.config.auth.bcrypt_cost).await?;
        let user = User::new(
            request.first_name,
            request.last_name,
            request.email,
            password_hash,
        );
        resources.users.create(user.clone())?;

        let token = resources.auth_manager.generate_token(&user)?;
        info!(user_id = %user.id, "User registered");

        let response = AuthResponse {
            token,
            user: user.profile(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let request = LoginRequest::from_json(&parse_json_body(&body)?)?;

        let Some(user) = resources.users.find_by_email(&request.email) else {
            info!("Login failed: unknown email");
            return Err(AppError::auth_invalid(INVALID_CREDENTIALS));
        };
        if !verify_password(request.password, user.password_hash.clone()).await? {
            info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::auth_invalid(INVALID_CREDENTIALS));
        }

        let token = resources.auth_manager.generate_token(&user)?;
        info!(user_id = %user.id, "User logged in");

        let response = AuthResponse {
            token,
            user: user.profile(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
