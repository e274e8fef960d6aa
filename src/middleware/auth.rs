// ABOUTME: Bearer token authentication middleware for protected routes
// ABOUTME: Validates the JWT and injects the authenticated user into request extensions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::JwtValidationError;
use crate::constants::messages::INVALID_TOKEN;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identity of the caller, available to handlers behind [`require_auth`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User id from the `sub` claim
    pub user_id: Uuid,
    /// Email from the token
    pub email: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests without a valid bearer token
///
/// Missing or malformed headers yield 401 `"No token"`, tokens that fail
/// validation yield 401 `"Invalid token"`.
pub async fn require_auth(
    State(resources): State<Arc<ServerResources>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()) else {
        debug!("Request without bearer token");
        return AppError::auth_required().into_response();
    };

    let user = resources
        .auth_manager
        .validate_token(token)
        .and_then(|claims| {
            Ok(AuthenticatedUser {
                user_id: claims.user_id()?,
                email: claims.email,
            })
        });

    match user {
        Ok(user) => {
            debug!(user_id = %user.user_id, "Authenticated request");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            if matches!(e, JwtValidationError::TokenExpired { .. }) {
                debug!("Rejected expired token");
            } else {
                debug!(error = %e, "Rejected invalid token");
            }
            AppError::auth_invalid(INVALID_TOKEN).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }
}
