// ABOUTME: Route module organization for the calorie API HTTP endpoints
// ABOUTME: Groups auth, calorie and health routes plus shared request body parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the calorie API
//!
//! Each domain module exposes a `*Routes::routes` constructor returning a
//! finished `Router`; handlers stay thin and delegate to the resolver, the
//! auth manager and the user store.

/// Registration and login
pub mod auth;
/// Dish calorie lookup
pub mod calories;
/// Health and readiness checks
pub mod health;

pub use auth::AuthRoutes;
pub use calories::CaloriesRoutes;
pub use health::HealthRoutes;

use crate::constants::messages::INVALID_JSON_BODY;
use crate::errors::{AppError, AppResult, FieldError};
use axum::body::Bytes;
use serde_json::Value;

/// Parse a raw request body as JSON
///
/// Handlers take the body as `Bytes` so malformed JSON is reported with the
/// same error shape as every other validation failure.
///
/// # Errors
///
/// Returns a validation error on the `body` field when the bytes are not JSON
pub fn parse_json_body(bytes: &Bytes) -> AppResult<Value> {
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        AppError::validation(vec![FieldError::new("body", INVALID_JSON_BODY)])
    })
}
