// ABOUTME: HTTP middleware for request correlation, authentication, rate limiting and caching
// ABOUTME: Each layer is an axum from_fn middleware sharing ServerResources state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Bearer token authentication
pub mod auth;
/// CORS layer construction
pub mod cors;
/// Per-client rate limiting
pub mod rate_limiting;
/// Request id propagation
pub mod request_id;
/// Response cache for calorie lookups
pub mod response_cache;

// Authentication middleware
pub use auth::{require_auth, AuthenticatedUser};

// CORS configuration
pub use cors::setup_cors;

// Rate limiting middleware and utilities
pub use rate_limiting::{
    apply_rate_limit_headers, auth_rate_limit, calories_rate_limit, client_key,
    global_rate_limit, headers,
};

// Request correlation
pub use request_id::{request_id, RequestId};

// Response caching
pub use response_cache::cache_calories_response;
