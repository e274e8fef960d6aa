// ABOUTME: Per-client rate limiting middleware for the global, auth and calorie scopes
// ABOUTME: Adds RateLimit-* headers and rejects over-budget clients with 429 responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::headers::X_FORWARDED_FOR;
use crate::errors::AppError;
use crate::rate_limiting::{IpRateLimiter, RateLimitDecision};
use crate::resources::ServerResources;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{header::RETRY_AFTER, HeaderMap, HeaderValue};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

/// `RateLimit-*` response headers
pub mod headers {
    /// Window budget
    pub const RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
    /// Requests left in the window
    pub const RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";
    /// Seconds until the window resets
    pub const RATE_LIMIT_RESET: &str = "ratelimit-reset";
}

/// Paths the global limiter never counts
const GLOBAL_EXEMPT_PATHS: &[&str] = &["/health", "/ready"];
const GLOBAL_EXEMPT_PREFIXES: &[&str] = &["/static/", "/assets/"];

/// Identify the client for rate limiting
///
/// With `trust_proxy` the rightmost `X-Forwarded-For` entry (the address seen
/// by the one trusted proxy) wins; otherwise the socket peer address is used.
#[must_use]
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|h| h.to_str().ok())
            .and_then(|chain| chain.rsplit(',').map(str::trim).find(|ip| !ip.is_empty()));
        if let Some(ip) = forwarded {
            return ip.to_owned();
        }
    }

    peer.map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string())
}

/// Write the `RateLimit-*` headers for a decision
///
/// Headers already present are kept, so with stacked limiters the innermost
/// scope reports its own budget.
pub fn apply_rate_limit_headers(map: &mut HeaderMap, decision: &RateLimitDecision) {
    map.entry(headers::RATE_LIMIT_LIMIT)
        .or_insert_with(|| HeaderValue::from(decision.limit));
    map.entry(headers::RATE_LIMIT_REMAINING)
        .or_insert_with(|| HeaderValue::from(decision.remaining));
    map.entry(headers::RATE_LIMIT_RESET)
        .or_insert_with(|| HeaderValue::from(decision.reset_after_secs()));
}

async fn enforce(
    limiter: &IpRateLimiter,
    trust_proxy: bool,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer, trust_proxy);
    let decision = limiter.check(&key);

    if !decision.allowed {
        warn!(
            client = %key,
            limit = decision.limit,
            path = %req.uri().path(),
            "Rate limit exceeded"
        );
        let retry_after = decision.reset_after_secs();
        let mut response =
            AppError::rate_limit_exceeded(&limiter.config().message, decision.limit, retry_after)
                .into_response();
        apply_rate_limit_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }

    let mut response = next.run(req).await;
    apply_rate_limit_headers(response.headers_mut(), &decision);
    response
}

fn is_globally_exempt(path: &str) -> bool {
    GLOBAL_EXEMPT_PATHS.contains(&path)
        || GLOBAL_EXEMPT_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
}

/// Limit every request except health checks and static assets
pub async fn global_rate_limit(
    State(resources): State<Arc<ServerResources>>,
    req: Request,
    next: Next,
) -> Response {
    if is_globally_exempt(req.uri().path()) {
        return next.run(req).await;
    }
    enforce(
        &resources.global_limiter,
        resources.config.trust_proxy,
        req,
        next,
    )
    .await
}

/// Limit register and login attempts
pub async fn auth_rate_limit(
    State(resources): State<Arc<ServerResources>>,
    req: Request,
    next: Next,
) -> Response {
    enforce(
        &resources.auth_limiter,
        resources.config.trust_proxy,
        req,
        next,
    )
    .await
}

/// Limit calorie lookups
pub async fn calories_rate_limit(
    State(resources): State<Arc<ServerResources>>,
    req: Request,
    next: Next,
) -> Response {
    enforce(
        &resources.calories_limiter,
        resources.config.trust_proxy,
        req,
        next,
    )
    .await
}
