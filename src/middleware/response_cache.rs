// ABOUTME: Response caching middleware for JSON POST lookups
// ABOUTME: Serves repeat bodies from the LRU cache and stores fresh 200 responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::cache::{cache_key, CachedResponse};
use crate::constants::headers::X_CACHE;
use crate::constants::limits::MAX_BODY_BYTES;
use crate::constants::messages::INVALID_JSON_BODY;
use crate::errors::{AppError, FieldError};
use crate::resources::ServerResources;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::{header::CONTENT_TYPE, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Cache successful calorie lookups keyed by method, path and JSON body
///
/// Bodies that are not valid JSON bypass the cache and reach the handler
/// unchanged, which then reports the parse failure.
pub async fn cache_calories_response(
    State(resources): State<Arc<ServerResources>>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Failed to read request body");
            return AppError::validation(vec![FieldError::new("body", INVALID_JSON_BODY)])
                .into_response();
        }
    };

    let key = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .map(|json| cache_key(&parts.method, parts.uri.path(), &json));
    let req = Request::from_parts(parts, Body::from(bytes));

    let Some(key) = key else {
        return next.run(req).await;
    };

    let cache = &resources.calories_cache;
    if let Some(cached) = cache.get(&key).await {
        debug!("Response cache hit");
        return cached_response(cached);
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::internal(format!("Failed to buffer response body: {e}"))
                .into_response();
        }
    };
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("application/json")
        .to_owned();

    cache
        .insert(
            key,
            CachedResponse {
                content_type,
                body: bytes.clone(),
            },
        )
        .await;

    parts
        .headers
        .insert(X_CACHE, HeaderValue::from_static("MISS"));
    Response::from_parts(parts, Body::from(bytes))
}

fn cached_response(cached: CachedResponse) -> Response {
    let content_type = HeaderValue::from_str(&cached.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/json"));
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (HeaderName::from_static(X_CACHE), HeaderValue::from_static("HIT")),
        ],
        cached.body,
    )
        .into_response()
}
