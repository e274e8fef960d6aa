// ABOUTME: Dish calorie lookup route handler
// ABOUTME: Wires auth, rate limiting and response caching in front of the resolver
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::middleware::{
    cache_calories_response, calories_rate_limit, require_auth, AuthenticatedUser,
};
use crate::resources::ServerResources;
use crate::routes::parse_json_body;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use std::sync::Arc;
use tracing::debug;

/// Calorie lookup routes
pub struct CaloriesRoutes;

impl CaloriesRoutes {
    /// Create `POST /get-calories`
    ///
    /// Layers run outermost first: bearer auth, the calorie limiter, then the
    /// response cache.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/get-calories", post(Self::handle_get_calories))
            .layer(middleware::from_fn_with_state(
                resources.clone(),
                cache_calories_response,
            ))
            .layer(middleware::from_fn_with_state(
                resources.clone(),
                calories_rate_limit,
            ))
            .layer(middleware::from_fn_with_state(
                resources.clone(),
                require_auth,
            ))
            .with_state(resources)
    }

    /// Handle POST /get-calories
    async fn handle_get_calories(
        State(resources): State<Arc<ServerResources>>,
        Extension(user): Extension<AuthenticatedUser>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let body = parse_json_body(&body)?;
        debug!(user_id = %user.user_id, "Calorie lookup");

        let result = resources.resolver.resolve_json(&body).await?;
        Ok((StatusCode::OK, Json(result)).into_response())
    }
}
