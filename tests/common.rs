// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides test configuration, a scripted food search provider and request helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `calorie_api`
//!
//! Integration tests drive the full router with `tower::ServiceExt::oneshot`
//! against a scripted [`MockFoodSearch`] so no test touches the network.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use calorie_api::{
    config::ServerConfig,
    errors::ProviderError,
    external::FoodSearch,
    models::FoodCandidate,
    resources::ServerResources,
    server::build_router,
    users::User,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Test JWT secret shared by every test config
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Configuration for the testing environment with optional overrides
pub fn test_config_with(overrides: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = [
        ("ENVIRONMENT", "testing"),
        ("JWT_SECRET", TEST_JWT_SECRET),
        ("BCRYPT_COST", "4"),
        ("CORS_ALLOWED_ORIGINS", "http://localhost:3000"),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
    .collect();
    for (key, value) in overrides {
        vars.insert((*key).to_owned(), (*value).to_owned());
    }

    ServerConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

/// Default testing configuration
pub fn test_config() -> ServerConfig {
    test_config_with(&[])
}

/// Scripted food search provider
pub struct MockFoodSearch {
    responses: HashMap<String, Result<Vec<FoodCandidate>, ProviderError>>,
    calls: AtomicUsize,
    queries: std::sync::Mutex<Vec<String>>,
}

impl MockFoodSearch {
    /// Provider that knows the standard test dishes
    pub fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert("apple".to_owned(), Ok(vec![apple(), apple_juice()]));
        responses.insert("grilled salmon".to_owned(), Ok(vec![grilled_salmon()]));
        responses.insert(
            "paneer butter masala".to_owned(),
            Ok(vec![paneer_butter_masala()]),
        );
        responses.insert(
            "mystery broth".to_owned(),
            Ok(vec![FoodCandidate::new("Mystery broth").with_nutrient("203", 1.0)]),
        );
        responses.insert(
            "outage".to_owned(),
            Err(ProviderError::HttpStatus {
                provider: "USDA API".to_owned(),
                status: 503,
                body: "service unavailable".to_owned(),
            }),
        );
        Self {
            responses,
            calls: AtomicUsize::new(0),
            queries: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Number of searches performed
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockFoodSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FoodSearch for MockFoodSearch {
    async fn search(&self, dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(dish_name.to_owned());
        self.responses
            .get(&dish_name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Apple, 52 kcal per 100 g, no serving size
pub fn apple() -> FoodCandidate {
    FoodCandidate::new("Apple, raw, with skin")
        .with_nutrient("208", 52.0)
        .with_nutrient("203", 0.26)
        .with_nutrient("204", 0.17)
        .with_nutrient("205", 13.8)
        .with_nutrient("291", 2.4)
}

/// Distractor for the apple search
pub fn apple_juice() -> FoodCandidate {
    FoodCandidate::new("Apple juice, canned or bottled, unsweetened").with_nutrient("208", 46.0)
}

/// Grilled salmon, 206 kcal per 100 g
pub fn grilled_salmon() -> FoodCandidate {
    FoodCandidate::new("Fish, salmon, Atlantic, farmed, cooked, dry heat")
        .with_nutrient("208", 206.0)
        .with_nutrient("203", 22.1)
        .with_nutrient("204", 12.35)
}

/// Paneer butter masala, 280 kcal per 100 g, 150 g servings
pub fn paneer_butter_masala() -> FoodCandidate {
    FoodCandidate::new("Paneer butter masala")
        .with_nutrient("208", 280.0)
        .with_nutrient("203", 9.0)
        .with_nutrient("204", 21.0)
        .with_nutrient("205", 12.0)
        .with_serving_size(150.0)
}

/// Router plus handles on its shared state and mock provider
pub struct TestApp {
    pub router: Router,
    pub resources: Arc<ServerResources>,
    pub search: Arc<MockFoodSearch>,
}

impl TestApp {
    /// App with the testing configuration
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// App with a custom configuration
    pub fn with_config(config: ServerConfig) -> Self {
        init_test_logging();
        let search = Arc::new(MockFoodSearch::new());
        let resources = Arc::new(ServerResources::with_food_search(
            config,
            search.clone(),
        ));
        Self {
            router: build_router(resources.clone()),
            resources,
            search,
        }
    }

    /// Send one request through a clone of the router
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Register a user directly in the store and return a valid token
    pub fn token(&self) -> String {
        let user = User::new("Test", "User", "test@example.com", "unused".to_owned());
        let token = self.resources.auth_manager.generate_token(&user).unwrap();
        let _ = self.resources.users.create(user);
        token
    }

    /// Authenticated `POST /get-calories`
    pub async fn get_calories(&self, token: &str, body: &Value) -> Response {
        self.send(
            json_request(Method::POST, "/get-calories")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Request builder with a JSON content type and a fixed client address
pub fn json_request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "198.51.100.10")
}

/// Build a complete JSON request
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    json_request(Method::POST, uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Status and parsed JSON body
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
