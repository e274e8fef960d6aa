// ABOUTME: Centralized resource container shared by every HTTP handler and middleware
// ABOUTME: Holds the resolver, auth manager, user store, rate limiters and response cache
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources Module
//!
//! Built once at startup and handed to axum as `State<Arc<ServerResources>>`.

use crate::auth::AuthManager;
use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::external::{FoodSearch, UsdaClient};
use crate::nutrition::DishResolver;
use crate::rate_limiting::IpRateLimiter;
use crate::users::UserStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Centralized resource container for dependency injection
#[derive(Debug)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Nutrition pipeline
    pub resolver: DishResolver,
    /// JWT issuance and validation
    pub auth_manager: AuthManager,
    /// Registered users
    pub users: UserStore,
    /// Limiter applied to every route except health and static assets
    pub global_limiter: IpRateLimiter,
    /// Limiter for `/auth/*`
    pub auth_limiter: IpRateLimiter,
    /// Limiter for `/get-calories`
    pub calories_limiter: IpRateLimiter,
    /// Cache of successful calorie responses
    pub calories_cache: ResponseCache,
}

impl ServerResources {
    /// Create resources backed by the USDA client
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let client = UsdaClient::new(config.usda_client_config());
        Self::with_food_search(config, Arc::new(client))
    }

    /// Create resources with an arbitrary food search provider
    #[must_use]
    pub fn with_food_search(config: ServerConfig, search: Arc<dyn FoodSearch>) -> Self {
        let resolver = DishResolver::new(search, config.resolver_config());
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        );
        let calories_cache = ResponseCache::new(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.max_entries,
        );

        info!(environment = %config.environment, "Server resources initialized");

        Self {
            resolver,
            auth_manager,
            users: UserStore::new(),
            global_limiter: IpRateLimiter::new(config.rate_limits.global.clone()),
            auth_limiter: IpRateLimiter::new(config.rate_limits.auth.clone()),
            calories_limiter: IpRateLimiter::new(config.rate_limits.calories.clone()),
            calories_cache,
            config: Arc::new(config),
        }
    }

    /// Drop expired rate limit windows and cache entries
    pub async fn purge_expired(&self) {
        let windows = self.global_limiter.purge_expired()
            + self.auth_limiter.purge_expired()
            + self.calories_limiter.purge_expired();
        let entries = self.calories_cache.purge_expired().await;
        if windows > 0 || entries > 0 {
            tracing::debug!(windows, entries, "Purged expired rate limit windows and cache entries");
        }
    }
}
