// ABOUTME: Per-environment rate limit tiers for the global, auth and calorie scopes
// ABOUTME: Window length, request budget and rejection message per scope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::environment::Environment;
use std::time::Duration;

const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);
const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

/// Rejection messages per scope
pub mod messages {
    /// Global limiter
    pub const GLOBAL: &str = "Too many requests from this IP, please try again later";
    /// Register and login
    pub const AUTH: &str =
        "Too many authentication requests from this IP, please try again after 15 minutes";
    /// Calorie lookups
    pub const CALORIES: &str = "Too many calorie requests from this IP, please try again later";
}

/// Fixed-window limit for one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Window length
    pub window: Duration,
    /// Requests allowed per client per window
    pub max_requests: u32,
    /// Message returned with 429 responses
    pub message: String,
}

impl RateLimitConfig {
    /// Create a scope limit
    #[must_use]
    pub fn new(window: Duration, max_requests: u32, message: impl Into<String>) -> Self {
        Self {
            window,
            max_requests,
            message: message.into(),
        }
    }
}

/// Limits for every scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfigs {
    /// Every request except health and static assets
    pub global: RateLimitConfig,
    /// `/auth/*`
    pub auth: RateLimitConfig,
    /// `/get-calories`
    pub calories: RateLimitConfig,
}

impl RateLimitConfigs {
    /// Limits for a deployment environment
    #[must_use]
    pub fn for_environment(environment: &Environment) -> Self {
        let (global, auth, calories) = match environment {
            Environment::Testing => (10_000, 10_000, 10_000),
            Environment::Development => (1_000, 100, 200),
            Environment::Production => (100, 15, 50),
        };

        Self {
            global: RateLimitConfig::new(FIFTEEN_MINUTES, global, messages::GLOBAL),
            auth: RateLimitConfig::new(FIFTEEN_MINUTES, auth, messages::AUTH),
            calories: RateLimitConfig::new(TEN_MINUTES, calories, messages::CALORIES),
        }
    }
}

impl Default for RateLimitConfigs {
    fn default() -> Self {
        Self::for_environment(&Environment::default())
    }
}
