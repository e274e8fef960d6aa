// ABOUTME: Configuration management module for server settings
// ABOUTME: Environment-driven server config and per-environment rate limit tiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the calorie API
//!
//! - **Environment**: Server configuration from environment variables
//! - **Rate limits**: Per-scope request budgets derived from the deployment environment

/// Environment and server configuration
pub mod environment;
/// Rate limit tiers
pub mod rate_limit;

pub use environment::{Environment, ServerConfig};
pub use rate_limit::{RateLimitConfig, RateLimitConfigs};
