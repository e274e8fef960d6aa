// ABOUTME: Main library entry point for the calorie API
// ABOUTME: Resolves dish names into calorie and macronutrient estimates behind an authenticated HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Calorie API
//!
//! Turns a free-text dish name and a serving count into calorie and
//! macronutrient totals using USDA `FoodData` Central.
//!
//! ## Architecture
//!
//! - **Nutrition**: sanitation, best-match selection, nutrient extraction and
//!   serving-scaled computation ([`nutrition::DishResolver`])
//! - **External**: the [`external::FoodSearch`] seam and its USDA client
//! - **Auth / Users**: JWT session tokens and an in-memory user store
//! - **Middleware / Routes / Server**: the axum HTTP surface with rate
//!   limiting and response caching
//! - **Config / Logging**: environment-driven configuration and `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use calorie_api::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     calorie_api::server::serve(config).await
//! }
//! ```

/// JWT issuance, validation and password hashing
pub mod auth;

/// LRU response cache
pub mod cache;

/// Environment-driven configuration
pub mod config;

/// Application constants and user-facing messages
pub mod constants;

/// Unified error handling (re-exported from `calorie-core`)
pub mod errors;

/// External food search providers
pub mod external;

/// `tracing` subscriber setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Nutrition models (re-exported from `calorie-core`)
pub mod models;

/// Dish nutrition resolution pipeline
pub mod nutrition;

/// Fixed-window rate limiting
pub mod rate_limiting;

/// Shared server state
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// User accounts
pub mod users;
