// ABOUTME: Core types for the calorie API
// ABOUTME: Foundation crate with error handling and nutrition data models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Calorie Core
//!
//! Foundation crate providing shared types for the calorie API. It changes
//! rarely, so keeping it separate lets the server crate rebuild incrementally.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `ProviderError`
//! - **models**: Food candidates, nutrient values and resolution results

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Nutrition data models shared by the resolver and the HTTP layer
pub mod models;
