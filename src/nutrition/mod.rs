// ABOUTME: Dish nutrition resolution pipeline: validation, matching, extraction and computation
// ABOUTME: Turns a free-text dish name and serving count into calorie and macro estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Nutrition Module
//!
//! The resolution pipeline runs in fixed stages:
//!
//! ```text
//! Validating -> Sanitizing -> Searching -> Selecting -> Extracting -> Computing -> Done
//! ```
//!
//! Any stage may fail, which ends the request with an `AppError`. Nothing here
//! holds state across requests; the HTTP layer shares one [`DishResolver`]
//! behind an `Arc`.

/// Per-serving and total nutrition arithmetic
pub mod compute;
/// Nutrient code lookup on a single food record
pub mod extractor;
/// Fuzzy best-match selection over search candidates
pub mod matcher;
/// Input validation and dish name sanitation
pub mod query;
/// Pipeline orchestration
pub mod resolver;

pub use compute::{compute_nutrition, round_one_decimal};
pub use extractor::{extract, NutrientCode, NutrientTable};
pub use matcher::{select_best, EditDistanceScorer, MatchScorer, TokenOverlapScorer};
pub use query::{sanitize_dish_name, ResolutionQuery};
pub use resolver::{DishResolver, ResolutionStage, ResolverConfig};
