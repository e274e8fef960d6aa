// ABOUTME: Data model module for the calorie API
// ABOUTME: Re-exports nutrition types used across the resolver and HTTP layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Food candidates, nutrient values and resolution results
pub mod nutrition;

pub use nutrition::{
    FoodCandidate, MacronutrientBreakdown, Macronutrients, NutrientValue, ResolutionResult,
    DEFAULT_SERVING_SIZE_GRAMS,
};
