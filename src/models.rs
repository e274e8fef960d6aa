// ABOUTME: Nutrition data models, re-exported from calorie-core
// ABOUTME: FoodCandidate, NutrientValue, Macronutrients and ResolutionResult
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Data models shared by the resolver, the provider client and the HTTP layer.

pub use calorie_core::models::*;
