// ABOUTME: Serving-scaled calorie and macronutrient arithmetic with fixed rounding rules
// ABOUTME: Calories round to integers, macros to one decimal, half away from zero
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::extractor::NutrientTable;
use crate::errors::AppResult;
use crate::models::{FoodCandidate, MacronutrientBreakdown, ResolutionResult};

/// Round to one decimal place, half away from zero
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Scale a matched food record to `servings` servings.
///
/// `table` must be indexed from `candidate`. Total calories are computed from
/// the already rounded per-serving value, so
/// `total_calories == round(calories_per_serving * servings)` holds exactly.
/// The same two-stage rule applies to each macronutrient.
///
/// # Errors
///
/// Returns `ResourceNotFound` when the record has no calorie value
pub fn compute_nutrition(
    candidate: &FoodCandidate,
    table: &NutrientTable<'_>,
    servings: f64,
    source: &str,
) -> AppResult<ResolutionResult> {
    let calories_per_100g = table.calories()?;
    let serving_size = candidate.effective_serving_size();
    let scale = serving_size / 100.0;

    let calories_per_serving = (calories_per_100g * scale).round();
    let total_calories = (calories_per_serving * servings).round();

    let per_serving = table
        .macros_per_100g()
        .map(|amount| round_one_decimal(amount * scale));
    let total = per_serving.map(|amount| round_one_decimal(amount * servings));

    Ok(ResolutionResult {
        matched_name: candidate.description.clone(),
        servings,
        serving_size_grams: serving_size,
        calories_per_serving: calories_per_serving as i64,
        total_calories: total_calories as i64,
        macronutrients: MacronutrientBreakdown { per_serving, total },
        source: source.to_owned(),
    })
}
