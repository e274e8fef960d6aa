// ABOUTME: Nutrition models for dish resolution: food candidates and computed results
// ABOUTME: FoodCandidate, NutrientValue, Macronutrients and ResolutionResult definitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Serving size assumed when the provider does not supply a usable one
pub const DEFAULT_SERVING_SIZE_GRAMS: f64 = 100.0;

/// Amount of one nutrient in 100 g of food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientValue {
    /// Canonical nutrient code (e.g. "208" for energy in kcal)
    pub code: String,
    /// Amount per 100 g of food
    pub amount_per_100g: f64,
}

impl NutrientValue {
    /// Create a nutrient value
    #[must_use]
    pub fn new(code: impl Into<String>, amount_per_100g: f64) -> Self {
        Self {
            code: code.into(),
            amount_per_100g,
        }
    }
}

/// One food record returned by a provider search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCandidate {
    /// Provider description, e.g. "Apples, raw, with skin"
    pub description: String,
    /// Nutrients, in provider order
    pub nutrients: Vec<NutrientValue>,
    /// Grams in one labeled serving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_grams: Option<f64>,
}

impl FoodCandidate {
    /// Create a candidate with no nutrients and no serving size
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            nutrients: Vec::new(),
            serving_size_grams: None,
        }
    }

    /// Append a nutrient amount
    #[must_use]
    pub fn with_nutrient(mut self, code: impl Into<String>, amount_per_100g: f64) -> Self {
        self.nutrients.push(NutrientValue::new(code, amount_per_100g));
        self
    }

    /// Set the serving size in grams
    #[must_use]
    pub fn with_serving_size(mut self, grams: f64) -> Self {
        self.serving_size_grams = Some(grams);
        self
    }

    /// Serving size to compute with: the provider value when positive, else 100 g
    #[must_use]
    pub fn effective_serving_size(&self) -> f64 {
        self.serving_size_grams
            .filter(|grams| grams.is_finite() && *grams > 0.0)
            .unwrap_or(DEFAULT_SERVING_SIZE_GRAMS)
    }
}

/// Macronutrient amounts in grams, rounded to one decimal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macronutrients {
    /// Protein
    pub protein_g: f64,
    /// Total lipid
    pub fat_g: f64,
    /// Carbohydrate, by difference
    pub carbohydrates_g: f64,
    /// Total dietary fiber
    pub fiber_g: f64,
}

impl Macronutrients {
    /// Apply `f` to every amount
    #[must_use]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            protein_g: f(self.protein_g),
            fat_g: f(self.fat_g),
            carbohydrates_g: f(self.carbohydrates_g),
            fiber_g: f(self.fiber_g),
        }
    }
}

/// Per-serving and total macronutrients
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacronutrientBreakdown {
    /// Amounts in one serving
    pub per_serving: Macronutrients,
    /// Amounts across all requested servings
    pub total: Macronutrients,
}

/// Final nutrition estimate for a dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Description of the matched provider record
    #[serde(rename = "dish_name")]
    pub matched_name: String,
    /// Number of servings requested
    pub servings: f64,
    /// Grams per serving used for scaling
    #[serde(rename = "serving_size_g")]
    pub serving_size_grams: f64,
    /// Calories in one serving
    pub calories_per_serving: i64,
    /// Calories across all servings
    pub total_calories: i64,
    /// Macronutrient breakdown
    pub macronutrients: MacronutrientBreakdown,
    /// Data source label
    pub source: String,
}
