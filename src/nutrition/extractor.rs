// ABOUTME: Nutrient extraction from a single food record by canonical nutrient code
// ABOUTME: Missing macros default to zero while missing calories fail the request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::messages::CALORIES_DATA_MISSING;
use crate::errors::{AppError, AppResult};
use crate::models::{FoodCandidate, Macronutrients};
use std::collections::HashMap;

/// Canonical nutrient codes used by USDA `FoodData` Central
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutrientCode {
    /// Energy (kcal)
    Calories,
    /// Protein (g)
    Protein,
    /// Total lipid (g)
    Fat,
    /// Carbohydrate, by difference (g)
    Carbohydrates,
    /// Fiber, total dietary (g)
    Fiber,
}

impl NutrientCode {
    /// Codes reported as macronutrients
    pub const MACROS: [Self; 4] = [Self::Protein, Self::Fat, Self::Carbohydrates, Self::Fiber];

    /// Provider code string
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Calories => "208",
            Self::Protein => "203",
            Self::Fat => "204",
            Self::Carbohydrates => "205",
            Self::Fiber => "291",
        }
    }

    /// Parse a provider code string
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "208" => Some(Self::Calories),
            "203" => Some(Self::Protein),
            "204" => Some(Self::Fat),
            "205" => Some(Self::Carbohydrates),
            "291" => Some(Self::Fiber),
            _ => None,
        }
    }
}

/// Nutrient amounts of one candidate, keyed by code.
///
/// Built once per candidate. When a record repeats a code, the first entry
/// wins, the same answer a front-to-back scan would give.
#[derive(Debug, Clone)]
pub struct NutrientTable<'a> {
    amounts: HashMap<&'a str, f64>,
}

impl<'a> NutrientTable<'a> {
    /// Index the nutrients of a candidate
    #[must_use]
    pub fn from_candidate(candidate: &'a FoodCandidate) -> Self {
        let mut amounts = HashMap::with_capacity(candidate.nutrients.len());
        for nutrient in &candidate.nutrients {
            amounts
                .entry(nutrient.code.as_str())
                .or_insert(nutrient.amount_per_100g);
        }
        Self { amounts }
    }

    /// Amount per 100 g, if the record carries the code
    #[must_use]
    pub fn amount(&self, code: NutrientCode) -> Option<f64> {
        self.amounts.get(code.code()).copied()
    }

    /// Calories per 100 g
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` ("Calories data missing") when the record has no energy value
    pub fn calories(&self) -> AppResult<f64> {
        self.amount(NutrientCode::Calories)
            .ok_or_else(|| AppError::not_found(CALORIES_DATA_MISSING))
    }

    /// Amount per 100 g, or zero when absent
    #[must_use]
    pub fn macro_or_zero(&self, code: NutrientCode) -> f64 {
        self.amount(code).unwrap_or(0.0)
    }

    /// Macronutrients per 100 g, unrounded
    #[must_use]
    pub fn macros_per_100g(&self) -> Macronutrients {
        Macronutrients {
            protein_g: self.macro_or_zero(NutrientCode::Protein),
            fat_g: self.macro_or_zero(NutrientCode::Fat),
            carbohydrates_g: self.macro_or_zero(NutrientCode::Carbohydrates),
            fiber_g: self.macro_or_zero(NutrientCode::Fiber),
        }
    }
}

/// Look up a single nutrient on a candidate.
///
/// Macros default to `0.0` when absent; calories are required.
///
/// # Errors
///
/// Returns `ResourceNotFound` when `code` is [`NutrientCode::Calories`] and the record has none
pub fn extract(candidate: &FoodCandidate, code: NutrientCode) -> AppResult<f64> {
    let table = NutrientTable::from_candidate(candidate);
    match code {
        NutrientCode::Calories => table.calories(),
        other => Ok(table.macro_or_zero(other)),
    }
}
