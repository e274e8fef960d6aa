// ABOUTME: Request validation and dish name sanitation for nutrition resolution
// ABOUTME: Builds a ResolutionQuery only from input that passed every field check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::limits::DISH_NAME_MAX_CHARS;
use crate::constants::messages::{
    BODY_NOT_OBJECT, DISH_NAME_NOT_STRING, DISH_NAME_REQUIRED, DISH_NAME_TOO_LONG,
    SERVINGS_POSITIVE,
};
use crate::errors::{AppError, AppResult, FieldError};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Validated resolution input
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionQuery {
    /// Dish name as supplied, 1 to 100 characters, not yet sanitized
    pub dish_name_raw: String,
    /// Number of servings, strictly positive
    pub servings: f64,
}

impl ResolutionQuery {
    /// Validate a dish name and serving count
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every offending field
    pub fn new(dish_name: impl Into<String>, servings: f64) -> AppResult<Self> {
        let dish_name = Value::String(dish_name.into());
        let servings = serde_json::Number::from_f64(servings).map_or(Value::Null, Value::Number);
        Self::validate(Some(&dish_name), Some(&servings))
    }

    /// Validate raw JSON fields.
    ///
    /// Missing and mistyped servings report the same message as
    /// non-positive ones.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every offending field
    pub fn validate(dish_name: Option<&Value>, servings: Option<&Value>) -> AppResult<Self> {
        let mut errors = Vec::new();

        let dish_name = match dish_name {
            None | Some(Value::Null) => {
                errors.push(FieldError::new("dish_name", DISH_NAME_REQUIRED));
                None
            }
            Some(Value::String(name)) if name.is_empty() => {
                errors.push(FieldError::new("dish_name", DISH_NAME_REQUIRED));
                None
            }
            Some(Value::String(name)) if name.chars().count() > DISH_NAME_MAX_CHARS => {
                errors.push(FieldError::new("dish_name", DISH_NAME_TOO_LONG));
                None
            }
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => {
                errors.push(FieldError::new("dish_name", DISH_NAME_NOT_STRING));
                None
            }
        };

        let servings = servings
            .and_then(Value::as_f64)
            .filter(|count| count.is_finite() && *count > 0.0);
        if servings.is_none() {
            errors.push(FieldError::new("servings", SERVINGS_POSITIVE));
        }

        match (dish_name, servings) {
            (Some(dish_name_raw), Some(servings)) if errors.is_empty() => Ok(Self {
                dish_name_raw,
                servings,
            }),
            _ => Err(AppError::validation(errors)),
        }
    }

    /// Validate a JSON request body of the form `{"dish_name": .., "servings": ..}`
    ///
    /// # Errors
    ///
    /// Returns a validation error when the body is not an object or a field is invalid
    pub fn from_json(body: &Value) -> AppResult<Self> {
        let Some(object) = body.as_object() else {
            return Err(AppError::validation(vec![FieldError::new(
                "body",
                BODY_NOT_OBJECT,
            )]));
        };
        Self::validate(object.get("dish_name"), object.get("servings"))
    }

    /// Sanitized dish name used for the provider search
    #[must_use]
    pub fn sanitized_dish_name(&self) -> String {
        sanitize_dish_name(&self.dish_name_raw)
    }
}

fn punctuation_regex() -> Option<&'static Regex> {
    static PUNCTUATION: OnceLock<Option<Regex>> = OnceLock::new();
    PUNCTUATION
        .get_or_init(|| Regex::new(r"[^0-9A-Za-z_\s]").ok())
        .as_ref()
}

/// Strip everything except ASCII word characters and whitespace, then collapse
/// whitespace runs to a single space and trim.
///
/// May return an empty string; callers treat that as invalid input.
#[must_use]
pub fn sanitize_dish_name(raw: &str) -> String {
    let stripped = punctuation_regex().map_or_else(
        || {
            raw.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
                .collect()
        },
        |regex| regex.replace_all(raw, "").into_owned(),
    );
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorCode, VALIDATION_FAILED};
    use serde_json::json;

    #[test]
    fn test_sanitize_strips_punctuation_and_collapses_spaces() {
        assert_eq!(sanitize_dish_name("  Grilled   salmon!! "), "Grilled salmon");
        assert_eq!(sanitize_dish_name("mac & cheese"), "mac cheese");
        assert_eq!(sanitize_dish_name("chicken_tikka\tmasala"), "chicken_tikka masala");
        assert_eq!(sanitize_dish_name("crème brûlée"), "crme brle");
    }

    #[test]
    fn test_sanitize_can_produce_empty() {
        assert_eq!(sanitize_dish_name("!!!"), "");
        assert_eq!(sanitize_dish_name("   "), "");
        assert_eq!(sanitize_dish_name("<>{}"), "");
        assert_eq!(sanitize_dish_name("寿司"), "");
        assert_eq!(sanitize_dish_name("寿司 roll"), "roll");
    }

    #[test]
    fn test_valid_query() {
        let query = ResolutionQuery::from_json(&json!({"dish_name": "apple", "servings": 2})).unwrap();
        assert_eq!(query.dish_name_raw, "apple");
        assert!((query.servings - 2.0).abs() < f64::EPSILON);

        let query = ResolutionQuery::new("grilled salmon", 1.5).unwrap();
        assert!((query.servings - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_positive_servings_rejected() {
        for servings in [json!(0), json!(-1), json!(-0.5), json!("2"), json!(null)] {
            let error = ResolutionQuery::from_json(&json!({"dish_name": "apple", "servings": servings}))
                .unwrap_err();
            assert_eq!(error.code, ErrorCode::InvalidInput);
            assert_eq!(error.message, VALIDATION_FAILED);
            let fields = error.field_errors();
            assert_eq!(fields.len(), 1);
            assert_eq!(fields[0].field, "servings");
            assert!(fields[0].message.contains("positive number"));
        }

        let error = ResolutionQuery::from_json(&json!({"dish_name": "apple"})).unwrap_err();
        assert_eq!(error.field_errors()[0].message, SERVINGS_POSITIVE);
    }

    #[test]
    fn test_dish_name_length_limits() {
        let at_limit = "a".repeat(100);
        assert!(ResolutionQuery::new(at_limit, 1.0).is_ok());

        let too_long = "a".repeat(101);
        let error = ResolutionQuery::new(too_long, 1.0).unwrap_err();
        assert_eq!(error.field_errors()[0].message, DISH_NAME_TOO_LONG);

        let error = ResolutionQuery::new("", 1.0).unwrap_err();
        assert_eq!(error.field_errors()[0].message, DISH_NAME_REQUIRED);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let name = "é".repeat(100);
        assert!(ResolutionQuery::new(name, 1.0).is_ok());
    }

    #[test]
    fn test_all_field_errors_collected() {
        let error = ResolutionQuery::from_json(&json!({"dish_name": 42, "servings": 0})).unwrap_err();
        let fields = error.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], FieldError::new("dish_name", DISH_NAME_NOT_STRING));
        assert_eq!(fields[1], FieldError::new("servings", SERVINGS_POSITIVE));
    }

    #[test]
    fn test_body_must_be_object() {
        let error = ResolutionQuery::from_json(&json!(["apple", 2])).unwrap_err();
        assert_eq!(error.field_errors()[0].field, "body");
    }
}
