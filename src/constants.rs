// ABOUTME: System-wide constants for the calorie API
// ABOUTME: User-facing messages, input limits, defaults and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded constants shared by the resolver, the HTTP layer and configuration.
//! Environment-driven values live in [`crate::config`].

/// Service identity
pub mod service_names {
    /// Service name used in logs and token audience
    pub const CALORIE_API: &str = "calorie-api";

    /// Default label reported as the data source of every result
    pub const USDA_FOOD_DATA_CENTRAL: &str = "USDA FoodData Central";
}

/// Messages returned verbatim to API callers
pub mod messages {
    /// Sanitation stripped the whole dish name
    pub const INVALID_DISH_NAME_AFTER_SANITIZATION: &str = "Invalid dish name after sanitization";
    /// Provider search returned no candidates
    pub const DISH_NOT_FOUND: &str = "Dish not found";
    /// No candidate could be selected
    pub const NO_NUTRITION_DATA: &str = "No nutrition data available";
    /// Selected candidate has no energy value
    pub const CALORIES_DATA_MISSING: &str = "Calories data missing";

    /// Servings missing, non-numeric or not strictly positive
    pub const SERVINGS_POSITIVE: &str = "Servings must be a positive number";
    /// Dish name missing
    pub const DISH_NAME_REQUIRED: &str = "Dish name is required";
    /// Dish name is not a string
    pub const DISH_NAME_NOT_STRING: &str = "Dish name must be a string";
    /// Dish name longer than the limit
    pub const DISH_NAME_TOO_LONG: &str = "Dish name must be at most 100 characters";
    /// Request body is not JSON
    pub const INVALID_JSON_BODY: &str = "Request body must be valid JSON";
    /// Request body is JSON but not an object
    pub const BODY_NOT_OBJECT: &str = "Request body must be a JSON object";

    /// Bearer credential missing
    pub const NO_TOKEN: &str = "No token";
    /// Bearer credential rejected
    pub const INVALID_TOKEN: &str = "Invalid token";
    /// Login failed
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    /// Registration with an email already in use
    pub const USER_ALREADY_EXISTS: &str = "User already exists";

    /// First name missing or out of range
    pub const FIRST_NAME_INVALID: &str = "First name must be between 1 and 50 characters";
    /// Last name missing or out of range
    pub const LAST_NAME_INVALID: &str = "Last name must be between 1 and 50 characters";
    /// Email missing or malformed
    pub const EMAIL_INVALID: &str = "A valid email is required";
    /// Password missing or too short
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
    /// Login password missing
    pub const PASSWORD_REQUIRED: &str = "Password is required";

    /// Unknown route
    pub const ROUTE_NOT_FOUND: &str = "Not found";
}

/// Input limits
pub mod limits {
    /// Maximum dish name length, in characters, before sanitation
    pub const DISH_NAME_MAX_CHARS: usize = 100;
    /// Maximum length of first and last names
    pub const NAME_MAX_CHARS: usize = 50;
    /// Minimum password length
    pub const PASSWORD_MIN_CHARS: usize = 8;
    /// Maximum request body size accepted by JSON endpoints
    pub const MAX_BODY_BYTES: usize = 100 * 1024;
    /// Longest provider error body kept for logging
    pub const PROVIDER_ERROR_BODY_MAX_CHARS: usize = 200;
}

/// Defaults used when configuration is absent
pub mod defaults {
    /// HTTP port
    pub const HTTP_PORT: u16 = 5000;
    /// Bind address
    pub const HOST: &str = "0.0.0.0";
    /// JWT lifetime in hours
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// bcrypt cost factor
    pub const BCRYPT_COST: u32 = 10;
    /// Response cache TTL for calorie lookups, in seconds
    pub const CALORIES_CACHE_TTL_SECS: u64 = 60;
    /// Response cache capacity
    pub const CACHE_MAX_ENTRIES: usize = 1000;
    /// Interval of the background maintenance task, in seconds
    pub const MAINTENANCE_INTERVAL_SECS: u64 = 60;
    /// Origins allowed by CORS when none are configured
    pub const CORS_ALLOWED_ORIGINS: &str =
        "http://localhost:3000,http://localhost:3001,https://localhost:3000,https://localhost:3001";
}

/// HTTP header names
pub mod headers {
    /// Request correlation id
    pub const REQUEST_ID: &str = "x-request-id";
    /// Response cache outcome
    pub const X_CACHE: &str = "x-cache";
    /// Proxy chain
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
}
