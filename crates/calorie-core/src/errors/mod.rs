// ABOUTME: Unified error handling with error codes, field-level validation detail and HTTP mapping
// ABOUTME: Every failure in the calorie API converges on AppError before reaching a client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Defines the error codes, the `AppError` type and the JSON error body used
//! across the calorie API. Every error body has the shape
//! `{"error": <message>, "code": <ERROR_CODE>, "details"?: ...}`.
//!
//! Server-side failures (5xx) never expose their internal message: the client
//! sees `"Server error"` while the full error is logged.

/// Errors raised by the external food search provider
pub mod provider;

/// `IntoResponse` integration for axum
#[cfg(feature = "http-response")]
mod response;

pub use provider::ProviderError;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message returned to clients for every 5xx response
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Message returned with field-level validation failures
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Credentials are missing
    AuthRequired,
    /// Credentials were supplied but rejected
    AuthInvalid,
    /// Token is past its expiry
    AuthExpired,
    /// Authenticated but not allowed
    PermissionDenied,

    // Rate Limiting
    /// Too many requests in the current window
    RateLimitExceeded,

    // Validation
    /// Request body or parameters are invalid
    InvalidInput,

    // Resources
    /// Nothing usable was found for the request
    ResourceNotFound,
    /// Resource with the same identity already exists
    ResourceAlreadyExists,

    // External Services
    /// The nutrition provider failed
    ExternalServiceError,
    /// The nutrition provider did not answer in time
    ExternalServiceTimeout,

    // Internal
    /// Configuration is missing or invalid
    ConfigError,
    /// Anything else
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired => 401,
            Self::PermissionDenied => 403,
            Self::ResourceNotFound => 404,
            Self::ResourceAlreadyExists => 409,
            Self::RateLimitExceeded => 429,
            // Provider failures surface as plain 500s without upstream detail
            Self::ExternalServiceError
            | Self::ExternalServiceTimeout
            | Self::ConfigError
            | Self::InternalError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::AuthExpired => "The authentication token has expired",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::RateLimitExceeded => "Rate limit exceeded",
            Self::InvalidInput => "The provided input is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::ExternalServiceError => "The nutrition provider encountered an error",
            Self::ExternalServiceTimeout => "The nutrition provider did not respond in time",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }

    /// Whether this code maps onto a 5xx response
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.http_status() >= 500
    }
}

/// Single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending request field
    pub field: String,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    /// Create a new field error
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured detail attached to the response body
    pub details: Option<serde_json::Value>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach structured details to the error
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Message safe to show to the caller
    #[must_use]
    pub fn client_message(&self) -> &str {
        if self.code.is_server_error() {
            GENERIC_SERVER_ERROR
        } else {
            &self.message
        }
    }

    /// Field-level validation failures, if this is a validation error
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.details
            .as_ref()
            .and_then(|details| serde_json::from_value(details.clone()).ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Message for the caller
    pub error: String,
    /// Machine-readable code
    pub code: ErrorCode,
    /// Optional structured detail (validation field list, rate limit info)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        if error.code.is_server_error() {
            return Self {
                error: GENERIC_SERVER_ERROR.to_owned(),
                code: error.code,
                details: None,
            };
        }
        Self {
            error: error.message,
            code: error.code,
            details: error.details,
        }
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "No token")
    }

    /// Invalid authentication
    #[must_use]
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Field-level validation failure
    #[must_use]
    pub fn validation(errors: Vec<FieldError>) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(serde_json::Value::Null);
        Self::new(ErrorCode::InvalidInput, VALIDATION_FAILED).with_details(details)
    }

    /// Invalid input without a field breakdown
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Resource not found; the message is returned verbatim
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, message)
    }

    /// Resource already exists
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Rate limit exceeded
    #[must_use]
    pub fn rate_limit_exceeded(message: impl Into<String>, limit: u32, retry_after_secs: u64) -> Self {
        Self::new(ErrorCode::RateLimitExceeded, message).with_details(serde_json::json!({
            "limit": limit,
            "retry_after_secs": retry_after_secs,
        }))
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External provider failure
    #[must_use]
    pub fn provider(error: ProviderError) -> Self {
        Self::from(error)
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        let code = if error.is_timeout() {
            ErrorCode::ExternalServiceTimeout
        } else {
            ErrorCode::ExternalServiceError
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}
