// ABOUTME: Structured error types for the external food search provider
// ABOUTME: Distinguishes timeouts, transport, HTTP status and parse failures for retry decisions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;
use thiserror::Error;

/// Failure talking to the nutrition provider.
///
/// "No matches" is not an error: a search that legitimately finds nothing
/// returns an empty candidate list instead.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider did not answer before the deadline
    #[error("{provider} request timed out after {timeout:?}")]
    Timeout {
        /// Provider name
        provider: String,
        /// Deadline that elapsed
        timeout: Duration,
    },

    /// Connection-level failure
    #[error("{provider} transport error: {message}")]
    Transport {
        /// Provider name
        provider: String,
        /// Underlying error text
        message: String,
    },

    /// Non-success HTTP status
    #[error("{provider} returned HTTP {status}: {body}")]
    HttpStatus {
        /// Provider name
        provider: String,
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// Provider throttled us
    #[error("{provider} rate limit exceeded")]
    RateLimited {
        /// Provider name
        provider: String,
        /// Seconds until a retry is allowed, when the provider says so
        retry_after_secs: Option<u64>,
    },

    /// Response body did not match the expected shape
    #[error("{provider} response could not be parsed: {message}")]
    Parse {
        /// Provider name
        provider: String,
        /// Deserialization error text
        message: String,
    },
}

impl ProviderError {
    /// Name of the provider that failed
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::Timeout { provider, .. }
            | Self::Transport { provider, .. }
            | Self::HttpStatus { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::Parse { provider, .. } => provider,
        }
    }

    /// Whether the failure was a deadline expiry
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether repeating the same request may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport { .. } | Self::RateLimited { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Parse { .. } => false,
        }
    }
}
