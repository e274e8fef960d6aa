// ABOUTME: Fixed-window request counting per client address
// ABOUTME: Backs the global, auth and calorie rate limit scopes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Rate Limiting
//!
//! Each scope owns one [`IpRateLimiter`]. A client's window opens with its
//! first request and resets once `window` has elapsed; every request in the
//! window counts, rejected ones included.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Window budget
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Time until the window resets
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Seconds until reset, rounded up
    #[must_use]
    pub fn reset_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter keyed by client address
#[derive(Debug)]
pub struct IpRateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl IpRateLimiter {
    /// Create a limiter for one scope
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Scope configuration
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `key` and decide whether it may proceed
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let window = self.config.window;

        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }
        entry.count = entry.count.saturating_add(1);

        let limit = self.config.max_requests;
        RateLimitDecision {
            allowed: entry.count <= limit,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_after: window.saturating_sub(now.duration_since(entry.started)),
        }
    }

    /// Drop windows that have ended
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window;
        let before = self.windows.len();
        self.windows
            .retain(|_, entry| now.duration_since(entry.started) < window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked clients
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Whether `key` has an open window
    #[must_use]
    pub fn is_tracking(&self, key: &str) -> bool {
        self.windows.contains_key(key)
    }
}
