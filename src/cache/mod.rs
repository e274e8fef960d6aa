// ABOUTME: Response caching for idempotent JSON lookups
// ABOUTME: In-memory LRU store with per-entry TTL, keyed by request method, path and body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// In-memory cache implementation
pub mod memory;

pub use memory::{cache_key, CachedResponse, ResponseCache};
