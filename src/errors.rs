// ABOUTME: Error types for the calorie API, re-exported from calorie-core
// ABOUTME: Keeps crate::errors paths stable for every module in this crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Unified error handling. See [`calorie_core::errors`].

pub use calorie_core::errors::*;
