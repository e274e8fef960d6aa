// ABOUTME: External food search providers (USDA FoodData Central)
// ABOUTME: Defines the FoodSearch seam the resolver depends on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External API Clients
//!
//! The resolver only sees [`FoodSearch`]; [`UsdaClient`] is the production
//! implementation and tests substitute in-memory fakes.

pub mod usda_client;

use crate::errors::ProviderError;
use crate::models::FoodCandidate;
use async_trait::async_trait;

pub use usda_client::{UsdaClient, UsdaClientConfig};

/// Search capability of a nutrition provider
#[async_trait]
pub trait FoodSearch: Send + Sync {
    /// Candidate food records for a sanitized dish name, in provider order.
    ///
    /// A search that finds nothing returns an empty list.
    async fn search(&self, dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError>;
}
