// ABOUTME: USDA FoodData Central search client producing normalized food candidates
// ABOUTME: Maps transport, status and parse failures to ProviderError and retries transient ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! USDA `FoodData` Central API Client
//!
//! Wraps `GET /foods/search` and converts each returned food into a
//! [`FoodCandidate`]. Nutrients are keyed by their legacy nutrient number
//! ("208" energy, "203" protein, ...); serving sizes are kept only when
//! expressed in grams.
//!
//! # API Reference
//! USDA `FoodData` Central API: <https://fdc.nal.usda.gov/api-guide.html>
//!
//! # Example
//! ```rust,no_run
//! use calorie_api::external::{FoodSearch, UsdaClient, UsdaClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = UsdaClient::new(UsdaClientConfig {
//!     api_key: "your_api_key".to_owned(),
//!     ..UsdaClientConfig::default()
//! });
//! let candidates = client.search("apple").await?;
//! # Ok(())
//! # }
//! ```

use super::FoodSearch;
use crate::constants::limits::PROVIDER_ERROR_BODY_MAX_CHARS;
use crate::errors::ProviderError;
use crate::models::FoodCandidate;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Provider name used in errors and logs
pub const USDA_PROVIDER: &str = "USDA API";

/// Default public API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";

/// Shared demonstration key with a low hourly quota
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Serving size units treated as grams
const GRAM_UNITS: [&str; 5] = ["g", "gm", "grm", "gram", "grams"];

/// USDA API client configuration
#[derive(Debug, Clone)]
pub struct UsdaClientConfig {
    /// USDA API key (free from <https://fdc.nal.usda.gov/api-key-signup.html>)
    pub api_key: String,
    /// Base URL for USDA API
    pub base_url: String,
    /// Number of candidates requested per search (1-200)
    pub page_size: u32,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Extra attempts after a retryable failure
    pub max_retries: u32,
    /// First retry delay, doubled on each further attempt
    pub retry_base_delay: Duration,
}

impl Default for UsdaClientConfig {
    fn default() -> Self {
        Self {
            api_key: DEMO_API_KEY.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            page_size: 10,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(250),
        }
    }
}

/// USDA API search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    #[serde(default)]
    description: String,
    #[serde(default)]
    food_nutrients: Vec<SearchNutrient>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNutrient {
    nutrient_number: Option<Value>,
    value: Option<f64>,
}

impl SearchNutrient {
    /// Nutrient number as a string; USDA sends strings but older payloads use numbers
    fn code(&self) -> Option<String> {
        match self.nutrient_number.as_ref()? {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        }
    }
}

impl From<SearchFood> for FoodCandidate {
    fn from(food: SearchFood) -> Self {
        let mut candidate = Self::new(food.description);
        for nutrient in &food.food_nutrients {
            if let (Some(code), Some(value)) = (nutrient.code(), nutrient.value) {
                candidate = candidate.with_nutrient(code, value);
            }
        }

        let unit_is_grams = match food.serving_size_unit.as_deref() {
            None => true,
            Some(unit) => GRAM_UNITS
                .iter()
                .any(|gram| unit.trim().eq_ignore_ascii_case(gram)),
        };
        if let Some(grams) = food
            .serving_size
            .filter(|size| unit_is_grams && size.is_finite() && *size > 0.0)
        {
            candidate = candidate.with_serving_size(grams);
        }
        candidate
    }
}

/// USDA `FoodData` Central API Client
#[derive(Debug, Clone)]
pub struct UsdaClient {
    config: UsdaClientConfig,
    http_client: Client,
}

impl UsdaClient {
    /// Create a new USDA API client
    #[must_use]
    pub fn new(config: UsdaClientConfig) -> Self {
        let http_client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            http_client,
        }
    }

    /// Client configuration
    #[must_use]
    pub const fn config(&self) -> &UsdaClientConfig {
        &self.config
    }

    /// Search for foods, retrying transient failures with exponential backoff
    ///
    /// # Errors
    ///
    /// Returns the last `ProviderError` once retries are exhausted, or the
    /// first non-retryable one
    #[instrument(skip(self), fields(provider = USDA_PROVIDER, page_size = self.config.page_size))]
    pub async fn search_foods(&self, query: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.search_once(query).await {
                Ok(candidates) => {
                    debug!(count = candidates.len(), "USDA search completed");
                    return Ok(candidates);
                }
                Err(error) if error.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let backoff = self.config.retry_base_delay * 2_u32.pow(attempt - 1);
                    warn!(
                        "{USDA_PROVIDER} request failed ({error}) - retry {attempt}/{} after {}ms backoff",
                        self.config.max_retries,
                        backoff.as_millis()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn search_once(&self, query: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
        let url = format!("{}/foods/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &self.config.page_size.to_string()),
                ("api_key", &self.config.api_key),
            ])
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok());
            return Err(ProviderError::RateLimited {
                provider: USDA_PROVIDER.to_owned(),
                retry_after_secs,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::HttpStatus {
                provider: USDA_PROVIDER.to_owned(),
                status: status.as_u16(),
                body: body.chars().take(PROVIDER_ERROR_BODY_MAX_CHARS).collect(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        parse_search_response(&body)
    }

    /// Map a reqwest failure, dropping the URL so the API key never reaches logs
    fn map_transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            return ProviderError::Timeout {
                provider: USDA_PROVIDER.to_owned(),
                timeout: self.config.timeout,
            };
        }
        ProviderError::Transport {
            provider: USDA_PROVIDER.to_owned(),
            message: error.without_url().to_string(),
        }
    }
}

/// Decode a `/foods/search` body into candidates, preserving provider order
///
/// # Errors
///
/// Returns `ProviderError::Parse` when the body is not the expected JSON
pub fn parse_search_response(body: &[u8]) -> Result<Vec<FoodCandidate>, ProviderError> {
    let response: SearchResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::Parse {
            provider: USDA_PROVIDER.to_owned(),
            message: e.to_string(),
        })?;
    Ok(response.foods.into_iter().map(FoodCandidate::from).collect())
}

#[async_trait]
impl FoodSearch for UsdaClient {
    async fn search(&self, dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
        self.search_foods(dish_name).await
    }
}
