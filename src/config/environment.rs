// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed ServerConfig with defaults and validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use super::rate_limit::RateLimitConfigs;
use crate::auth::generate_jwt_secret;
use crate::constants::{defaults, service_names};
use crate::external::usda_client::{UsdaClientConfig, DEFAULT_BASE_URL, DEMO_API_KEY};
use crate::nutrition::ResolverConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed service
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a testing environment
    #[must_use]
    pub const fn is_testing(&self) -> bool {
        matches!(self, Self::Testing)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// HS256 signing secret; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(Vec<u8>);

impl JwtSecret {
    /// Wrap raw secret bytes
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Secret bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret([REDACTED])")
    }
}

/// Token and password settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session token signing secret
    pub jwt_secret: JwtSecret,
    /// Session token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt cost factor (4-31)
    pub bcrypt_cost: u32,
}

/// Nutrition provider settings
#[derive(Clone)]
pub struct UsdaConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Candidates requested per search (1-200)
    pub page_size: u32,
    /// Search deadline in seconds
    pub timeout_secs: u64,
    /// Client retry budget
    pub max_retries: u32,
}

impl fmt::Debug for UsdaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsdaConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Response cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    /// Maximum number of entries
    pub max_entries: usize,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Provider settings
    pub usda: UsdaConfig,
    /// Label reported as the `source` of every result
    pub nutrition_source_label: String,
    /// Response cache settings
    pub cache: CacheConfig,
    /// Origins allowed by CORS; `["*"]` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Use the last `X-Forwarded-For` hop as the client address
    pub trust_proxy: bool,
    /// Rate limits per scope
    pub rate_limits: RateLimitConfigs,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error when a variable holds an invalid value or a
    /// production deployment lacks `JWT_SECRET`
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Lookup(&lookup);

        let environment = Environment::from_str_or_default(
            &vars
                .get("ENVIRONMENT")
                .or_else(|| vars.get("NODE_ENV"))
                .unwrap_or_default(),
        );

        let jwt_secret = match vars.get("JWT_SECRET") {
            Some(secret) => JwtSecret::new(secret),
            None if environment.is_production() => {
                anyhow::bail!("JWT_SECRET must be set in production");
            }
            None => {
                warn!("JWT_SECRET not set; using a random secret, tokens will not survive restarts");
                JwtSecret::new(generate_jwt_secret()?.to_vec())
            }
        };

        let config = Self {
            host: vars.get("HOST").unwrap_or_else(|| defaults::HOST.to_owned()),
            http_port: vars.parse("PORT", defaults::HTTP_PORT)?,
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: vars.parse("JWT_EXPIRY_HOURS", defaults::JWT_EXPIRY_HOURS)?,
                bcrypt_cost: vars.parse("BCRYPT_COST", defaults::BCRYPT_COST)?,
            },
            usda: UsdaConfig {
                api_key: vars
                    .get("USDA_API_KEY")
                    .unwrap_or_else(|| DEMO_API_KEY.to_owned()),
                base_url: vars
                    .get("USDA_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
                page_size: vars.parse("USDA_PAGE_SIZE", 10)?,
                timeout_secs: vars.parse("USDA_TIMEOUT_SECS", 10)?,
                max_retries: vars.parse("USDA_MAX_RETRIES", 2)?,
            },
            nutrition_source_label: vars
                .get("NUTRITION_SOURCE_LABEL")
                .unwrap_or_else(|| service_names::USDA_FOOD_DATA_CENTRAL.to_owned()),
            cache: CacheConfig {
                ttl_secs: vars.parse("CALORIES_CACHE_TTL_SECS", defaults::CALORIES_CACHE_TTL_SECS)?,
                max_entries: vars.parse("CACHE_MAX_ENTRIES", defaults::CACHE_MAX_ENTRIES)?,
            },
            cors_allowed_origins: parse_origins(
                &vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|| defaults::CORS_ALLOWED_ORIGINS.to_owned()),
            ),
            trust_proxy: vars.parse("TRUST_PROXY", true)?,
            rate_limits: RateLimitConfigs::for_environment(&environment),
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error describing the first out-of-range value
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.as_bytes().is_empty() {
            anyhow::bail!("JWT_SECRET cannot be empty");
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            anyhow::bail!("BCRYPT_COST must be between 4 and 31");
        }
        if self.auth.jwt_expiry_hours <= 0 {
            anyhow::bail!("JWT_EXPIRY_HOURS must be positive");
        }
        if !(1..=200).contains(&self.usda.page_size) {
            anyhow::bail!("USDA_PAGE_SIZE must be between 1 and 200");
        }
        if self.usda.timeout_secs == 0 {
            anyhow::bail!("USDA_TIMEOUT_SECS must be positive");
        }
        if self.cache.max_entries == 0 {
            anyhow::bail!("CACHE_MAX_ENTRIES must be positive");
        }
        if self.usda.api_key == DEMO_API_KEY && self.environment.is_production() {
            warn!("USDA_API_KEY not set; using the rate-limited DEMO_KEY");
        }
        Ok(())
    }

    /// Provider client settings
    #[must_use]
    pub fn usda_client_config(&self) -> UsdaClientConfig {
        UsdaClientConfig {
            api_key: self.usda.api_key.clone(),
            base_url: self.usda.base_url.clone(),
            page_size: self.usda.page_size,
            timeout: Duration::from_secs(self.usda.timeout_secs),
            max_retries: self.usda.max_retries,
            ..UsdaClientConfig::default()
        }
    }

    /// Resolver settings
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            search_timeout: Duration::from_secs(self.usda.timeout_secs),
            source_label: self.nutrition_source_label.clone(),
        }
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Calorie API Configuration:\n\
             - Environment: {}\n\
             - Bind: {}:{}\n\
             - USDA Base URL: {}\n\
             - USDA API Key: {}\n\
             - Search Timeout: {}s (retries: {})\n\
             - Response Cache: {}s TTL, {} entries\n\
             - Rate Limits (global/auth/calories): {}/{}/{}\n\
             - CORS Origins: {}\n\
             - Trust Proxy: {}",
            self.environment,
            self.host,
            self.http_port,
            self.usda.base_url,
            if self.usda.api_key == DEMO_API_KEY {
                "DEMO_KEY"
            } else {
                "Configured"
            },
            self.usda.timeout_secs,
            self.usda.max_retries,
            self.cache.ttl_secs,
            self.cache.max_entries,
            self.rate_limits.global.max_requests,
            self.rate_limits.auth.max_requests,
            self.rate_limits.calories.max_requests,
            self.cors_allowed_origins.join(", "),
            self.trust_proxy,
        )
    }
}

/// Typed access over a variable lookup
struct Lookup<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    /// Non-empty value of a variable
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("Invalid {key} value: {value}"))
        })
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.auth.jwt_expiry_hours, 24);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert_eq!(config.usda.api_key, DEMO_API_KEY);
        assert_eq!(config.usda.page_size, 10);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cors_allowed_origins.len(), 4);
        assert!(config.trust_proxy);
        assert_eq!(config.auth.jwt_secret.as_bytes().len(), 64);
    }

    #[test]
    fn test_node_env_fallback() {
        let config = config_from(&[("NODE_ENV", "test")]).unwrap();
        assert_eq!(config.environment, Environment::Testing);
        assert_eq!(config.rate_limits.global.max_requests, 10_000);

        let config = config_from(&[("ENVIRONMENT", "development"), ("NODE_ENV", "production")])
            .unwrap();
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        assert!(config_from(&[("ENVIRONMENT", "production")]).is_err());

        let config =
            config_from(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "prod-secret")]).unwrap();
        assert_eq!(config.auth.jwt_secret.as_bytes(), b"prod-secret");
        assert_eq!(config.rate_limits.calories.max_requests, 50);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("USDA_PAGE_SIZE", "500")]).is_err());
        assert!(config_from(&[("BCRYPT_COST", "2")]).is_err());
        assert!(config_from(&[("TRUST_PROXY", "maybe")]).is_err());
    }

    #[test]
    fn test_derived_client_and_resolver_config() {
        let config = config_from(&[
            ("USDA_API_KEY", "abc"),
            ("USDA_TIMEOUT_SECS", "3"),
            ("NUTRITION_SOURCE_LABEL", "Test Source"),
        ])
        .unwrap();

        let client = config.usda_client_config();
        assert_eq!(client.api_key, "abc");
        assert_eq!(client.timeout, Duration::from_secs(3));

        let resolver = config.resolver_config();
        assert_eq!(resolver.search_timeout, Duration::from_secs(3));
        assert_eq!(resolver.source_label, "Test Source");
    }

    #[test]
    fn test_summary_hides_secrets() {
        let config = config_from(&[("USDA_API_KEY", "super-secret-key"), ("JWT_SECRET", "jwt-secret")])
            .unwrap();
        let summary = config.summary();
        assert!(!summary.contains("super-secret-key"));
        assert!(!summary.contains("jwt-secret"));
        assert!(!format!("{config:?}").contains("super-secret-key"));
        assert!(!format!("{config:?}").contains("jwt-secret"));
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test", "http://b.test"]
        );
    }
}
