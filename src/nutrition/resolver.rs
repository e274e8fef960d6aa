// ABOUTME: Dish resolution orchestrator running validation, search, selection and computation
// ABOUTME: Stateless across requests; shares the provider and scorer behind Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::compute::compute_nutrition;
use super::extractor::NutrientTable;
use super::matcher::{select_best, MatchScorer, TokenOverlapScorer};
use super::query::ResolutionQuery;
use crate::constants::messages::{
    DISH_NOT_FOUND, INVALID_DISH_NAME_AFTER_SANITIZATION, NO_NUTRITION_DATA,
};
use crate::constants::service_names::USDA_FOOD_DATA_CENTRAL;
use crate::errors::{AppError, AppResult, ProviderError};
use crate::external::FoodSearch;
use crate::models::{FoodCandidate, ResolutionResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, Span};

/// Provider name reported when the resolver's own deadline expires
const SEARCH_PROVIDER: &str = "food search";

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on one provider search, retries included
    pub search_timeout: Duration,
    /// Label reported as `source` in every result
    pub source_label: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(10),
            source_label: USDA_FOOD_DATA_CENTRAL.to_owned(),
        }
    }
}

/// Pipeline stage, recorded on the `resolve` span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    /// Checking request fields
    Validating,
    /// Cleaning the dish name
    Sanitizing,
    /// Waiting on the provider
    Searching,
    /// Picking the best candidate
    Selecting,
    /// Reading nutrient codes
    Extracting,
    /// Scaling and rounding
    Computing,
    /// Result built
    Done,
}

impl ResolutionStage {
    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Sanitizing => "sanitizing",
            Self::Searching => "searching",
            Self::Selecting => "selecting",
            Self::Extracting => "extracting",
            Self::Computing => "computing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter_stage(stage: ResolutionStage) {
    Span::current().record("stage", stage.as_str());
    debug!(stage = stage.as_str(), "resolution stage");
}

/// Resolves dish names into nutrition estimates.
///
/// Cheap to share: all fields are immutable and reference counted. Dropping
/// a pending `resolve` future drops the in-flight provider call with it.
#[derive(Clone)]
pub struct DishResolver {
    search: Arc<dyn FoodSearch>,
    scorer: Arc<dyn MatchScorer>,
    config: ResolverConfig,
}

impl fmt::Debug for DishResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DishResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DishResolver {
    /// Create a resolver using the default [`TokenOverlapScorer`]
    #[must_use]
    pub fn new(search: Arc<dyn FoodSearch>, config: ResolverConfig) -> Self {
        Self {
            search,
            scorer: Arc::new(TokenOverlapScorer),
            config,
        }
    }

    /// Replace the match scorer
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn MatchScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Resolver settings
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Validate a JSON request body and resolve it
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, otherwise any error of [`Self::resolve`]
    #[instrument(
        name = "resolve",
        skip(self, body),
        fields(
            dish_name = tracing::field::Empty,
            servings = tracing::field::Empty,
            stage = tracing::field::Empty,
        )
    )]
    pub async fn resolve_json(&self, body: &Value) -> AppResult<ResolutionResult> {
        enter_stage(ResolutionStage::Validating);
        let query = ResolutionQuery::from_json(body).inspect_err(|e| {
            info!(error = %e, "rejected calorie request");
        })?;
        Span::current().record("servings", query.servings);
        self.run(&query).await
    }

    /// Run the pipeline for a validated query
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the name sanitizes to nothing
    /// - `ResourceNotFound` when the provider has no match or the match has no calories
    /// - `ExternalServiceError`/`ExternalServiceTimeout` when the provider fails
    #[instrument(
        skip(self, query),
        fields(
            dish_name = tracing::field::Empty,
            servings = query.servings,
            stage = tracing::field::Empty,
        )
    )]
    pub async fn resolve(&self, query: &ResolutionQuery) -> AppResult<ResolutionResult> {
        self.run(query).await
    }

    /// Pipeline stages after validation, recorded on the caller's span
    async fn run(&self, query: &ResolutionQuery) -> AppResult<ResolutionResult> {
        enter_stage(ResolutionStage::Sanitizing);
        let dish_name = query.sanitized_dish_name();
        if dish_name.is_empty() {
            info!("dish name empty after sanitization");
            return Err(AppError::invalid_input(INVALID_DISH_NAME_AFTER_SANITIZATION));
        }
        Span::current().record("dish_name", dish_name.as_str());

        enter_stage(ResolutionStage::Searching);
        let candidates = self.search_with_timeout(&dish_name).await.map_err(|e| {
            error!(provider = e.provider(), error = %e, "food search failed");
            AppError::provider(e)
        })?;
        if candidates.is_empty() {
            info!("no search results");
            return Err(AppError::not_found(DISH_NOT_FOUND));
        }

        enter_stage(ResolutionStage::Selecting);
        let best = select_best(&candidates, &dish_name, self.scorer.as_ref())
            .ok_or_else(|| AppError::not_found(NO_NUTRITION_DATA))?;
        debug!(
            matched = %best.description,
            candidates = candidates.len(),
            "selected best match"
        );

        enter_stage(ResolutionStage::Extracting);
        let table = NutrientTable::from_candidate(best);
        table.calories().inspect_err(|_| {
            info!(matched = %best.description, "matched food has no calorie data");
        })?;

        enter_stage(ResolutionStage::Computing);
        let result = compute_nutrition(best, &table, query.servings, &self.config.source_label)?;

        enter_stage(ResolutionStage::Done);
        Ok(result)
    }

    /// Provider search bounded by the configured deadline
    async fn search_with_timeout(
        &self,
        dish_name: &str,
    ) -> Result<Vec<FoodCandidate>, ProviderError> {
        let timeout = self.config.search_timeout;
        tokio::time::timeout(timeout, self.search.search(dish_name))
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: SEARCH_PROVIDER.to_owned(),
                timeout,
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::messages::CALORIES_DATA_MISSING;
    use crate::errors::{ErrorCode, GENERIC_SERVER_ERROR};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tracing::field::{Field, Visit};
    use tracing::span::{Id, Record};
    use tracing::Subscriber;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects every value recorded into a span's `stage` field
    #[derive(Clone, Default)]
    struct StageLog(Arc<Mutex<Vec<String>>>);

    impl StageLog {
        fn stages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct StageVisitor<'a>(&'a mut Vec<String>);

    impl Visit for StageVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "stage" {
                self.0.push(value.to_owned());
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}
    }

    impl<S: Subscriber> Layer<S> for StageLog {
        fn on_record(&self, _span: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
            let mut stages = self.0.lock().unwrap();
            values.record(&mut StageVisitor(&mut stages));
        }
    }

    struct StaticSearch {
        foods: Vec<FoodCandidate>,
        calls: AtomicUsize,
    }

    impl StaticSearch {
        fn new(foods: Vec<FoodCandidate>) -> Arc<Self> {
            Arc::new(Self {
                foods,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FoodSearch for StaticSearch {
        async fn search(&self, _dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.foods.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl FoodSearch for FailingSearch {
        async fn search(&self, _dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
            Err(ProviderError::HttpStatus {
                provider: "USDA API".to_owned(),
                status: 503,
                body: "upstream down".to_owned(),
            })
        }
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    struct PendingSearch {
        dropped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FoodSearch for PendingSearch {
        async fn search(&self, _dish_name: &str) -> Result<Vec<FoodCandidate>, ProviderError> {
            let _guard = DropFlag(Arc::clone(&self.dropped));
            std::future::pending::<()>().await;
            Ok(Vec::new())
        }
    }

    fn resolver(search: Arc<dyn FoodSearch>) -> DishResolver {
        DishResolver::new(search, ResolverConfig::default())
    }

    fn query(dish_name: &str, servings: f64) -> ResolutionQuery {
        ResolutionQuery::new(dish_name, servings).unwrap()
    }

    #[tokio::test]
    async fn test_apple_scenario() {
        let search = StaticSearch::new(vec![
            FoodCandidate::new("apple")
                .with_nutrient("208", 52.0)
                .with_serving_size(100.0),
        ]);

        let result = resolver(search).resolve(&query("apple", 2.0)).await.unwrap();

        assert_eq!(result.matched_name, "apple");
        assert_eq!(result.calories_per_serving, 52);
        assert_eq!(result.total_calories, 104);
        assert_eq!(result.source, USDA_FOOD_DATA_CENTRAL);
    }

    #[tokio::test]
    async fn test_grilled_salmon_fractional_servings() {
        let search = StaticSearch::new(vec![
            FoodCandidate::new("grilled salmon").with_nutrient("208", 206.0)
        ]);

        let result = resolver(search)
            .resolve(&query("grilled salmon", 1.5))
            .await
            .unwrap();

        assert_eq!(result.calories_per_serving, 206);
        assert_eq!(result.total_calories, 309);
    }

    #[tokio::test]
    async fn test_paneer_uses_provider_serving_size() {
        let search = StaticSearch::new(vec![
            FoodCandidate::new("paneer butter masala")
                .with_nutrient("208", 280.0)
                .with_serving_size(150.0),
        ]);

        let result = resolver(search)
            .resolve(&query("paneer butter masala", 2.0))
            .await
            .unwrap();

        assert_eq!(result.calories_per_serving, 420);
        assert_eq!(result.total_calories, 840);
    }

    #[tokio::test]
    async fn test_overlong_name_never_reaches_provider() {
        let search = StaticSearch::new(vec![FoodCandidate::new("a").with_nutrient("208", 1.0)]);
        let resolver = resolver(Arc::clone(&search) as Arc<dyn FoodSearch>);

        let error = resolver
            .resolve_json(&json!({"dish_name": "a".repeat(101), "servings": 1}))
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_punctuation_only_name_is_invalid() {
        let search = StaticSearch::new(Vec::new());
        let error = resolver(search).resolve(&query("?!.,", 1.0)).await.unwrap_err();

        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.message, INVALID_DISH_NAME_AFTER_SANITIZATION);
    }

    #[tokio::test]
    async fn test_empty_search_is_dish_not_found() {
        let search = StaticSearch::new(Vec::new());
        let error = resolver(search)
            .resolve(&query("unknown dish xyz", 1.0))
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::ResourceNotFound);
        assert_eq!(error.message, DISH_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_match_without_calories() {
        let search = StaticSearch::new(vec![
            FoodCandidate::new("Some food without calories").with_nutrient("203", 3.0)
        ]);
        let error = resolver(search)
            .resolve(&query("Some food without calories", 1.0))
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::ResourceNotFound);
        assert_eq!(error.message, CALORIES_DATA_MISSING);
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let error = resolver(Arc::new(FailingSearch))
            .resolve(&query("apple", 1.0))
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::ExternalServiceError);
        assert_eq!(error.client_message(), GENERIC_SERVER_ERROR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_timeout() {
        let dropped = Arc::new(AtomicBool::new(false));
        let search = Arc::new(PendingSearch {
            dropped: Arc::clone(&dropped),
        });
        let resolver = DishResolver::new(
            search,
            ResolverConfig {
                search_timeout: Duration::from_secs(2),
                ..ResolverConfig::default()
            },
        );

        let error = resolver.resolve(&query("apple", 1.0)).await.unwrap_err();

        assert_eq!(error.code, ErrorCode::ExternalServiceTimeout);
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_dropping_resolve_cancels_search() {
        let dropped = Arc::new(AtomicBool::new(false));
        let resolver = resolver(Arc::new(PendingSearch {
            dropped: Arc::clone(&dropped),
        }));
        let query = query("apple", 1.0);

        tokio::select! {
            _ = resolver.resolve(&query) => panic!("search never completes"),
            () = tokio::time::sleep(Duration::from_millis(20)) => {}
        }

        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_identical_input_gives_identical_output() {
        let search = StaticSearch::new(vec![
            FoodCandidate::new("Apple, raw, with skin")
                .with_nutrient("208", 52.0)
                .with_nutrient("203", 0.26),
            FoodCandidate::new("Apple juice").with_nutrient("208", 46.0),
        ]);
        let resolver = resolver(search);
        let body = json!({"dish_name": "apple", "servings": 2});

        let first = serde_json::to_vec(&resolver.resolve_json(&body).await.unwrap()).unwrap();
        let second = serde_json::to_vec(&resolver.resolve_json(&body).await.unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_custom_source_label() {
        let search = StaticSearch::new(vec![FoodCandidate::new("apple").with_nutrient("208", 52.0)]);
        let resolver = DishResolver::new(
            search,
            ResolverConfig {
                source_label: "Local test data".to_owned(),
                ..ResolverConfig::default()
            },
        );

        let result = resolver.resolve(&query("apple", 1.0)).await.unwrap();
        assert_eq!(result.source, "Local test data");
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(ResolutionStage::Searching.to_string(), "searching");
        assert_eq!(ResolutionStage::Done.as_str(), "done");
    }

    #[tokio::test]
    async fn test_json_entry_records_every_stage() {
        let log = StageLog::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));
        let search = StaticSearch::new(vec![FoodCandidate::new("apple").with_nutrient("208", 52.0)]);

        resolver(search)
            .resolve_json(&json!({"dish_name": "apple", "servings": 1}))
            .await
            .unwrap();

        assert_eq!(
            log.stages(),
            [
                "validating",
                "sanitizing",
                "searching",
                "selecting",
                "extracting",
                "computing",
                "done"
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_body_records_validating_stage() {
        let log = StageLog::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(log.clone()));

        let error = resolver(StaticSearch::new(Vec::new()))
            .resolve_json(&json!({"dish_name": "", "servings": 1}))
            .await
            .unwrap_err();

        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(log.stages(), ["validating"]);
    }
}
