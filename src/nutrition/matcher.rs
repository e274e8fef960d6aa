// ABOUTME: Best-match selection of a food record for a dish query
// ABOUTME: Pluggable scoring strategies with deterministic, order-stable tie breaking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Best-Match Selection
//!
//! Provider searches return several loosely related records ("Apple, raw",
//! "Apple juice", "Apple pie"). [`select_best`] picks one of them using a
//! [`MatchScorer`]; the highest score wins and ties go to the record the
//! provider listed first.
//!
//! Two scorers ship with the crate:
//!
//! - [`TokenOverlapScorer`] (default) rewards descriptions that contain every
//!   query word, lightly favors short descriptions and records whose first
//!   word is the first query word.
//! - [`EditDistanceScorer`] compares whole strings by normalized Levenshtein
//!   distance.

use crate::models::FoodCandidate;

/// Relevance of a candidate for a query; higher is better
pub trait MatchScorer: Send + Sync {
    /// Score `candidate` against `query`
    fn score(&self, candidate: &FoodCandidate, query: &str) -> f64;
}

/// Pick the highest-scoring candidate.
///
/// Returns `None` only for an empty slice. Ties keep the earliest candidate
/// and NaN scores rank below everything else.
#[must_use]
pub fn select_best<'a>(
    candidates: &'a [FoodCandidate],
    query: &str,
    scorer: &dyn MatchScorer,
) -> Option<&'a FoodCandidate> {
    let mut best: Option<(&FoodCandidate, f64)> = None;

    for candidate in candidates {
        let score = scorer.score(candidate, query);
        let score = if score.is_nan() {
            f64::NEG_INFINITY
        } else {
            score
        };

        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Word-overlap scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlapScorer;

impl TokenOverlapScorer {
    const COVERAGE_WEIGHT: f64 = 0.7;
    const PRECISION_WEIGHT: f64 = 0.2;
    const LEADING_WEIGHT: f64 = 0.1;
}

impl MatchScorer for TokenOverlapScorer {
    fn score(&self, candidate: &FoodCandidate, query: &str) -> f64 {
        let mut query_tokens: Vec<String> = Vec::new();
        for token in tokenize(query) {
            if !query_tokens.contains(&token) {
                query_tokens.push(token);
            }
        }
        let description_tokens = tokenize(&candidate.description);

        let (Some(first_query), Some(first_description)) =
            (query_tokens.first(), description_tokens.first())
        else {
            return 0.0;
        };

        let matched_query = query_tokens
            .iter()
            .filter(|q| description_tokens.iter().any(|d| tokens_match(q, d)))
            .count();
        let matched_description = description_tokens
            .iter()
            .filter(|d| query_tokens.iter().any(|q| tokens_match(q, d)))
            .count();

        let coverage = matched_query as f64 / query_tokens.len() as f64;
        let precision = matched_description as f64 / description_tokens.len() as f64;
        let leading = if tokens_match(first_query, first_description) {
            1.0
        } else {
            0.0
        };

        Self::LEADING_WEIGHT.mul_add(
            leading,
            Self::COVERAGE_WEIGHT.mul_add(coverage, Self::PRECISION_WEIGHT * precision),
        )
    }
}

/// Whole-string similarity scorer: `1 - levenshtein / longest_length`
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceScorer;

impl MatchScorer for EditDistanceScorer {
    fn score(&self, candidate: &FoodCandidate, query: &str) -> f64 {
        let query = query.to_lowercase();
        let description = candidate.description.to_lowercase();
        let longest = query.chars().count().max(description.chars().count());
        if longest == 0 {
            return 1.0;
        }
        1.0 - levenshtein_distance(&query, &description) as f64 / longest as f64
    }
}

/// Lowercase alphanumeric words
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Equal, or equal after dropping one trailing plural "s"
fn tokens_match(left: &str, right: &str) -> bool {
    left == right || left.strip_suffix('s') == Some(right) || right.strip_suffix('s') == Some(left)
}

/// Character-level Levenshtein distance
fn levenshtein_distance(left: &str, right: &str) -> usize {
    let right: Vec<char> = right.chars().collect();
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    let mut current = vec![0; right.len() + 1];

    for (i, left_char) in left.chars().enumerate() {
        current[0] = i + 1;
        for (j, right_char) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(left_char != *right_char);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}
