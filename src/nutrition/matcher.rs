//! Fuzzy food matching
//!
//! Scores a free-text food name against every corpus entry with a
//! token-order-insensitive ratio and returns the best row above a cutoff.

use std::path::Path;

use rapidfuzz::fuzz;

use super::dataset::{self, Dataset};
use super::error::{NutritionError, NutritionResult};
use super::record::FoodMatch;

/// Default minimum similarity score for accepting a match
pub const DEFAULT_CUTOFF: f64 = 75.0;

/// Split on whitespace, sort tokens, and join them with single spaces
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized InDel similarity of two char slices on a 0-100 scale
///
/// Empty input scores 0.
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    fuzz::ratio(a.iter().copied(), b.iter().copied()) * 100.0
}

/// Similarity of two strings on a 0-100 scale
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

/// Token sort ratio: `ratio` after sorting each string's words
///
/// "grilled chicken breast" and "chicken breast grilled" score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

fn validate_cutoff(cutoff: f64) -> NutritionResult<()> {
    if !(0.0..=100.0).contains(&cutoff) {
        return Err(NutritionError::InvalidArgument(format!(
            "cutoff must be between 0 and 100, got {}",
            cutoff
        )));
    }
    Ok(())
}

/// Best corpus position and its score, first position winning ties
fn best_match(dataset: &Dataset, key: &[char]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (position, candidate) in dataset.keys().iter().enumerate() {
        let score = indel_ratio(key, candidate);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((position, score));
            if score >= 100.0 {
                break;
            }
        }
    }

    best
}

impl Dataset {
    /// Find the best matching record for `query`
    ///
    /// Returns `Ok(None)` when no entry scores at least `cutoff` (inclusive),
    /// and for empty or whitespace-only queries. The returned values are a
    /// copy of the row at the matched corpus position.
    pub fn match_food(&self, query: &str, cutoff: f64) -> NutritionResult<Option<FoodMatch>> {
        validate_cutoff(cutoff)?;

        let key: Vec<char> = sort_tokens(&query.to_lowercase()).chars().collect();
        if key.is_empty() {
            return Ok(None);
        }

        let Some((position, score)) = best_match(self, &key) else {
            return Ok(None);
        };

        if score < cutoff {
            tracing::debug!("No match for '{}' (best score {:.1} < {})", query, score, cutoff);
            return Ok(None);
        }

        let Some(record) = self.record(position) else {
            return Ok(None);
        };
        tracing::debug!("Matched '{}' to '{}' with score {:.1}", query, record.food, score);

        Ok(Some(FoodMatch {
            score,
            position,
            nutrition: record.normalize(self.extra_columns()),
        }))
    }
}

/// Match against the process-wide dataset, loading it from `dir` on first use
///
/// `cutoff` defaults to `DEFAULT_CUTOFF`.
pub fn match_food(dir: &Path, query: &str, cutoff: Option<f64>) -> NutritionResult<Option<FoodMatch>> {
    dataset::load(dir)?.match_food(query, cutoff.unwrap_or(DEFAULT_CUTOFF))
}
