//! Spelling suggestion generation.
//!
//! Candidates are scored by Levenshtein distance to the target, filtered by a
//! maximum distance, ranked closest first and truncated. Candidates at the
//! same distance are ordered alphabetically so results never depend on the
//! iteration order of the underlying word set.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::spelling::levenshtein::LevenshteinMatcher;

/// Default number of suggestions returned.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Default maximum edit distance considered.
pub const DEFAULT_MAX_DISTANCE: usize = 2;

/// A suggested correction and its edit distance from the original word.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    /// The suggested word.
    pub word: String,
    /// Edit distance from the original word.
    pub distance: usize,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new<S: Into<String>>(word: S, distance: usize) -> Self {
        Suggestion {
            word: word.into(),
            distance,
        }
    }
}

impl Ord for Suggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.word.cmp(&other.word))
    }
}

impl PartialOrd for Suggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Limits applied to a suggestion search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Maximum edit distance to consider.
    pub max_distance: usize,
    /// Maximum number of suggestions to return.
    pub max_suggestions: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            max_distance: DEFAULT_MAX_DISTANCE,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

/// Scores candidate words against one misspelled target.
#[derive(Debug, Clone)]
pub struct SuggestionEngine {
    matcher: LevenshteinMatcher,
    config: SuggestionConfig,
}

impl SuggestionEngine {
    /// Create an engine for `word`. The word is lowercased before matching.
    pub fn new(word: &str, config: SuggestionConfig) -> Self {
        SuggestionEngine {
            matcher: LevenshteinMatcher::new(word.to_lowercase()),
            config,
        }
    }

    /// Distance from the target to `candidate`, or `None` when the candidate
    /// is the target itself or lies beyond the maximum distance.
    pub fn score(&self, candidate: &str) -> Option<usize> {
        if candidate == self.matcher.target() {
            return None;
        }
        self.matcher
            .distance_threshold(candidate, self.config.max_distance)
    }

    /// Scan candidates sequentially.
    pub fn suggest<I, S>(&self, candidates: I) -> Vec<Suggestion>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.is_degenerate() {
            return Vec::new();
        }

        let scored = candidates
            .into_iter()
            .filter_map(|candidate| {
                let candidate = candidate.as_ref();
                self.score(candidate)
                    .map(|distance| Suggestion::new(candidate, distance))
            })
            .collect();
        self.rank(scored)
    }

    /// Scan candidates on the rayon thread pool. Produces the same result as
    /// [`SuggestionEngine::suggest`].
    pub fn par_suggest<'a, I>(&self, candidates: I) -> Vec<Suggestion>
    where
        I: IntoParallelIterator<Item = &'a String>,
    {
        if self.is_degenerate() {
            return Vec::new();
        }

        let scored = candidates
            .into_par_iter()
            .filter_map(|candidate| {
                self.score(candidate)
                    .map(|distance| Suggestion::new(candidate.as_str(), distance))
            })
            .collect();
        self.rank(scored)
    }

    fn is_degenerate(&self) -> bool {
        self.matcher.is_empty() || self.config.max_suggestions == 0
    }

    fn rank(&self, mut scored: Vec<Suggestion>) -> Vec<Suggestion> {
        scored.sort_unstable();
        scored.truncate(self.config.max_suggestions);
        scored
    }
}

/// Find the closest candidates to `word` within `max_distance` edits.
///
/// The target is lowercased, never suggested back to itself, and an empty
/// word or candidate set yields an empty list.
pub fn get_suggestions<I, S>(
    word: &str,
    candidates: I,
    max_suggestions: usize,
    max_distance: usize,
) -> Vec<Suggestion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let config = SuggestionConfig {
        max_distance,
        max_suggestions,
    };
    SuggestionEngine::new(word, config).suggest(candidates)
}
