//! In-memory word dictionaries.
//!
//! A [`Dictionary`] is the known-correct vocabulary of one language. The word
//! container is private; callers only see membership, counts and snapshots.
//! Words are stored in their lowercase canonical form.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::spelling::suggest::{Suggestion, SuggestionConfig, SuggestionEngine};

/// Version tag prefix that marks a dictionary built from the built-in list.
pub const FALLBACK_VERSION_PREFIX: &str = "fallback-";

/// Version tag assigned to built-in fallback dictionaries.
pub const FALLBACK_VERSION: &str = "fallback-1";

/// Version tag assigned to dictionaries parsed from a source.
pub const LOADED_VERSION: &str = "loaded-1";

/// Dictionaries at least this large are scanned in parallel for suggestions.
const PARALLEL_SCAN_THRESHOLD: usize = 10_000;

/// Common English words used when no real word list can be loaded.
const FALLBACK_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "back", "be",
    "because", "been", "but", "by", "can", "come", "could", "day", "do", "even", "first", "for",
    "from", "get", "give", "go", "good", "had", "has", "have", "he", "hello", "help", "her",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "know", "like",
    "look", "make", "me", "most", "my", "new", "no", "not", "now", "of", "on", "one", "only",
    "or", "other", "our", "out", "over", "people", "say", "see", "she", "so", "some", "take",
    "test", "than", "that", "the", "their", "them", "then", "there", "these", "they", "think",
    "this", "time", "to", "two", "up", "us", "use", "want", "was", "way", "we", "well", "were",
    "what", "when", "which", "who", "will", "with", "word", "work", "world", "would", "year",
    "you", "your",
];

/// Descriptive data captured when a dictionary is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryMetadata {
    /// Number of words present when the dictionary was built.
    pub word_count: usize,
    /// When the dictionary was built.
    pub loaded_at: DateTime<Utc>,
    /// Version tag. `fallback-*` marks the built-in list.
    pub version: String,
}

/// Point-in-time statistics for a dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryStats {
    /// Language code.
    pub language: String,
    /// Current number of words, custom words included.
    pub word_count: usize,
    /// Whether the dictionary was built from the built-in fallback list.
    pub is_fallback: bool,
    /// Version tag.
    pub version: String,
    /// When the dictionary was built.
    pub loaded_at: DateTime<Utc>,
    /// Number of membership probes served.
    pub lookups: u64,
    /// Number of words added after load.
    pub custom_word_count: usize,
}

/// The known-correct vocabulary of one language.
///
/// Membership checks take a shared lock, so custom words can be appended
/// while other threads are checking.
#[derive(Debug)]
pub struct Dictionary {
    language: String,
    words: RwLock<AHashSet<String>>,
    custom_words: RwLock<Vec<String>>,
    metadata: DictionaryMetadata,
    lookups: AtomicU64,
}

impl Dictionary {
    /// Build a dictionary from words. Words are lowercased; empty entries and
    /// duplicates are dropped.
    pub fn from_words<L, V, I, S>(language: L, version: V, words: I) -> Self
    where
        L: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: AHashSet<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Dictionary {
            language: language.into(),
            metadata: DictionaryMetadata {
                word_count: words.len(),
                loaded_at: Utc::now(),
                version: version.into(),
            },
            words: RwLock::new(words),
            custom_words: RwLock::new(Vec::new()),
            lookups: AtomicU64::new(0),
        }
    }

    /// Build the built-in fallback dictionary for `language`.
    pub fn fallback<L: Into<String>>(language: L) -> Self {
        Self::from_words(language, FALLBACK_VERSION, FALLBACK_WORDS.iter().copied())
    }

    /// Language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Metadata captured at build time.
    pub fn metadata(&self) -> &DictionaryMetadata {
        &self.metadata
    }

    /// Whether this dictionary came from the built-in fallback list.
    pub fn is_fallback(&self) -> bool {
        self.metadata.version.starts_with(FALLBACK_VERSION_PREFIX)
    }

    /// Check if a word exists in the dictionary. Case-insensitive.
    pub fn contains(&self, word: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let normalized = word.to_lowercase();
        self.words.read().contains(&normalized)
    }

    /// Number of words currently in the dictionary.
    pub fn word_count(&self) -> usize {
        self.words.read().len()
    }

    /// Check if the dictionary has no words.
    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    /// Number of membership probes served so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Add a custom word. Returns `false` when the word was already present
    /// or is blank, leaving the dictionary unchanged.
    pub fn add_word(&self, word: &str) -> bool {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }

        let inserted = self.words.write().insert(normalized.clone());
        if inserted {
            self.custom_words.write().push(normalized);
        }
        inserted
    }

    /// Words added after load, in insertion order.
    pub fn custom_words(&self) -> Vec<String> {
        self.custom_words.read().clone()
    }

    /// Sorted snapshot of every word.
    pub fn words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words.read().iter().cloned().collect();
        words.sort_unstable();
        words
    }

    /// Closest dictionary words to `word`.
    pub fn suggestions(
        &self,
        word: &str,
        max_suggestions: usize,
        max_distance: usize,
    ) -> Vec<Suggestion> {
        self.suggestions_with(
            word,
            SuggestionConfig {
                max_distance,
                max_suggestions,
            },
        )
    }

    /// Closest dictionary words to `word` under the given limits.
    pub fn suggestions_with(&self, word: &str, config: SuggestionConfig) -> Vec<Suggestion> {
        let engine = SuggestionEngine::new(word, config);

        let words = self.words.read();
        if words.len() >= PARALLEL_SCAN_THRESHOLD {
            let set: &HashSet<String, ahash::RandomState> = &words;
            engine.par_suggest(set)
        } else {
            engine.suggest(words.iter())
        }
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            language: self.language.clone(),
            word_count: self.word_count(),
            is_fallback: self.is_fallback(),
            version: self.metadata.version.clone(),
            loaded_at: self.metadata.loaded_at,
            lookups: self.lookup_count(),
            custom_word_count: self.custom_words.read().len(),
        }
    }
}
