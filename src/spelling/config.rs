//! Configuration for the spell checker.
//!
//! [`SpellCheckOptions`] is the partial, user-facing form (every field
//! optional, camelCase JSON keys). [`SpellCheckConfig::merge`] applies it over
//! a set of defaults without touching any shared state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpellGuardError};
use crate::spelling::loader::{LANGUAGE_PLACEHOLDER, RetryPolicy, is_valid_language_code};
use crate::spelling::suggest::{DEFAULT_MAX_DISTANCE, DEFAULT_MAX_SUGGESTIONS, SuggestionConfig};

/// Fully resolved spell checker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellCheckConfig {
    /// Supported language codes. Empty accepts any language.
    pub languages: Vec<String>,

    /// Language used when a call does not name one.
    pub default_language: String,

    /// Retries after the first failed fetch.
    pub max_retries: u32,

    /// Fixed delay between fetch attempts, in milliseconds.
    pub retry_delay_ms: u64,

    /// Path template for word lists; `{lang}` is replaced by the language code.
    pub dictionary_path: String,

    /// Languages loaded eagerly by `initialize`.
    pub preload_languages: Vec<String>,

    /// Capacity of the correctness cache.
    pub cache_size: usize,

    /// Substitute the built-in word list when a dictionary cannot be loaded.
    pub allow_fallback: bool,

    /// Maximum number of suggestions returned by `suggest`.
    pub max_suggestions: usize,

    /// Maximum edit distance considered by `suggest`.
    pub max_distance: usize,
}

impl Default for SpellCheckConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            default_language: "en-US".to_string(),
            max_retries: 3,
            retry_delay_ms: 1000,
            dictionary_path: format!("dictionaries/{LANGUAGE_PLACEHOLDER}.dic"),
            preload_languages: Vec::new(),
            cache_size: 1000,
            allow_fallback: true,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

/// Partial configuration; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpellCheckOptions {
    pub languages: Option<Vec<String>>,
    pub default_language: Option<String>,
    pub max_retries: Option<u32>,
    #[serde(rename = "retryDelay")]
    pub retry_delay_ms: Option<u64>,
    pub dictionary_path: Option<String>,
    pub preload_languages: Option<Vec<String>>,
    pub cache_size: Option<usize>,
    pub allow_fallback: Option<bool>,
    pub max_suggestions: Option<usize>,
    pub max_distance: Option<usize>,
}

impl SpellCheckConfig {
    /// Apply `options` over `defaults`.
    pub fn merge(defaults: &SpellCheckConfig, options: &SpellCheckOptions) -> SpellCheckConfig {
        let defaults = defaults.clone();
        SpellCheckConfig {
            languages: options.languages.clone().unwrap_or(defaults.languages),
            default_language: options
                .default_language
                .clone()
                .unwrap_or(defaults.default_language),
            max_retries: options.max_retries.unwrap_or(defaults.max_retries),
            retry_delay_ms: options.retry_delay_ms.unwrap_or(defaults.retry_delay_ms),
            dictionary_path: options
                .dictionary_path
                .clone()
                .unwrap_or(defaults.dictionary_path),
            preload_languages: options
                .preload_languages
                .clone()
                .unwrap_or(defaults.preload_languages),
            cache_size: options.cache_size.unwrap_or(defaults.cache_size),
            allow_fallback: options.allow_fallback.unwrap_or(defaults.allow_fallback),
            max_suggestions: options.max_suggestions.unwrap_or(defaults.max_suggestions),
            max_distance: options.max_distance.unwrap_or(defaults.max_distance),
        }
    }

    /// Apply `options` over the built-in defaults.
    pub fn from_options(options: &SpellCheckOptions) -> SpellCheckConfig {
        Self::merge(&SpellCheckConfig::default(), options)
    }

    /// Read options from a JSON file and apply them over the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<SpellCheckConfig> {
        let content = std::fs::read_to_string(path)?;
        let options: SpellCheckOptions = serde_json::from_str(&content)?;
        Ok(Self::from_options(&options))
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_language_code(&self.default_language) {
            return Err(SpellGuardError::invalid_config(format!(
                "default language '{}' is not a valid language code",
                self.default_language
            )));
        }
        if !self.supports(&self.default_language) {
            return Err(SpellGuardError::invalid_config(format!(
                "default language '{}' is not in the supported languages",
                self.default_language
            )));
        }
        if let Some(language) = self.preload_languages.iter().find(|l| !self.supports(l)) {
            return Err(SpellGuardError::invalid_config(format!(
                "preload language '{language}' is not in the supported languages"
            )));
        }
        Ok(())
    }

    /// Whether `language` is accepted.
    pub fn supports(&self, language: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language)
    }

    /// Retry schedule derived from `max_retries` and `retry_delay_ms`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    /// Suggestion limits.
    pub fn suggestion_config(&self) -> SuggestionConfig {
        SuggestionConfig {
            max_distance: self.max_distance,
            max_suggestions: self.max_suggestions,
        }
    }

    /// Set the default language.
    pub fn with_default_language<S: Into<String>>(mut self, language: S) -> Self {
        self.default_language = language.into();
        self
    }

    /// Restrict the supported languages.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the languages loaded by `initialize` besides the default one.
    pub fn with_preload_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preload_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the retry budget.
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the word-list path template.
    pub fn with_dictionary_path<S: Into<String>>(mut self, template: S) -> Self {
        self.dictionary_path = template.into();
        self
    }

    /// Set the correctness cache capacity.
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Enable or disable fallback substitution.
    pub fn with_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    /// Set suggestion limits.
    pub fn with_suggestion_limits(mut self, max_suggestions: usize, max_distance: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self.max_distance = max_distance;
        self
    }
}
