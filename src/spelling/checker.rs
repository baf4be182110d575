//! The spell checker: per-language dictionary registry, deduplicated loads,
//! cached correctness checks and suggestions.
//!
//! Each language moves through `NotLoaded -> Loading -> Loaded | FallbackLoaded`.
//! Only one load per language runs at a time; concurrent callers await the same
//! shared future. A load keeps running even if every caller stops waiting, and
//! its result is registered for later callers.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use ahash::AHashMap;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};

use crate::cache::{CacheStats, LruCache};
use crate::error::{Result, SpellGuardError};
use crate::spelling::config::SpellCheckConfig;
use crate::spelling::dictionary::{Dictionary, DictionaryStats};
use crate::spelling::loader::{DictionaryLoader, DictionarySource, FileSource};
use crate::spelling::suggest::Suggestion;

type LoadFuture = Shared<BoxFuture<'static, Result<Arc<Dictionary>>>>;

type CacheKey = (String, String);

/// A load in progress, tagged with the registry generation it belongs to.
struct InFlight {
    generation: u64,
    future: LoadFuture,
}

struct Inner {
    config: SpellCheckConfig,
    loader: DictionaryLoader,
    dictionaries: RwLock<AHashMap<String, Arc<Dictionary>>>,
    loading: Mutex<AHashMap<String, InFlight>>,
    /// Correctness verdicts keyed by (language, lowercased word).
    cache: Mutex<LruCache<CacheKey, bool>>,
    initialized: AtomicBool,
    /// Bumped by `cleanup` so loads started earlier do not repopulate the registry.
    generation: AtomicU64,
}

impl Inner {
    async fn load(inner: Arc<Inner>, language: String, generation: u64) -> Result<Arc<Dictionary>> {
        let outcome = match inner.loader.load_dictionary(&language).await {
            Ok(dictionary) => Ok(Arc::new(dictionary)),
            Err(e) if e.is_transient() && inner.config.allow_fallback => {
                warn!("[checker] using fallback dictionary for '{language}': {e}");
                Ok(Arc::new(Dictionary::fallback(language.as_str())))
            }
            Err(e) if e.is_transient() => {
                warn!("[checker] no dictionary for '{language}' and fallback is disabled: {e}");
                Err(SpellGuardError::dictionary_not_found(format!("{language} ({e})")))
            }
            Err(e) => Err(e),
        };

        if let Ok(dictionary) = &outcome {
            let mut dictionaries = inner.dictionaries.write();
            if inner.generation.load(Ordering::SeqCst) == generation {
                dictionaries.insert(language.clone(), Arc::clone(dictionary));
            } else {
                debug!("[checker] discarding '{language}' loaded before cleanup");
            }
        }

        let mut loading = inner.loading.lock();
        if loading
            .get(&language)
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            loading.remove(&language);
        }

        outcome
    }
}

/// Cached, fault-tolerant spell checker.
///
/// Cloning is cheap; clones share dictionaries, in-flight loads and cache.
/// Separate `SpellChecker::new` instances share nothing.
///
/// # Examples
///
/// ```no_run
/// use spellguard::spelling::{SpellCheckConfig, SpellChecker};
///
/// # async fn example() -> spellguard::error::Result<()> {
/// let checker = SpellChecker::new(SpellCheckConfig::default())?;
/// checker.initialize().await?;
///
/// if !checker.check_word("helo").await? {
///     let suggestions = checker.suggest("helo").await?;
///     println!("did you mean: {}", suggestions.join(", "));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SpellChecker {
    inner: Arc<Inner>,
}

impl SpellChecker {
    /// Create a checker that reads word lists from `config.dictionary_path`.
    pub fn new(config: SpellCheckConfig) -> Result<Self> {
        let source = Arc::new(FileSource::new(config.dictionary_path.clone()));
        Self::with_source(config, source)
    }

    /// Create a checker with a custom word-list source.
    pub fn with_source(config: SpellCheckConfig, source: Arc<dyn DictionarySource>) -> Result<Self> {
        let loader = DictionaryLoader::new(source, config.retry_policy());
        Self::with_loader(config, loader)
    }

    /// Create a checker with a fully configured loader.
    pub fn with_loader(config: SpellCheckConfig, loader: DictionaryLoader) -> Result<Self> {
        config.validate()?;
        let cache = LruCache::new(config.cache_size);
        Ok(SpellChecker {
            inner: Arc::new(Inner {
                config,
                loader,
                dictionaries: RwLock::new(AHashMap::new()),
                loading: Mutex::new(AHashMap::new()),
                cache: Mutex::new(cache),
                initialized: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SpellCheckConfig {
        &self.inner.config
    }

    /// Load the default language and every preload language in parallel.
    ///
    /// Fails with [`SpellGuardError::Initialization`] if any of them cannot be
    /// loaded, even via fallback.
    pub async fn initialize(&self) -> Result<()> {
        let config = &self.inner.config;
        let mut languages = vec![config.default_language.clone()];
        for language in &config.preload_languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }

        let results = join_all(languages.iter().map(|l| self.ensure_dictionary(l))).await;
        for (language, result) in languages.iter().zip(results) {
            result.map_err(|e| SpellGuardError::initialization(language.as_str(), e))?;
        }

        self.inner.initialized.store(true, Ordering::SeqCst);
        info!(
            "[checker] initialized with {} dictionaries (default '{}')",
            languages.len(),
            config.default_language
        );
        Ok(())
    }

    /// Whether `initialize` has completed since construction or the last `cleanup`.
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// Load `language` now instead of on first use and return its statistics.
    pub async fn load_language(&self, language: &str) -> Result<DictionaryStats> {
        let dictionary = self.ensure_dictionary(language).await?;
        Ok(dictionary.stats())
    }

    /// Check a word in the default language.
    pub async fn check_word(&self, word: &str) -> Result<bool> {
        let language = self.inner.config.default_language.clone();
        self.check_word_in(word, &language).await
    }

    /// Check a word in `language`.
    ///
    /// Empty or whitespace-only input is always correct and never touches a
    /// dictionary. Results are cached per language and lowercased word.
    pub async fn check_word_in(&self, word: &str, language: &str) -> Result<bool> {
        if word.trim().is_empty() {
            return Ok(true);
        }

        let normalized = word.to_lowercase();
        let key = cache_key(language, &normalized);
        if let Some(correct) = self.inner.cache.lock().get(&key) {
            return Ok(correct);
        }

        let generation = self.inner.generation.load(Ordering::SeqCst);
        let dictionary = self.ensure_dictionary(language).await?;
        let correct = dictionary.contains(&normalized);
        let mut cache = self.inner.cache.lock();
        // Results computed across a cleanup belong to the discarded state
        if self.inner.generation.load(Ordering::SeqCst) == generation {
            cache.put(key, correct);
        }
        Ok(correct)
    }

    /// Suggest corrections in the default language.
    pub async fn suggest(&self, word: &str) -> Result<Vec<String>> {
        let language = self.inner.config.default_language.clone();
        self.suggest_in(word, &language).await
    }

    /// Suggest corrections for `word` in `language`, best first.
    ///
    /// Fails with [`SpellGuardError::InvalidWord`] on empty input. A word that
    /// is already correct gets no suggestions.
    pub async fn suggest_in(&self, word: &str, language: &str) -> Result<Vec<String>> {
        let suggestions = self.suggest_detailed_in(word, language).await?;
        Ok(suggestions.into_iter().map(|s| s.word).collect())
    }

    /// Like [`SpellChecker::suggest_in`], keeping each suggestion's edit distance.
    pub async fn suggest_detailed_in(&self, word: &str, language: &str) -> Result<Vec<Suggestion>> {
        if word.trim().is_empty() {
            return Err(SpellGuardError::invalid_word(
                "cannot suggest corrections for an empty word",
            ));
        }

        let dictionary = self.ensure_dictionary(language).await?;
        let normalized = word.to_lowercase();
        if dictionary.contains(&normalized) {
            return Ok(Vec::new());
        }

        Ok(dictionary.suggestions_with(&normalized, self.inner.config.suggestion_config()))
    }

    /// Add a word to `language`'s dictionary for this session.
    ///
    /// Returns whether the word was new. Adding the same word again has no
    /// further effect.
    pub async fn add_custom_word(&self, word: &str, language: &str) -> Result<bool> {
        let normalized = word.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SpellGuardError::invalid_word("cannot add an empty word"));
        }

        let dictionary = self.ensure_dictionary(language).await?;
        let added = dictionary.add_word(&normalized);
        // Drop any cached "misspelled" verdict
        self.inner.cache.lock().delete(&cache_key(language, &normalized));
        if added {
            debug!("[checker] added custom word '{normalized}' to '{language}'");
        }
        Ok(added)
    }

    /// Add several custom words, returning how many were new.
    pub async fn add_custom_words<I, S>(&self, words: I, language: &str) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for word in words {
            if self.add_custom_word(word.as_ref(), language).await? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Custom words added to a loaded dictionary, in insertion order.
    pub fn custom_words(&self, language: &str) -> Option<Vec<String>> {
        self.dictionary(language).map(|d| d.custom_words())
    }

    /// Sorted snapshot of a loaded dictionary's words.
    pub fn dictionary_words(&self, language: &str) -> Option<Vec<String>> {
        self.dictionary(language).map(|d| d.words())
    }

    /// Languages with a loaded dictionary, sorted.
    pub fn get_available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.inner.dictionaries.read().keys().cloned().collect();
        languages.sort_unstable();
        languages
    }

    /// Statistics for a loaded dictionary, or `None` if it is not loaded.
    pub fn get_dictionary_stats(&self, language: &str) -> Option<DictionaryStats> {
        self.dictionary(language).map(|d| d.stats())
    }

    /// Whether a load for `language` is in progress.
    pub fn is_loading(&self, language: &str) -> bool {
        self.inner.loading.lock().contains_key(language)
    }

    /// Empty the correctness cache.
    pub fn clear_cache(&self) {
        self.inner.cache.lock().clear();
        debug!("[checker] cache cleared");
    }

    /// Resize the correctness cache. Fails if `size` is zero.
    pub fn set_cache_size(&self, size: usize) -> Result<()> {
        self.inner.cache.lock().set_capacity(size)
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.lock().stats()
    }

    /// Drop every dictionary and cached result and reset the initialized flag.
    pub fn cleanup(&self) {
        {
            let mut dictionaries = self.inner.dictionaries.write();
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            dictionaries.clear();
        }
        self.inner.loading.lock().clear();
        self.inner.cache.lock().clear();
        self.inner.initialized.store(false, Ordering::SeqCst);
        debug!("[checker] cleaned up");
    }

    fn dictionary(&self, language: &str) -> Option<Arc<Dictionary>> {
        self.inner.dictionaries.read().get(language).cloned()
    }

    /// Return the dictionary for `language`, loading it or joining an
    /// in-flight load as needed.
    async fn ensure_dictionary(&self, language: &str) -> Result<Arc<Dictionary>> {
        if !self.inner.config.supports(language) {
            return Err(SpellGuardError::dictionary_not_found(format!(
                "{language} (not a supported language)"
            )));
        }
        if let Some(dictionary) = self.dictionary(language) {
            return Ok(dictionary);
        }

        let future = {
            let mut loading = self.inner.loading.lock();
            // The load may have finished while we waited for the lock
            if let Some(dictionary) = self.dictionary(language) {
                return Ok(dictionary);
            }

            match loading.get(language) {
                Some(in_flight) => {
                    debug!("[checker] joining in-flight load for '{language}'");
                    in_flight.future.clone()
                }
                None => {
                    let generation = self.inner.generation.load(Ordering::SeqCst);
                    let future = Inner::load(Arc::clone(&self.inner), language.to_string(), generation)
                        .boxed()
                        .shared();
                    loading.insert(
                        language.to_string(),
                        InFlight {
                            generation,
                            future: future.clone(),
                        },
                    );
                    // Drive the load to completion even if every caller goes away
                    if let Ok(handle) = tokio::runtime::Handle::try_current() {
                        handle.spawn(future.clone());
                    }
                    future
                }
            }
        };

        future.await
    }
}

impl fmt::Debug for SpellChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpellChecker")
            .field("config", &self.inner.config)
            .field("languages", &self.get_available_languages())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

fn cache_key(language: &str, normalized_word: &str) -> CacheKey {
    (language.to_string(), normalized_word.to_string())
}
