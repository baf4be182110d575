//! Integration tests for the spell checker: loading, fallback, deduplication
//! and caching behaviour as seen through the public API.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use spellguard::error::{Result, SpellGuardError};
use spellguard::spelling::*;

/// Counts fetches and optionally fails or stalls before answering.
#[derive(Debug)]
struct CountingSource {
    calls: AtomicU32,
    delay: Duration,
    content: Option<String>,
}

impl CountingSource {
    fn serving(content: &str, delay: Duration) -> Self {
        CountingSource {
            calls: AtomicU32::new(0),
            delay,
            content: Some(content.to_string()),
        }
    }

    fn failing() -> Self {
        CountingSource {
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
            content: None,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DictionarySource for CountingSource {
    async fn fetch(&self, language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.content
            .clone()
            .ok_or_else(|| SpellGuardError::source_error(format!("{language} is unavailable")))
    }

    fn locate(&self, language: &str) -> String {
        format!("counting:{language}")
    }
}

fn fast_config() -> SpellCheckConfig {
    SpellCheckConfig::default().with_retry(0, 0)
}

#[tokio::test]
async fn test_missing_dictionary_falls_back() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("{lang}.dic").to_string_lossy().to_string();
    let config = fast_config().with_dictionary_path(template);
    let checker = SpellChecker::new(config).unwrap();

    assert!(assert_ok!(checker.check_word_in("test", "xx-YY").await));
    assert!(!assert_ok!(checker.check_word_in("qwzx", "xx-YY").await));

    let stats = checker.get_dictionary_stats("xx-YY").unwrap();
    assert!(stats.is_fallback);
    assert!(stats.version.starts_with("fallback-"));
    assert_eq!(checker.get_available_languages(), vec!["xx-YY"]);
}

#[tokio::test]
async fn test_loads_hunspell_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("en-GB.dic"),
        "4\ncolour/MS\nFavour/S\n# comment\n\nharbour\n",
    )
    .unwrap();
    let template = dir.path().join("{lang}.dic").to_string_lossy().to_string();
    let config = fast_config()
        .with_default_language("en-GB")
        .with_dictionary_path(template);
    let checker = SpellChecker::new(config).unwrap();

    assert_ok!(checker.initialize().await);
    assert!(checker.is_initialized());
    assert!(checker.check_word("Colour").await.unwrap());
    assert!(checker.check_word("favour").await.unwrap());
    assert!(!checker.check_word("4").await.unwrap());

    let stats = checker.get_dictionary_stats("en-GB").unwrap();
    assert!(!stats.is_fallback);
    assert_eq!(stats.word_count, 3);
    assert_eq!(checker.suggest("colur").await.unwrap(), vec!["colour"]);
}

#[tokio::test]
async fn test_retry_bound() {
    let source = Arc::new(CountingSource::failing());
    let config = SpellCheckConfig::default().with_retry(2, 1);
    let checker = SpellChecker::with_source(config, source.clone()).unwrap();

    // Falls back once every attempt has failed
    assert!(checker.check_word("hello").await.unwrap());
    assert_eq!(source.calls(), 3);
    assert!(checker.get_dictionary_stats("en-US").unwrap().is_fallback);
}

#[tokio::test]
async fn test_fallback_disabled() {
    let source = Arc::new(CountingSource::failing());
    let config = fast_config().with_fallback(false);
    let checker = SpellChecker::with_source(config, source.clone()).unwrap();

    let error = assert_err!(checker.check_word("hello").await);
    assert!(matches!(error, SpellGuardError::DictionaryNotFound(_)));
    assert!(checker.get_available_languages().is_empty());

    let error = assert_err!(checker.initialize().await);
    assert!(matches!(error, SpellGuardError::Initialization { .. }));
    assert!(!checker.is_initialized());
}

#[tokio::test]
async fn test_concurrent_loads_are_deduplicated() {
    let source = Arc::new(CountingSource::serving("hello\nworld\n", Duration::from_millis(50)));
    let checker = SpellChecker::with_source(fast_config(), source.clone()).unwrap();

    let (first, second, third) = tokio::join!(
        checker.check_word_in("hello", "en-US"),
        checker.check_word_in("world", "en-US"),
        checker.suggest_in("helo", "en-US"),
    );

    assert!(first.unwrap());
    assert!(second.unwrap());
    assert_eq!(third.unwrap(), vec!["hello"]);
    assert_eq!(source.calls(), 1);
    assert!(!checker.is_loading("en-US"));
}

#[tokio::test]
async fn test_load_completes_without_waiters() {
    let source = Arc::new(CountingSource::serving("hello\n", Duration::from_millis(20)));
    let checker = SpellChecker::with_source(fast_config(), source.clone()).unwrap();

    let pending = checker.check_word("hello");
    let timed_out = tokio::time::timeout(Duration::from_millis(1), pending).await;
    assert!(timed_out.is_err());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(checker.get_available_languages(), vec!["en-US"]);
    assert!(checker.check_word("hello").await.unwrap());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_repeated_checks_hit_the_cache() {
    let source = Arc::new(CountingSource::serving("test\n", Duration::ZERO));
    let checker = SpellChecker::with_source(fast_config(), source).unwrap();

    for _ in 0..5 {
        assert!(checker.check_word("test").await.unwrap());
        assert!(!checker.check_word("tset").await.unwrap());
    }

    let stats = checker.get_dictionary_stats("en-US").unwrap();
    assert_eq!(stats.lookups, 2);

    let cache = checker.cache_stats();
    assert_eq!(cache.misses, 2);
    assert_eq!(cache.hits, 8);
}

#[tokio::test]
async fn test_custom_words_are_idempotent() {
    let source = Arc::new(CountingSource::serving("hello\n", Duration::ZERO));
    let checker = SpellChecker::with_source(fast_config(), source).unwrap();

    let added = checker
        .add_custom_words(["rustacean", "Rustacean", "ferris"], "en-US")
        .await
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(checker.get_dictionary_stats("en-US").unwrap().word_count, 3);
    assert_eq!(checker.custom_words("en-US").unwrap(), vec!["rustacean", "ferris"]);
    assert_eq!(
        checker.dictionary_words("en-US").unwrap(),
        vec!["ferris", "hello", "rustacean"]
    );
}

#[tokio::test]
async fn test_invalid_template_fails_initialization() {
    let config = fast_config().with_dictionary_path("dictionaries/words.dic");
    let checker = SpellChecker::new(config).unwrap();

    let error = assert_err!(checker.initialize().await);
    match error {
        SpellGuardError::Initialization { language, source } => {
            assert_eq!(language, "en-US");
            assert!(matches!(*source, SpellGuardError::InvalidConfig(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!checker.is_initialized());
}

#[tokio::test]
async fn test_cleanup_discards_in_flight_load() {
    let source = Arc::new(CountingSource::serving("hello\n", Duration::from_millis(50)));
    let checker = SpellChecker::with_source(fast_config(), source.clone()).unwrap();

    let background = checker.clone();
    let task = tokio::spawn(async move { background.check_word("hello").await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(checker.is_loading("en-US"));

    checker.cleanup();
    assert!(task.await.unwrap().unwrap());
    assert!(checker.get_available_languages().is_empty());

    // The next call starts a fresh load
    assert!(checker.check_word("hello").await.unwrap());
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_preload_languages() {
    let source = MemorySource::new()
        .with_language("en-US", "hello\n")
        .with_language("fr-FR", "bonjour\n");
    let config = fast_config()
        .with_languages(["en-US", "fr-FR"])
        .with_preload_languages(["fr-FR"]);
    let checker = SpellChecker::with_source(config, Arc::new(source)).unwrap();

    checker.initialize().await.unwrap();
    assert_eq!(checker.get_available_languages(), vec!["en-US", "fr-FR"]);
    assert!(checker.check_word_in("bonjour", "fr-FR").await.unwrap());
    assert!(!checker.check_word_in("bonjour", "en-US").await.unwrap());
}
