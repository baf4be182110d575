//! Dictionary loading with bounded retries.
//!
//! A [`DictionarySource`] turns a language code into raw word-list text; the
//! [`DictionaryLoader`] retries the source according to a [`RetryPolicy`] and
//! parses the text into a [`Dictionary`]. Falling back to the built-in list is
//! left to the caller.
//!
//! Word-list format, one entry per line:
//!
//! ```text
//! 3
//! # comment lines and blank lines are ignored
//! hello/MS
//! world
//! Rust/M
//! ```
//!
//! The text before the first `/` is the word (the rest are affix flags). In
//! [`WordListFormat::Hunspell`] lists a purely numeric first line is the
//! word-count header and is skipped; plain lists keep it as a word.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use rand::Rng;
use regex::Regex;

use crate::error::{Result, SpellGuardError};
use crate::spelling::dictionary::{Dictionary, LOADED_VERSION};

/// Placeholder substituted with the language code in path templates.
pub const LANGUAGE_PLACEHOLDER: &str = "{lang}";

const COMMENT_MARKER: char = '#';
const AFFIX_SEPARATOR: char = '/';

lazy_static! {
    static ref LANGUAGE_CODE: Regex =
        Regex::new(r"^[A-Za-z]{2,8}(?:[-_][A-Za-z0-9]{1,8})*$").expect("valid language regex");
}

/// Check that `language` looks like a language tag (e.g. `en`, `en-US`, `pt_BR`).
pub fn is_valid_language_code(language: &str) -> bool {
    LANGUAGE_CODE.is_match(language)
}

/// Layout of a word list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordListFormat {
    /// One word per line.
    #[default]
    Plain,
    /// Hunspell `.dic`: a word-count header line, then one word per line.
    Hunspell,
}

impl WordListFormat {
    /// Guess the format from a file name: `.dic` files are Hunspell.
    pub fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".dic") {
            WordListFormat::Hunspell
        } else {
            WordListFormat::Plain
        }
    }
}

/// Parse word-list text into lowercase words.
pub fn parse_word_list(content: &str, format: WordListFormat) -> Vec<String> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}').trim())
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .peekable();

    if format == WordListFormat::Hunspell
        && let Some(first) = lines.peek()
        && first.chars().all(|c| c.is_ascii_digit())
    {
        lines.next();
    }

    lines
        .filter_map(|line| {
            let word = line
                .split_once(AFFIX_SEPARATOR)
                .map_or(line, |(word, _flags)| word)
                .trim();
            (!word.is_empty()).then(|| word.to_lowercase())
        })
        .collect()
}

/// Retrieves raw word-list text for a language.
///
/// Sources own the transport (filesystem, network, bundled data). Failures
/// worth retrying should be reported as [`SpellGuardError::Source`] or
/// [`SpellGuardError::Io`]; any other error aborts the load immediately.
#[async_trait]
pub trait DictionarySource: Send + Sync + fmt::Debug {
    /// Fetch the word list for `language`.
    async fn fetch(&self, language: &str) -> Result<String>;

    /// Human-readable location of the word list, for logs.
    fn locate(&self, language: &str) -> String;

    /// Layout of the text returned by `fetch`.
    fn format(&self) -> WordListFormat {
        WordListFormat::Plain
    }
}

/// Reads word lists from files named by a path template such as
/// `dictionaries/{lang}.dic`.
///
/// Templates ending in `.dic` are read as Hunspell lists, so their first line
/// is skipped when it is a word count. Any other extension is a plain list.
#[derive(Debug, Clone)]
pub struct FileSource {
    template: String,
}

impl FileSource {
    /// Create a source from a path template containing `{lang}`.
    pub fn new<S: Into<String>>(template: S) -> Self {
        FileSource {
            template: template.into(),
        }
    }

    /// Resolve the file path for `language`.
    pub fn resolve(&self, language: &str) -> Result<PathBuf> {
        if !self.template.contains(LANGUAGE_PLACEHOLDER) {
            return Err(SpellGuardError::invalid_config(format!(
                "dictionary path template '{}' has no {LANGUAGE_PLACEHOLDER} placeholder",
                self.template
            )));
        }
        if !is_valid_language_code(language) {
            return Err(SpellGuardError::invalid_argument(format!(
                "'{language}' is not a valid language code"
            )));
        }
        Ok(PathBuf::from(
            self.template.replace(LANGUAGE_PLACEHOLDER, language),
        ))
    }
}

#[async_trait]
impl DictionarySource for FileSource {
    async fn fetch(&self, language: &str) -> Result<String> {
        let path = self.resolve(language)?;
        let bytes = tokio::fs::read(&path).await?;
        String::from_utf8(bytes).map_err(|e| {
            SpellGuardError::source_error(format!("{} is not valid UTF-8: {e}", path.display()))
        })
    }

    fn locate(&self, language: &str) -> String {
        self.template.replace(LANGUAGE_PLACEHOLDER, language)
    }

    fn format(&self) -> WordListFormat {
        WordListFormat::from_path(&self.template)
    }
}

/// Serves word lists bundled in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    lists: AHashMap<String, String>,
    format: WordListFormat,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the word-list text for a language.
    pub fn with_language<L: Into<String>, C: Into<String>>(mut self, language: L, content: C) -> Self {
        self.lists.insert(language.into(), content.into());
        self
    }

    /// Set the layout of every bundled list.
    pub fn with_format(mut self, format: WordListFormat) -> Self {
        self.format = format;
        self
    }
}

#[async_trait]
impl DictionarySource for MemorySource {
    async fn fetch(&self, language: &str) -> Result<String> {
        self.lists.get(language).cloned().ok_or_else(|| {
            SpellGuardError::source_error(format!("no bundled word list for '{language}'"))
        })
    }

    fn locate(&self, language: &str) -> String {
        format!("memory:{language}")
    }

    fn format(&self) -> WordListFormat {
        self.format
    }
}

/// How long to wait before a retry.
#[derive(Clone)]
pub enum DelayStrategy {
    /// Same delay before every retry.
    Fixed(Duration),
    /// `initial * multiplier^(retry - 1)`, capped at `max`.
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
    /// Caller-supplied delay for a 1-based retry number.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl DelayStrategy {
    /// Delay before the given 1-based retry.
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            DelayStrategy::Fixed(delay) => *delay,
            DelayStrategy::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = initial.as_secs_f64() * multiplier.powi(exponent);
                if secs.is_finite() && secs < max.as_secs_f64() {
                    Duration::from_secs_f64(secs.max(0.0))
                } else {
                    *max
                }
            }
            DelayStrategy::Custom(f) => f(retry),
        }
    }
}

impl fmt::Debug for DelayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelayStrategy::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            DelayStrategy::Exponential {
                initial,
                multiplier,
                max,
            } => f
                .debug_struct("Exponential")
                .field("initial", initial)
                .field("multiplier", multiplier)
                .field("max", max)
                .finish(),
            DelayStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Bounded retry schedule for dictionary fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay schedule.
    pub strategy: DelayStrategy,
    /// Random spread applied to each delay, as a fraction in `[0, 1]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::fixed(3, Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_retries,
            strategy: DelayStrategy::Fixed(delay),
            jitter: 0.0,
        }
    }

    /// Exponential backoff starting at `initial`, doubling up to `max`.
    pub fn exponential(max_retries: u32, initial: Duration, max: Duration) -> Self {
        RetryPolicy {
            max_retries,
            strategy: DelayStrategy::Exponential {
                initial,
                multiplier: 2.0,
                max,
            },
            jitter: 0.0,
        }
    }

    /// Use a caller-supplied delay function.
    pub fn custom<F>(max_retries: u32, delay: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        RetryPolicy {
            max_retries,
            strategy: DelayStrategy::Custom(Arc::new(delay)),
            jitter: 0.0,
        }
    }

    /// Spread each delay randomly by up to `fraction` in either direction.
    pub fn with_jitter(mut self, fraction: f64) -> Self {
        self.jitter = fraction.clamp(0.0, 1.0);
        self
    }

    /// Initial attempt plus retries.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the given 1-based retry, jitter applied.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.strategy.delay(retry);
        if self.jitter <= 0.0 || base.is_zero() {
            return base;
        }
        let factor = 1.0 + rand::rng().random_range(-self.jitter..=self.jitter);
        Duration::try_from_secs_f64(base.as_secs_f64() * factor.max(0.0)).unwrap_or(Duration::MAX)
    }
}

/// Loads dictionaries from a source, retrying transient failures.
#[derive(Debug, Clone)]
pub struct DictionaryLoader {
    source: Arc<dyn DictionarySource>,
    retry: RetryPolicy,
}

impl DictionaryLoader {
    /// Create a loader.
    pub fn new(source: Arc<dyn DictionarySource>, retry: RetryPolicy) -> Self {
        DictionaryLoader { source, retry }
    }

    /// The retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch and parse the dictionary for `language`.
    ///
    /// Transient failures are retried up to `max_retries` times; once every
    /// attempt has failed a [`SpellGuardError::DictionaryLoad`] naming the
    /// last failure is returned. Non-transient failures are returned at once.
    pub async fn load_dictionary(&self, language: &str) -> Result<Dictionary> {
        let attempts = self.retry.total_attempts();
        let location = self.source.locate(language);
        let mut last_error: Option<SpellGuardError> = None;

        for attempt in 1..=attempts {
            debug!("[loader] fetching '{language}' from {location} (attempt {attempt}/{attempts})");
            match self.source.fetch(language).await {
                Ok(content) => {
                    let words = parse_word_list(&content, self.source.format());
                    if words.is_empty() {
                        warn!("[loader] word list for '{language}' at {location} is empty");
                    }
                    let dictionary = Dictionary::from_words(language, LOADED_VERSION, words);
                    info!(
                        "[loader] loaded {} words for '{language}' from {location}",
                        dictionary.word_count()
                    );
                    return Ok(dictionary);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    warn!("[loader] attempt {attempt}/{attempts} for '{language}' failed: {e}");
                    last_error = Some(e);
                    if attempt < attempts {
                        let delay = self.retry.delay_for(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        Err(SpellGuardError::dictionary_load(language, attempts, reason))
    }
}

/// Build the built-in fallback dictionary for `language`.
pub fn create_fallback_dictionary(language: &str) -> Dictionary {
    Dictionary::fallback(language)
}

/// Closest words in `dictionary` to `word`, best first.
pub fn get_suggestions(
    word: &str,
    dictionary: &Dictionary,
    max_suggestions: usize,
    max_distance: usize,
) -> Vec<String> {
    dictionary
        .suggestions(word, max_suggestions, max_distance)
        .into_iter()
        .map(|suggestion| suggestion.word)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio_test::{assert_err, assert_ok};

    /// Fails a fixed number of times before serving its content.
    #[derive(Debug)]
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        content: String,
    }

    impl FlakySource {
        fn new(failures: u32, content: &str) -> Self {
            FlakySource {
                failures,
                calls: AtomicU32::new(0),
                content: content.to_string(),
            }
        }
    }

    #[async_trait]
    impl DictionarySource for FlakySource {
        async fn fetch(&self, _language: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(SpellGuardError::source_error(format!("failure #{call}")))
            } else {
                Ok(self.content.clone())
            }
        }

        fn locate(&self, language: &str) -> String {
            format!("flaky:{language}")
        }
    }

    #[test]
    fn test_parse_word_list() {
        let content = "# comment\n\nHello/MS\nworld\n  Rust/M  \n/ABC\n#another\n";
        assert_eq!(
            parse_word_list(content, WordListFormat::Plain),
            vec!["hello", "world", "rust"]
        );
    }

    #[test]
    fn test_parse_skips_hunspell_count_header() {
        let content = "3\nhello\nworld\n42\n";
        assert_eq!(
            parse_word_list(content, WordListFormat::Hunspell),
            vec!["hello", "world", "42"]
        );
    }

    #[test]
    fn test_plain_list_keeps_numeric_first_word() {
        let content = "2020\nhello\n";
        assert_eq!(
            parse_word_list(content, WordListFormat::Plain),
            vec!["2020", "hello"]
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(WordListFormat::from_path("dicts/{lang}.dic"), WordListFormat::Hunspell);
        assert_eq!(WordListFormat::from_path("dicts/{lang}.DIC"), WordListFormat::Hunspell);
        assert_eq!(WordListFormat::from_path("dicts/{lang}.txt"), WordListFormat::Plain);
        assert_eq!(FileSource::new("words/{lang}.txt").format(), WordListFormat::Plain);
    }

    #[test]
    fn test_parse_handles_crlf_and_bom() {
        let content = "\u{feff}alpha\r\nbeta/X\r\n";
        assert_eq!(
            parse_word_list(content, WordListFormat::Plain),
            vec!["alpha", "beta"]
        );
    }

    #[test]
    fn test_language_code_validation() {
        assert!(is_valid_language_code("en"));
        assert!(is_valid_language_code("en-US"));
        assert!(is_valid_language_code("pt_BR"));
        assert!(!is_valid_language_code("../etc/passwd"));
        assert!(!is_valid_language_code(""));
    }

    #[test]
    fn test_file_source_resolve() {
        let source = FileSource::new("dicts/{lang}.dic");
        assert_eq!(source.resolve("en-US").unwrap(), PathBuf::from("dicts/en-US.dic"));
        assert!(matches!(
            source.resolve("../x"),
            Err(SpellGuardError::InvalidArgument(_))
        ));

        let bad = FileSource::new("dicts/english.dic");
        assert!(matches!(
            bad.resolve("en"),
            Err(SpellGuardError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_fixed_and_exponential_delays() {
        let fixed = RetryPolicy::fixed(2, Duration::from_millis(100));
        assert_eq!(fixed.total_attempts(), 3);
        assert_eq!(fixed.delay_for(1), Duration::from_millis(100));
        assert_eq!(fixed.delay_for(2), Duration::from_millis(100));

        let backoff = RetryPolicy::exponential(5, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(350));

        let custom = RetryPolicy::custom(1, |retry| Duration::from_millis(retry as u64 * 7));
        assert_eq!(custom.delay_for(3), Duration::from_millis(21));
    }

    #[test]
    fn test_extreme_delays_saturate() {
        let backoff = RetryPolicy::exponential(5, Duration::from_millis(100), Duration::from_secs(30));
        assert_eq!(backoff.delay_for(u32::MAX), Duration::from_secs(30));
        assert_eq!(backoff.delay_for(u32::MAX / 2 + 2), Duration::from_secs(30));

        let huge = RetryPolicy::custom(1, |_| Duration::MAX).with_jitter(0.5);
        for retry in 1..20 {
            assert!(huge.delay_for(retry) > Duration::from_secs(u64::MAX / 4));
        }
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(1000)).with_jitter(0.25);
        for retry in 1..20 {
            let delay = policy.delay_for(retry);
            assert!(delay >= Duration::from_millis(750));
            assert!(delay <= Duration::from_millis(1250));
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("en-US.dic")).unwrap();
        writeln!(file, "2").unwrap();
        writeln!(file, "hello/MS").unwrap();
        writeln!(file, "World").unwrap();
        file.flush().unwrap();

        let source = FileSource::new(format!("{}/{{lang}}.dic", dir.path().display()));
        let loader = DictionaryLoader::new(Arc::new(source), RetryPolicy::fixed(0, Duration::ZERO));
        let dictionary = assert_ok!(loader.load_dictionary("en-US").await);

        assert_eq!(dictionary.word_count(), 2);
        assert_eq!(dictionary.metadata().word_count, 2);
        assert!(dictionary.contains("hello"));
        assert!(dictionary.contains("world"));
        assert!(!dictionary.is_fallback());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.dic"), [0xff, 0xfe, 0x00]).unwrap();

        let source = FileSource::new(format!("{}/{{lang}}.dic", dir.path().display()));
        let loader = DictionaryLoader::new(Arc::new(source), RetryPolicy::fixed(1, Duration::ZERO));

        let error = assert_err!(loader.load_dictionary("en").await);
        match error {
            SpellGuardError::DictionaryLoad { attempts, reason, .. } => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("expected DictionaryLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let source = Arc::new(FlakySource::new(2, "alpha\nbeta\n"));
        let loader = DictionaryLoader::new(source.clone(), RetryPolicy::fixed(3, Duration::from_millis(1)));

        let dictionary = assert_ok!(loader.load_dictionary("en").await);
        assert_eq!(dictionary.word_count(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_bound() {
        let source = Arc::new(FlakySource::new(u32::MAX, ""));
        let loader = DictionaryLoader::new(source.clone(), RetryPolicy::fixed(2, Duration::from_millis(1)));

        let error = assert_err!(loader.load_dictionary("xx-YY").await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        match error {
            SpellGuardError::DictionaryLoad {
                language,
                attempts,
                reason,
            } => {
                assert_eq!(language, "xx-YY");
                assert_eq!(attempts, 3);
                assert!(reason.contains("failure #3"));
            }
            other => panic!("expected DictionaryLoad, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let loader = DictionaryLoader::new(
            Arc::new(FileSource::new("no-placeholder.dic")),
            RetryPolicy::fixed(5, Duration::from_millis(1)),
        );

        let error = assert_err!(loader.load_dictionary("en").await);
        assert!(matches!(error, SpellGuardError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_missing_file_exhausts_retries() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(format!("{}/{{lang}}.dic", dir.path().display()));
        let loader = DictionaryLoader::new(Arc::new(source), RetryPolicy::fixed(1, Duration::ZERO));

        let error = assert_err!(loader.load_dictionary("en").await);
        assert!(matches!(error, SpellGuardError::DictionaryLoad { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new().with_language("en", "1984\none\ntwo\n");
        let loader = DictionaryLoader::new(Arc::new(source), RetryPolicy::fixed(0, Duration::ZERO));

        let dictionary = assert_ok!(loader.load_dictionary("en").await);
        assert!(dictionary.contains("two"));
        assert!(dictionary.contains("1984"));
        assert!(loader.load_dictionary("de").await.is_err());

        let hunspell = MemorySource::new()
            .with_language("en", "2\none\ntwo\n")
            .with_format(WordListFormat::Hunspell);
        let loader = DictionaryLoader::new(Arc::new(hunspell), RetryPolicy::fixed(0, Duration::ZERO));
        let dictionary = assert_ok!(loader.load_dictionary("en").await);
        assert_eq!(dictionary.word_count(), 2);
        assert!(!dictionary.contains("2"));
    }

    #[test]
    fn test_fallback_and_suggestions() {
        let fallback = create_fallback_dictionary("xx-YY");
        assert!(fallback.is_fallback());

        let dictionary = Dictionary::from_words("en", LOADED_VERSION, ["hello", "help", "held", "world"]);
        let suggestions = get_suggestions("helo", &dictionary, 2, 2);
        assert_eq!(suggestions, vec!["held", "hello"]);
    }
}
