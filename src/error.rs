//! Error types for the spellguard library.
//!
//! All errors are represented by the [`SpellGuardError`] enum. The enum is
//! `Clone` so that the outcome of a single dictionary load can be handed to
//! every caller waiting on it.
//!
//! # Examples
//!
//! ```
//! use spellguard::error::{SpellGuardError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SpellGuardError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// The main error type for spellguard operations.
#[derive(Error, Debug, Clone)]
pub enum SpellGuardError {
    /// A dictionary could not be fetched or parsed after exhausting all retries.
    #[error("Failed to load dictionary for '{language}' after {attempts} attempt(s): {reason}")]
    DictionaryLoad {
        language: String,
        attempts: u32,
        reason: String,
    },

    /// No dictionary is available for the language and fallback was not permitted.
    #[error("Dictionary not found: {0}")]
    DictionaryNotFound(String),

    /// The word cannot be processed (e.g. empty input to `suggest`).
    #[error("Invalid word: {0}")]
    InvalidWord(String),

    /// Startup could not load a required dictionary, even via fallback.
    #[error("Initialization failed for '{language}': {source}")]
    Initialization {
        language: String,
        #[source]
        source: Box<SpellGuardError>,
    },

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure reported by a dictionary source
    #[error("Source error: {0}")]
    Source(String),

    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),
}

/// Result type alias for operations that may fail with SpellGuardError.
pub type Result<T> = std::result::Result<T, SpellGuardError>;

impl From<io::Error> for SpellGuardError {
    fn from(err: io::Error) -> Self {
        SpellGuardError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for SpellGuardError {
    fn from(err: serde_json::Error) -> Self {
        SpellGuardError::Json(Arc::new(err))
    }
}

impl SpellGuardError {
    /// Create a new dictionary load error.
    pub fn dictionary_load<L: Into<String>, R: Into<String>>(
        language: L,
        attempts: u32,
        reason: R,
    ) -> Self {
        SpellGuardError::DictionaryLoad {
            language: language.into(),
            attempts,
            reason: reason.into(),
        }
    }

    /// Create a new dictionary-not-found error.
    pub fn dictionary_not_found<S: Into<String>>(language: S) -> Self {
        SpellGuardError::DictionaryNotFound(language.into())
    }

    /// Create a new invalid word error.
    pub fn invalid_word<S: Into<String>>(msg: S) -> Self {
        SpellGuardError::InvalidWord(msg.into())
    }

    /// Wrap a startup failure for `language`.
    pub fn initialization<S: Into<String>>(language: S, source: SpellGuardError) -> Self {
        SpellGuardError::Initialization {
            language: language.into(),
            source: Box::new(source),
        }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpellGuardError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SpellGuardError::InvalidConfig(msg.into())
    }

    /// Create a new source error.
    pub fn source_error<S: Into<String>>(msg: S) -> Self {
        SpellGuardError::Source(msg.into())
    }

    /// Whether the failure is source-level and may be absorbed by substituting
    /// the fallback dictionary.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SpellGuardError::DictionaryLoad { .. }
                | SpellGuardError::Source(_)
                | SpellGuardError::Io(_)
        )
    }
}
