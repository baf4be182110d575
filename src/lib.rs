//! # spellguard
//!
//! A spell-checking engine for interactive use.
//!
//! ## Features
//!
//! - Per-language dictionaries, loaded lazily with bounded retries
//! - Built-in fallback word list when a dictionary cannot be loaded
//! - Deduplicated concurrent loads
//! - LRU-cached correctness checks
//! - Edit-distance ranked suggestions

pub mod cache;
pub mod cli;
pub mod error;
pub mod spelling;

pub mod prelude {
    pub use crate::cache::{CacheStats, LruCache};
    pub use crate::error::{Result, SpellGuardError};
    pub use crate::spelling::{
        Dictionary, DictionaryLoader, DictionarySource, DictionaryStats, FileSource, MemorySource,
        RetryPolicy, SpellCheckConfig, SpellCheckOptions, SpellChecker, Suggestion,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
