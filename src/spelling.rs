//! Spell checking for spellguard.
//!
//! Word lists are loaded per language into [`Dictionary`] values, checked
//! through a cached [`SpellChecker`], and misspellings are answered with
//! edit-distance ranked suggestions.

pub mod checker;
pub mod config;
pub mod dictionary;
pub mod levenshtein;
pub mod loader;
pub mod suggest;

// Re-export commonly used types
pub use checker::*;
pub use config::*;
pub use dictionary::*;
pub use levenshtein::*;
pub use loader::*;
pub use suggest::{
    DEFAULT_MAX_DISTANCE, DEFAULT_MAX_SUGGESTIONS, Suggestion, SuggestionConfig, SuggestionEngine,
};
