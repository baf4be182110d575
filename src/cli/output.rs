//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::cli::args::{OutputFormat, SpellGuardArgs};
use crate::error::Result;
use crate::spelling::{DictionaryStats, Suggestion};

/// Result of checking a single word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCheck {
    pub word: String,
    pub correct: bool,
    pub suggestions: Vec<String>,
}

/// Result structure for the `check` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResults {
    pub language: String,
    pub fallback: bool,
    pub checked: usize,
    pub misspelled: usize,
    pub words: Vec<WordCheck>,
}

/// Result structure for the `suggest` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResults {
    pub language: String,
    pub word: String,
    pub correct: bool,
    pub fallback: bool,
    pub suggestions: Vec<Suggestion>,
}

/// Result structure for the `stats` command.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResults {
    pub dictionaries: Vec<DictionaryStats>,
    pub cache: CacheStats,
}

/// Plain-text rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self, verbosity: u8) -> String;
}

impl HumanOutput for CheckResults {
    fn render_human(&self, verbosity: u8) -> String {
        let mut out = String::new();
        for check in &self.words {
            if check.correct {
                let _ = writeln!(out, "ok       {}", check.word);
            } else if check.suggestions.is_empty() {
                let _ = writeln!(out, "MISSPELT {}", check.word);
            } else {
                let _ = writeln!(
                    out,
                    "MISSPELT {} -> {}",
                    check.word,
                    check.suggestions.join(", ")
                );
            }
        }
        if verbosity > 0 {
            let _ = writeln!(
                out,
                "{} checked, {} misspelled ({})",
                self.checked, self.misspelled, self.language
            );
        }
        if self.fallback {
            let _ = writeln!(
                out,
                "warning: using the built-in fallback word list for '{}'; accuracy is reduced",
                self.language
            );
        }
        out
    }
}

impl HumanOutput for SuggestResults {
    fn render_human(&self, verbosity: u8) -> String {
        let mut out = String::new();
        if self.correct {
            let _ = writeln!(out, "'{}' is spelled correctly", self.word);
        } else if self.suggestions.is_empty() {
            let _ = writeln!(out, "no suggestions for '{}'", self.word);
        } else {
            for suggestion in &self.suggestions {
                if verbosity > 1 {
                    let _ = writeln!(out, "{} (distance {})", suggestion.word, suggestion.distance);
                } else {
                    let _ = writeln!(out, "{}", suggestion.word);
                }
            }
        }
        if self.fallback {
            let _ = writeln!(
                out,
                "warning: using the built-in fallback word list for '{}'; accuracy is reduced",
                self.language
            );
        }
        out
    }
}

impl HumanOutput for StatsResults {
    fn render_human(&self, _verbosity: u8) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Dictionaries:");
        for stats in &self.dictionaries {
            let _ = writeln!(
                out,
                "  {:<10} {:>8} words  version {}{}  loaded {}",
                stats.language,
                stats.word_count,
                stats.version,
                if stats.is_fallback { " (fallback)" } else { "" },
                stats.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }
        let _ = writeln!(
            out,
            "Cache: {}/{} entries, {} hits, {} misses, {} evictions",
            self.cache.size,
            self.cache.capacity,
            self.cache.hits,
            self.cache.misses,
            self.cache.evictions
        );
        out
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(result: &T, args: &SpellGuardArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", result.render_human(args.verbosity()));
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &SpellGuardArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}
