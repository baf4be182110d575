//! Command line argument parsing for the spellguard CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// spellguard - check words against per-language dictionaries
#[derive(Parser, Debug, Clone)]
#[command(name = "spellguard")]
#[command(about = "Check spelling and suggest corrections from per-language word lists")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SpellGuardArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// JSON configuration file (camelCase keys, e.g. "defaultLanguage")
    #[arg(short, long, value_name = "CONFIG_FILE", env = "SPELLGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Word-list path template; `{lang}` is replaced by the language code
    #[arg(short, long, value_name = "TEMPLATE", env = "SPELLGUARD_DICTIONARY_PATH")]
    pub dictionary_path: Option<String>,

    /// Fail instead of using the built-in word list when a dictionary cannot be loaded
    #[arg(long)]
    pub no_fallback: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SpellGuardArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check whether words are spelled correctly
    Check(CheckArgs),

    /// Suggest corrections for a word
    Suggest(SuggestArgs),

    /// Show dictionary and cache statistics
    Stats(StatsArgs),
}

/// Arguments for checking words
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Words to check
    #[arg(value_name = "WORDS", required = true)]
    pub words: Vec<String>,

    /// Language code (defaults to the configured default language)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Treat the arguments as plain text and split them into words
    #[arg(long)]
    pub text: bool,

    /// Only report misspelled words
    #[arg(long)]
    pub misspelled_only: bool,
}

/// Arguments for suggesting corrections
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Word to correct
    #[arg(value_name = "WORD")]
    pub word: String,

    /// Language code (defaults to the configured default language)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Maximum number of suggestions
    #[arg(short = 'n', long = "max")]
    pub max_suggestions: Option<usize>,

    /// Maximum edit distance
    #[arg(long = "distance")]
    pub max_distance: Option<usize>,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Languages to load before reporting (defaults to the configured ones)
    #[arg(short, long = "language")]
    pub languages: Vec<String>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
