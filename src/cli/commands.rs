//! Command implementations for the spellguard CLI.

use log::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::spelling::{SpellCheckConfig, SpellChecker};

/// Execute a CLI command.
pub async fn execute_command(args: SpellGuardArgs) -> Result<()> {
    match &args.command {
        Command::Check(check_args) => check_words(check_args.clone(), &args).await,
        Command::Suggest(suggest_args) => suggest_word(suggest_args.clone(), &args).await,
        Command::Stats(stats_args) => show_stats(stats_args.clone(), &args).await,
    }
}

/// Resolve the configuration from the config file and global flags.
pub fn build_config(cli_args: &SpellGuardArgs) -> Result<SpellCheckConfig> {
    let mut config = match &cli_args.config {
        Some(path) => {
            debug!("Loading configuration from: {}", path.display());
            SpellCheckConfig::from_json_file(path)?
        }
        None => SpellCheckConfig::default(),
    };

    if let Some(template) = &cli_args.dictionary_path {
        config.dictionary_path = template.clone();
    }
    if cli_args.no_fallback {
        config.allow_fallback = false;
    }
    if let Command::Suggest(suggest_args) = &cli_args.command {
        if let Some(max_suggestions) = suggest_args.max_suggestions {
            config.max_suggestions = max_suggestions;
        }
        if let Some(max_distance) = suggest_args.max_distance {
            config.max_distance = max_distance;
        }
    }

    Ok(config)
}

/// Split command arguments into the words to check.
fn collect_words(args: &CheckArgs) -> Vec<String> {
    if args.text {
        let text = args.words.join(" ");
        text.unicode_words().map(str::to_string).collect()
    } else {
        args.words.clone()
    }
}

/// Check each word and report suggestions for the misspelled ones.
async fn check_words(args: CheckArgs, cli_args: &SpellGuardArgs) -> Result<()> {
    let checker = SpellChecker::new(build_config(cli_args)?)?;
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| checker.config().default_language.clone());

    let words = collect_words(&args);
    info!("Checking {} words in '{language}'", words.len());

    let mut checks = Vec::with_capacity(words.len());
    for word in &words {
        let correct = checker.check_word_in(word, &language).await?;
        let suggestions = if correct || word.trim().is_empty() {
            Vec::new()
        } else {
            checker.suggest_in(word, &language).await?
        };
        checks.push(WordCheck {
            word: word.clone(),
            correct,
            suggestions,
        });
    }

    let misspelled = checks.iter().filter(|c| !c.correct).count();
    if args.misspelled_only {
        checks.retain(|c| !c.correct);
    }

    let fallback = checker
        .get_dictionary_stats(&language)
        .is_some_and(|stats| stats.is_fallback);
    if fallback {
        warn!("Dictionary for '{language}' could not be loaded; using the built-in word list");
    }

    output_result(
        &CheckResults {
            language,
            fallback,
            checked: words.len(),
            misspelled,
            words: checks,
        },
        cli_args,
    )
}

/// Suggest corrections for a single word.
async fn suggest_word(args: SuggestArgs, cli_args: &SpellGuardArgs) -> Result<()> {
    let checker = SpellChecker::new(build_config(cli_args)?)?;
    let language = args
        .language
        .clone()
        .unwrap_or_else(|| checker.config().default_language.clone());

    let correct = checker.check_word_in(&args.word, &language).await?;
    let suggestions = checker.suggest_detailed_in(&args.word, &language).await?;
    let fallback = checker
        .get_dictionary_stats(&language)
        .is_some_and(|stats| stats.is_fallback);

    output_result(
        &SuggestResults {
            language,
            word: args.word,
            correct,
            fallback,
            suggestions,
        },
        cli_args,
    )
}

/// Load the requested dictionaries and report statistics.
async fn show_stats(args: StatsArgs, cli_args: &SpellGuardArgs) -> Result<()> {
    let checker = SpellChecker::new(build_config(cli_args)?)?;

    if args.languages.is_empty() {
        checker.initialize().await?;
    } else {
        for language in &args.languages {
            checker.load_language(language).await?;
        }
    }

    let dictionaries = checker
        .get_available_languages()
        .iter()
        .filter_map(|language| checker.get_dictionary_stats(language))
        .collect();

    output_result(
        &StatsResults {
            dictionaries,
            cache: checker.cache_stats(),
        },
        cli_args,
    )
}
