// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::{Read, Write};
use std::path::PathBuf;

use wortschatz::app_config::{self, Config};
use wortschatz::app_controller::Controller;
use wortschatz::errors::AppError;
use wortschatz::database::models::{Filter, QueryMode, RecordDraft, Score, VocabularyEntry};
use wortschatz::working_set::SortColumn;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look words up and add them to the vocabulary
    Add {
        /// Words; a leading der/die/das marks a noun
        #[arg(value_name = "WORDS")]
        words: Vec<String>,

        /// Read the word list from a file
        #[arg(short, long, conflicts_with = "stdin")]
        file: Option<PathBuf>,

        /// Read the word list from standard input
        #[arg(long)]
        stdin: bool,
    },

    /// Add one record without looking it up
    New {
        /// Article or part-of-speech tag
        #[arg(long = "type", value_name = "TYPE")]
        entry_type: String,

        /// German headword
        german: String,

        #[arg(long, default_value = "")]
        translation: String,

        #[arg(long, default_value = "")]
        second_translation: String,

        #[arg(long, default_value = "")]
        example: String,

        #[arg(long, default_value = "")]
        meaning: String,

        /// Learning score (-1 to 3, or repeat/new/hard/good/easy)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        score: Score,
    },

    /// Print vocabulary rows
    List {
        /// all, new, repeat, learnt, nouns, verbs, adjectives, other, duplicates, nulls
        #[arg(short, long, default_value = "all")]
        mode: String,

        /// Column filter such as `type=der,die` or `class=verb`; replaces --mode
        #[arg(long, value_name = "COLUMN=VALUES")]
        filter: Option<String>,

        /// Sort column (id, type, german, translation, second_translation, example, meaning, score)
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort", conflicts_with = "asc")]
        desc: bool,

        /// Sort ascending
        #[arg(long, requires = "sort")]
        asc: bool,
    },

    /// Count vocabulary rows
    Count {
        #[arg(short, long, default_value = "all")]
        mode: String,
    },

    /// Delete rows by id
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Change fields of one row
    Edit {
        id: i64,

        /// Field assignment, e.g. `--set translation=house`
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        fields: Vec<String>,
    },

    /// Set learning scores, e.g. `score 3=2 7=-1`
    Score {
        #[arg(value_name = "ID=SCORE", required = true, allow_hyphen_values = true)]
        updates: Vec<String>,
    },

    /// Look up a random noun
    WordOfTheDay {
        /// Add the word to the vocabulary
        #[arg(long)]
        save: bool,
    },

    /// Generate shell completions for wortschatz
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// wortschatz - German vocabulary builder
///
/// Collects German words, looks them up on verben.de and keeps them in a
/// local vocabulary with learning scores.
#[derive(Parser, Debug)]
#[command(name = "wortschatz")]
#[command(version)]
#[command(about = "German vocabulary builder")]
#[command(long_about = "wortschatz looks German words up on verben.de and keeps them in a local vocabulary.

EXAMPLES:
    wortschatz add Haus \"der Tisch\" laufen     # Look up three words and save them
    wortschatz add --file words.txt             # One word per line (or comma separated)
    wortschatz list --mode nouns --sort german  # All nouns, alphabetically
    wortschatz list --filter score=-1,1         # Words to repeat
    wortschatz count --mode learnt
    wortschatz edit 12 --set translation=house
    wortschatz score 12=2 13=-1
    wortschatz completions bash > wortschatz.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "✖"),
            Level::Warn => ("1;33", "!"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "·"),
            Level::Trace => ("1;35", "…"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is let through the logger; the effective level is set through set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "wortschatz", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    config
        .validate()
        .map_err(|e| AppError::Config(format!("Configuration validation failed: {:#}", e)))?;
    log::set_max_level(config.log_level.to_level_filter());

    let mut controller = Controller::with_config(config).await?;
    run_command(&mut controller, cli.command).await
}

async fn run_command(controller: &mut Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Add { words, file, stdin } => {
            let raw = read_word_list(words, file, stdin)?;
            let outcome = controller.add_words(&raw).await?;
            let batch = &outcome.batch;

            println!(
                "{}/{} words found, {} saved in {}",
                batch.success_count,
                batch.total_word_count,
                outcome.saved.inserted.len(),
                Controller::format_duration(outcome.elapsed)
            );
            if !batch.failed_words.is_empty() {
                println!("Failed: {}", batch.failed_words.join(", "));
            }
            for (german, e) in &outcome.saved.failed {
                println!("Not saved: {} ({})", german, e);
            }
            if !batch.completed {
                warn!("Batch was cancelled before the last word");
            }

            if !batch.is_success() {
                return Err(anyhow!(
                    "None of the {} words could be looked up",
                    batch.total_word_count
                ));
            }
        }
        Commands::New {
            entry_type,
            german,
            translation,
            second_translation,
            example,
            meaning,
            score,
        } => {
            let id = controller
                .create(RecordDraft {
                    entry_type,
                    german,
                    translation,
                    second_translation,
                    example,
                    meaning,
                    score,
                })
                .await?;
            println!("Created row {}", id);
        }
        Commands::List {
            mode,
            filter,
            sort,
            desc,
            asc,
        } => {
            let sort = match sort {
                Some(name) => {
                    let column: SortColumn = name.parse()?;
                    let ascending = if desc {
                        false
                    } else if asc {
                        true
                    } else {
                        column.default_ascending()
                    };
                    Some((column, ascending))
                }
                None => None,
            };

            let mode = match filter.as_deref().map(parse_filter).transpose()? {
                Some(Some(filter)) => QueryMode::Filter(filter),
                _ => mode.parse::<QueryMode>()?,
            };

            let rows = controller.list(mode, sort).await?;
            for row in rows {
                println!("{}", format_row(row));
            }
            info!("{} rows", rows.len());
        }
        Commands::Count { mode } => {
            let mode: QueryMode = mode.parse()?;
            println!("{}", controller.count(&mode).await?);
        }
        Commands::Delete { ids } => {
            let deleted = controller.delete(&ids).await?;
            println!("Deleted {} rows", deleted);
        }
        Commands::Edit { id, fields } => {
            let fields = fields
                .iter()
                .map(|f| split_assignment(f).map(|(k, v)| (k.to_string(), v.to_string())))
                .collect::<Result<Vec<_>>>()?;
            if controller.edit(id, fields).await? {
                println!("Updated row {}", id);
            } else {
                println!("Row {} was not changed", id);
            }
        }
        Commands::Score { updates } => {
            let updates = updates
                .iter()
                .map(|u| parse_score_update(u))
                .collect::<Result<Vec<_>>>()?;
            let changed = controller.score(updates).await?;
            println!("Updated {} scores", changed);
        }
        Commands::WordOfTheDay { save } => {
            let entry = controller.word_of_the_day().await?;
            println!(
                "{} ({}): {}",
                entry.lemma,
                entry.entry_type.as_deref().unwrap_or("-"),
                entry.translation.as_deref().unwrap_or("-")
            );
            if let Some(example) = &entry.example {
                println!("  {}", example);
            }
            if let Some(meaning) = &entry.meaning {
                println!("  {}", meaning);
            }
            if save {
                let id = controller.save_entry(&entry, "NOUN").await?;
                println!("Saved as row {}", id);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn read_word_list(words: Vec<String>, file: Option<PathBuf>, stdin: bool) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .map_err(|e| AppError::File(format!("Failed to read word list {:?}: {}", path, e)).into());
    }
    if stdin {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read word list from stdin")?;
        return Ok(raw);
    }
    if words.is_empty() {
        return Err(anyhow!("Give words, --file or --stdin"));
    }
    Ok(words.join("\n"))
}

fn split_assignment(text: &str) -> Result<(&str, &str)> {
    text.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| anyhow!("Expected COLUMN=VALUE, got '{}'", text))
}

fn parse_filter(text: &str) -> Result<Option<Filter>> {
    let (column, values) = split_assignment(text)?;
    let values: Vec<&str> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    Filter::from_parts(column, &values)
}

fn parse_score_update(text: &str) -> Result<(i64, Score)> {
    let (id, score) = split_assignment(text)?;
    let id: i64 = id.parse().with_context(|| format!("Invalid row id: {}", id))?;
    Ok((id, score.parse()?))
}

fn format_row(row: &VocabularyEntry) -> String {
    let cell = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    format!(
        "{:>5}  {:<6} {:<24} {:<30} {:<20} {:>2}  {}  {}",
        row.id,
        row.entry_type,
        row.german,
        cell(&row.translation),
        cell(&row.second_translation),
        row.score,
        cell(&row.example),
        cell(&row.meaning)
    )
}
