use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::translation::BatchOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Languages and per-entry extraction settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Lexical source endpoints and request policy
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Database file; the per-user data directory is used when absent
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// What gets extracted for every looked-up word
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Main translation language code (ISO)
    #[serde(default = "default_main_language")]
    pub main_language: String,

    /// Second translation language code, or "none"
    #[serde(default = "default_second_language")]
    pub second_language: String,

    /// Example sentences kept per entry (0 to 2)
    #[serde(default = "default_entry_count")]
    pub example_count: usize,

    /// Meanings kept per entry (0 to 2)
    #[serde(default = "default_entry_count")]
    pub meaning_count: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            main_language: default_main_language(),
            second_language: default_second_language(),
            example_count: default_entry_count(),
            meaning_count: default_entry_count(),
        }
    }
}

impl TranslationConfig {
    /// Immutable options handed to a batch at start
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            main_language: crate::language_utils::normalize_to_part1(&self.main_language)
                .unwrap_or_else(|_| self.main_language.trim().to_lowercase()),
            second_language: crate::language_utils::optional_language(&self.second_language),
            example_count: self.example_count,
            meaning_count: self.meaning_count,
        }
    }
}

/// Lexical source endpoints and request policy
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetchConfig {
    /// Generic word lookup; the word is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Noun lookup; the word is appended
    #[serde(default = "default_noun_url")]
    pub noun_url: String,

    /// Conjunction lookup; the word is appended
    #[serde(default = "default_conjunction_url")]
    pub conjunction_url: String,

    /// Sample declension page listing candidate words for the word of the day
    #[serde(default = "default_declension_url")]
    pub declension_url: String,

    /// Upper bound for a single request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause after every successful response, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Additional attempts after a transient failure
    #[serde(default)]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            noun_url: default_noun_url(),
            conjunction_url: default_conjunction_url(),
            declension_url: default_declension_url(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Highest example or meaning count the add dialog offers
pub const MAX_ENTRY_COUNT: usize = 2;

fn default_main_language() -> String {
    "en".to_string()
}

fn default_second_language() -> String {
    crate::language_utils::NO_LANGUAGE.to_string()
}

fn default_entry_count() -> usize {
    1
}

fn default_base_url() -> String {
    "https://www.verben.de/?w=".to_string()
}

fn default_noun_url() -> String {
    "https://www.verben.de/substantive/?w=".to_string()
}

fn default_conjunction_url() -> String {
    "https://www.verben.de/konjunktionen/?w=".to_string()
}

fn default_declension_url() -> String {
    "https://www.verbformen.com/declension/nouns/Abend.htm".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_request_delay_ms() -> u64 {
    1000 // one second between successful lookups
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_user_agent() -> String {
    format!("wortschatz/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load the configuration from a JSON file, writing the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {:?}", config_path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            warn!("Config file not found at {:?}, creating default config.", config_path);
            let config = Config::default();
            config.save(config_path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", config_path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _main_name = crate::language_utils::get_language_name(&self.translation.main_language)?;

        if crate::language_utils::optional_language(&self.translation.second_language).is_some() {
            let _second_name =
                crate::language_utils::get_language_name(&self.translation.second_language)?;
            if crate::language_utils::language_codes_match(
                &self.translation.main_language,
                &self.translation.second_language,
            ) {
                warn!("Second language is the same as the main language");
            }
        }

        if self.translation.example_count > MAX_ENTRY_COUNT {
            return Err(anyhow!(
                "example_count must be between 0 and {}, got {}",
                MAX_ENTRY_COUNT,
                self.translation.example_count
            ));
        }

        if self.translation.meaning_count > MAX_ENTRY_COUNT {
            return Err(anyhow!(
                "meaning_count must be between 0 and {}, got {}",
                MAX_ENTRY_COUNT,
                self.translation.meaning_count
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(anyhow!("fetch.timeout_secs must be greater than zero"));
        }

        for (name, url) in [
            ("base_url", &self.fetch.base_url),
            ("noun_url", &self.fetch.noun_url),
            ("conjunction_url", &self.fetch.conjunction_url),
            ("declension_url", &self.fetch.declension_url),
        ] {
            url::Url::parse(url).map_err(|e| anyhow!("fetch.{} is not a valid URL: {}", name, e))?;
        }

        Ok(())
    }
}
