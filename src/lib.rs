/*!
 * # wortschatz - German vocabulary builder
 *
 * A Rust library for collecting German words, looking them up in an online
 * dictionary and keeping them in a local, scored vocabulary store.
 *
 * ## Features
 *
 * - Paste word lists; noun articles are recognised, other words are tagged
 * - Look words up on verben.de: lemma, translations in up to two languages,
 *   example sentences and meanings
 * - Sequential, throttled lookups with progress and cancellation
 * - SQLite vocabulary store with stable ids and learning scores
 * - Filtering, counting and sorting of the stored vocabulary
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `category`: Grammatical categories and word-class buckets
 * - `lexicon`: Dictionary lookups:
 *   - `lexicon::page`: HTML extraction of dictionary pages
 *   - `lexicon::verben`: verben.de HTTP client
 * - `translation`: Batch lookups:
 *   - `translation::input`: Bulk input splitting and article classification
 *   - `translation::tagger`: Part-of-speech tagging
 *   - `translation::batch`: Sequential batch processing
 * - `database`: SQLite record store
 * - `working_set`: In-memory view over the store
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod category;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod lexicon;
pub mod translation;
pub mod working_set;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::Repository;
pub use database::models::{NewEntry, QueryMode, Score, VocabularyEntry};
pub use errors::{AppError, BatchError, FetchError, RecordError, StoreError, ValidationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part1};
pub use lexicon::{LexicalEntry, LexicalSource, VerbenClient};
pub use translation::{BatchOptions, BatchReport, BatchRow, BatchTranslator};
pub use working_set::{SortColumn, WorkingSet};
