/*!
 * Lexical sources for vocabulary lookups.
 *
 * This module contains the interface every dictionary backend implements
 * and the client for the verben.de family of sites:
 * - `page`: HTML extraction of entry and word-list pages
 * - `verben`: HTTP client with per-request timeout, retries and throttling
 */

use async_trait::async_trait;
use log::debug;
use rand::seq::IndexedRandom;
use std::fmt::Debug;

use crate::errors::FetchError;
use crate::translation::BatchOptions;

pub mod page;
pub mod verben;

pub use verben::VerbenClient;

/// Structured record extracted for one looked-up word
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexicalEntry {
    /// Canonical headword (infinitive for verbs)
    pub lemma: String,
    /// Grammatical tag from the title block, when the page carries one
    pub entry_type: Option<String>,
    /// Main-language translation alternatives
    pub translation: Option<String>,
    /// Second-language translation alternatives
    pub second_translation: Option<String>,
    /// Example sentences, already truncated and joined
    pub example: Option<String>,
    /// Meanings, already truncated and joined
    pub meaning: Option<String>,
}

/// Common trait for dictionary backends
///
/// Implementations issue their own requests and apply their own throttling;
/// callers only serialise calls.
#[async_trait]
pub trait LexicalSource: Send + Sync + Debug {
    /// Look a word up
    ///
    /// # Arguments
    /// * `word` - The word as entered or classified
    /// * `hint` - Article or part-of-speech tag used to pick the lookup
    /// * `options` - Languages and example/meaning counts to extract
    ///
    /// # Returns
    /// * `Result<LexicalEntry, FetchError>` - The extracted entry, or a hard miss / transient failure
    async fn fetch(
        &self,
        word: &str,
        hint: Option<&str>,
        options: &BatchOptions,
    ) -> Result<LexicalEntry, FetchError>;

    /// Sample words offered for the word of the day; none by default
    async fn candidate_words(&self) -> Result<Vec<String>, FetchError> {
        Ok(Vec::new())
    }
}

/// Pick a random candidate word and look it up as a noun
pub async fn word_of_the_day(
    source: &dyn LexicalSource,
    options: &BatchOptions,
) -> Result<LexicalEntry, FetchError> {
    let words = source.candidate_words().await?;
    let word = words
        .choose(&mut rand::rng())
        .cloned()
        .ok_or_else(|| FetchError::Parse {
            word: "word of the day".to_string(),
            message: "the source offered no candidate words".to_string(),
        })?;

    debug!("Word of the day candidate: {}", word);
    source.fetch(&word, Some("NOUN"), options).await
}
