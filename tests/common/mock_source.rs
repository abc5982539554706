/*!
 * Scripted lexical source for testing
 *
 * Answers are set up per word ahead of time so no request ever leaves the
 * test process. Every call is recorded with the hint it was made with.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use wortschatz::errors::FetchError;
use wortschatz::lexicon::{LexicalEntry, LexicalSource};
use wortschatz::translation::BatchOptions;

/// Lexical source with predetermined answers
#[derive(Debug, Default)]
pub struct ScriptedSource {
    /// Answer per word; words without an answer are hard misses
    answers: HashMap<String, Result<LexicalEntry, FetchError>>,
    /// `(word, hint)` of every call, in call order
    calls: Mutex<Vec<(String, Option<String>)>>,
    /// Pause before answering
    delay: Duration,
    /// Token cancelled when the given word is looked up
    cancel_on: Option<(String, CancellationToken)>,
    /// Words offered for the word of the day
    candidates: Vec<String>,
}

impl ScriptedSource {
    /// Create a source that knows no words
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `word` with `entry`
    pub fn with_entry(mut self, word: &str, entry: LexicalEntry) -> Self {
        self.answers.insert(word.to_string(), Ok(entry));
        self
    }

    /// Fail `word` with `error`
    pub fn with_error(mut self, word: &str, error: FetchError) -> Self {
        self.answers.insert(word.to_string(), Err(error));
        self
    }

    /// Wait before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancel `token` while `word` is being looked up
    pub fn cancelling_on(mut self, word: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((word.to_string(), token));
        self
    }

    /// Offer `words` as word-of-the-day candidates
    pub fn with_candidates(mut self, words: &[&str]) -> Self {
        self.candidates = words.iter().map(|w| w.to_string()).collect();
        self
    }

    /// Calls made so far
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LexicalSource for ScriptedSource {
    async fn fetch(
        &self,
        word: &str,
        hint: Option<&str>,
        options: &BatchOptions,
    ) -> Result<LexicalEntry, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((word.to_string(), hint.map(str::to_string)));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some((trigger, token)) = &self.cancel_on {
            if trigger == word {
                token.cancel();
            }
        }

        let mut entry = match self.answers.get(word) {
            Some(answer) => answer.clone()?,
            None => return Err(FetchError::NotFound { word: word.to_string() }),
        };
        // A real source only extracts the second language when one is configured
        if options.second_language.is_none() {
            entry.second_translation = None;
        }
        Ok(entry)
    }

    async fn candidate_words(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.candidates.clone())
    }
}
