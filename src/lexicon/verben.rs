use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use std::time::Duration;

use super::page::{self, EntryPage};
use super::{LexicalEntry, LexicalSource};
use crate::app_config::FetchConfig;
use crate::category::{self, LookupKind};
use crate::errors::FetchError;
use crate::translation::BatchOptions;

/// Client for the verben.de dictionary pages
#[derive(Debug, Clone)]
pub struct VerbenClient {
    /// Endpoints and request policy
    config: FetchConfig,
    /// HTTP client for making requests
    client: Client,
}

impl VerbenClient {
    /// Create a new client from the fetch configuration
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    /// Lookup URL for a word and lookup kind
    pub fn lookup_url(&self, word: &str, kind: LookupKind) -> String {
        let base = match kind {
            LookupKind::Noun => &self.config.noun_url,
            LookupKind::Conjunction => &self.config.conjunction_url,
            LookupKind::General => &self.config.base_url,
        };
        let encoded: String = url::form_urlencoded::byte_serialize(word.trim().as_bytes()).collect();
        format!("{}{}", base, encoded)
    }

    /// GET a page with retry logic; the configured delay follows every successful response
    async fn get_page(&self, word: &str, url: &str, delay_after: Duration) -> Result<String, FetchError> {
        let mut attempt = 0;
        let mut last_error: Option<FetchError> = None;

        while attempt <= self.config.retry_count {
            debug!("GET {} (attempt {}/{})", url, attempt + 1, self.config.retry_count + 1);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                if !delay_after.is_zero() {
                                    tokio::time::sleep(delay_after).await;
                                }
                                return Ok(body);
                            }
                            Err(e) => {
                                last_error = Some(FetchError::Transport {
                                    word: word.to_string(),
                                    message: format!("failed to read response body: {}", e),
                                });
                            }
                        }
                    } else if status.is_server_error() || status.as_u16() == 429 {
                        // Server error - can retry
                        warn!("{} answered {} - attempt {}/{}", url, status, attempt + 1, self.config.retry_count + 1);
                        last_error = Some(FetchError::Status {
                            word: word.to_string(),
                            status: status.as_u16(),
                        });
                    } else {
                        // Client error - don't retry
                        error!("{} answered {}", url, status);
                        return Err(FetchError::Status {
                            word: word.to_string(),
                            status: status.as_u16(),
                        });
                    }
                }
                Err(e) => {
                    let message = if e.is_timeout() {
                        format!("timed out after {}s", self.config.timeout_secs)
                    } else {
                        e.to_string()
                    };
                    warn!("Request for '{}' failed: {} - attempt {}/{}", word, message, attempt + 1, self.config.retry_count + 1);
                    last_error = Some(FetchError::Transport {
                        word: word.to_string(),
                        message,
                    });
                }
            }

            attempt += 1;

            // If we have more retries left, wait with exponential backoff
            if attempt <= self.config.retry_count {
                let backoff_ms = self.config.retry_backoff_ms * (1u64 << (attempt - 1).min(16));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Transport {
            word: word.to_string(),
            message: "no request was made".to_string(),
        }))
    }
}

/// Build the entry from a parsed page, or classify why there is none
pub fn entry_from_page(
    word: &str,
    page: &EntryPage,
    options: &BatchOptions,
) -> Result<LexicalEntry, FetchError> {
    if !page.has_definition {
        // A page in the site's layout without a definition is the site saying "no such word";
        // anything else is a page we do not understand
        return Err(if page.has_site_layout {
            FetchError::NotFound { word: word.to_string() }
        } else {
            FetchError::Parse {
                word: word.to_string(),
                message: "no definition marker".to_string(),
            }
        });
    }

    let (lemma, tag) = page.lemma_and_tag().ok_or_else(|| FetchError::Parse {
        word: word.to_string(),
        message: "missing title block".to_string(),
    })?;

    // Verb titles list conjugated forms after the infinitive, so their tail is no category
    let entry_type = match &page.verb_label {
        Some(label) => {
            debug!("'{}' is a verb, stored as '{}'", word, lemma);
            Some(label.clone())
        }
        None => tag.filter(|t| category::is_category_tag(t)),
    };

    Ok(LexicalEntry {
        lemma,
        entry_type,
        translation: page.translation(&options.main_language),
        second_translation: options
            .second_language
            .as_deref()
            .and_then(|code| page.translation(code)),
        example: page.examples(options.example_count),
        meaning: page.meanings(options.meaning_count),
    })
}

#[async_trait]
impl LexicalSource for VerbenClient {
    async fn fetch(
        &self,
        word: &str,
        hint: Option<&str>,
        options: &BatchOptions,
    ) -> Result<LexicalEntry, FetchError> {
        let kind = LookupKind::for_hint(hint);
        let url = self.lookup_url(word, kind);
        let delay = Duration::from_millis(self.config.request_delay_ms);

        let html = self.get_page(word, &url, delay).await?;

        let page = page::parse_entry_page(&html, &options.languages()).map_err(|e| FetchError::Parse {
            word: word.to_string(),
            message: e.to_string(),
        })?;

        entry_from_page(word, &page, options)
    }

    /// Link texts from the sample declension page
    async fn candidate_words(&self) -> Result<Vec<String>, FetchError> {
        let url = self.config.declension_url.clone();
        let html = self.get_page("word of the day", &url, Duration::ZERO).await?;
        page::parse_word_list(&html).map_err(|e| FetchError::Parse {
            word: "word of the day".to_string(),
            message: e.to_string(),
        })
    }
}
