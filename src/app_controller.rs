use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::models::{Filter, QueryMode, RecordDraft, Score, VocabularyEntry};
use crate::database::{DatabaseConnection, Repository};
use crate::lexicon::{self, LexicalEntry, LexicalSource, VerbenClient};
use crate::translation::{
    BatchReport, BatchRow, BatchTranslator, HeuristicTagger, PosTagger, infer_missing_types,
    split_bulk_input,
};
use crate::working_set::{SortColumn, WorkingSet, WriteBackReport};

// @module: Application controller wiring configuration, store and lexical source

/// Result of an `add` run
#[derive(Debug)]
pub struct AddOutcome {
    /// What the lookups produced
    pub batch: BatchReport,
    /// What made it into the store
    pub saved: WriteBackReport,
    /// Wall time of the lookups
    pub elapsed: Duration,
}

/// Main application controller for vocabulary management
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Mirror of the record store
    working_set: WorkingSet,
    // @field: Sequential lookups
    translator: BatchTranslator,
    // @field: Lexical source shared with the translator
    source: Arc<dyn LexicalSource>,
    // @field: Tags rows entered without an article
    tagger: Box<dyn PosTagger>,
}

impl Controller {
    // @method: Create a controller with the store and source named in the configuration
    pub async fn with_config(config: Config) -> Result<Self> {
        let db = match &config.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        let source: Arc<dyn LexicalSource> = Arc::new(VerbenClient::new(config.fetch.clone())?);
        Self::with_parts(config, Repository::new(db), source).await
    }

    /// Create a controller over an explicit store and lexical source
    pub async fn with_parts(
        config: Config,
        repo: Repository,
        source: Arc<dyn LexicalSource>,
    ) -> Result<Self> {
        let working_set = WorkingSet::open(repo)
            .await
            .context("Failed to load the vocabulary")?;

        Ok(Self {
            config,
            working_set,
            translator: BatchTranslator::new(Arc::clone(&source)),
            source,
            tagger: Box::new(HeuristicTagger),
        })
    }

    /// Rows currently held
    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    /// Split, classify, tag and look up pasted words, then save what was found
    pub async fn add_words(&mut self, raw: &str) -> Result<AddOutcome> {
        let lines = split_bulk_input(raw);
        if lines.is_empty() {
            return Err(anyhow!("No words to look up"));
        }

        let mut rows = BatchRow::from_lines(&lines);
        infer_missing_types(&mut rows, self.tagger.as_ref());
        self.add_rows(rows).await
    }

    /// Look up prepared rows with a progress bar, then save what was found
    pub async fn add_rows(&mut self, rows: Vec<BatchRow>) -> Result<AddOutcome> {
        let options = self.config.translation.batch_options();
        let total = rows.len() as u64;
        let start = Instant::now();

        let mut handle = self.translator.spawn(rows, options)?;
        let cancel = handle.cancellation_token();

        let progress_bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        loop {
            tokio::select! {
                update = handle.progress.recv() => match update {
                    Some((done, _total)) => progress_bar.set_position(done as u64),
                    None => break,
                },
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                    progress_bar.println("Stopping after the current word…");
                    cancel.cancel();
                }
            }
        }

        let batch = handle.finish().await?;
        progress_bar.finish_and_clear();
        let elapsed = start.elapsed();

        info!(
            "Looked up {} of {} words in {}",
            batch.success_count,
            batch.total_word_count,
            Self::format_duration(elapsed)
        );
        for failed in &batch.failed_words {
            warn!("Lookup failed: {}", failed);
        }

        let saved = if batch.is_success() {
            self.working_set.add_translated(batch.entries()).await?
        } else {
            debug!("Nothing to save");
            WriteBackReport::default()
        };

        Ok(AddOutcome { batch, saved, elapsed })
    }

    /// Create one record from free-text fields
    pub async fn create(&mut self, draft: RecordDraft) -> Result<i64> {
        Ok(self.working_set.create_from_draft(draft).await?)
    }

    /// Load the rows of a query mode, optionally sorted
    pub async fn list(
        &mut self,
        mode: QueryMode,
        sort: Option<(SortColumn, bool)>,
    ) -> Result<&[VocabularyEntry]> {
        self.working_set.load(mode).await?;
        if let Some((column, ascending)) = sort {
            self.working_set.sort(column, ascending);
        }
        Ok(self.working_set.rows())
    }

    /// Load the rows matching a column filter
    pub async fn filter(&mut self, filter: Filter) -> Result<&[VocabularyEntry]> {
        self.working_set.apply_filter(Some(filter)).await?;
        Ok(self.working_set.rows())
    }

    /// Count the rows of a query mode
    pub async fn count(&self, mode: &QueryMode) -> Result<i64> {
        Ok(self.working_set.count(mode).await?)
    }

    /// Delete rows by id
    pub async fn delete(&mut self, ids: &[i64]) -> Result<usize> {
        Ok(self.working_set.delete_rows(ids).await?)
    }

    /// Edit one row from `column=value` pairs
    pub async fn edit(&mut self, id: i64, fields: Vec<(String, String)>) -> Result<bool> {
        Ok(self.working_set.update_fields(id, fields).await?)
    }

    /// Write several scores at once
    pub async fn score(&mut self, updates: Vec<(i64, Score)>) -> Result<usize> {
        Ok(self.working_set.update_scores(updates).await?)
    }

    /// Look up a random noun from the source's candidate words
    pub async fn word_of_the_day(&self) -> Result<LexicalEntry> {
        let options = self.config.translation.batch_options();
        Ok(lexicon::word_of_the_day(self.source.as_ref(), &options).await?)
    }

    /// Save a looked-up entry under the given type
    pub async fn save_entry(&mut self, entry: &LexicalEntry, fallback_type: &str) -> Result<i64> {
        let mut row = BatchRow::new(
            Some(
                entry
                    .entry_type
                    .clone()
                    .unwrap_or_else(|| fallback_type.to_string()),
            ),
            entry.lemma.clone(),
        );
        row.translation = entry.translation.clone();
        row.second_translation = entry.second_translation.clone();
        row.example = entry.example.clone();
        row.meaning = entry.meaning.clone();

        Ok(self.working_set.create_record(row.to_new_entry()).await?)
    }

    /// Human-readable duration, e.g. `1m 5s` or `2.250s`
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
