/*!
 * Batch translation processing.
 *
 * A batch walks a list of classified words, looks every word up in the
 * lexical source one at a time, and folds per-word failures into the report.
 * At most one batch runs at a time; progress is reported once per row and
 * cancellation is honoured between rows.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::database::models::NewEntry;
use crate::errors::BatchError;
use crate::lexicon::{LexicalEntry, LexicalSource};

/// Languages and extraction counts, fixed for the lifetime of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// ISO 639-1 code of the main translation
    pub main_language: String,
    /// ISO 639-1 code of the second translation, if enabled
    pub second_language: Option<String>,
    /// Example sentences to keep per word
    pub example_count: usize,
    /// Meanings to keep per word
    pub meaning_count: usize,
}

impl BatchOptions {
    /// Main language followed by the second language, if any
    pub fn languages(&self) -> Vec<&str> {
        std::iter::once(self.main_language.as_str())
            .chain(self.second_language.as_deref())
            .collect()
    }

    /// Which optional columns a batch with these options produces
    pub fn output_columns(&self) -> OutputColumns {
        OutputColumns {
            second_translation: self.second_language.is_some(),
            example: self.example_count > 0,
            meaning: self.meaning_count > 0,
        }
    }
}

/// Optional output columns of a batch; `translation` is always present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColumns {
    pub second_translation: bool,
    pub example: bool,
    pub meaning: bool,
}

/// One word moving through a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRow {
    /// Article or part-of-speech tag; `None` until tagged
    pub entry_type: Option<String>,
    /// Word as entered, replaced by the canonical lemma once fetched
    pub german: String,
    pub translation: Option<String>,
    pub second_translation: Option<String>,
    pub example: Option<String>,
    pub meaning: Option<String>,
    /// Reason of the last transient failure; the row can be retried
    pub failure: Option<String>,
    fetched: bool,
}

impl BatchRow {
    /// Create an unfetched row
    pub fn new(entry_type: Option<String>, german: impl Into<String>) -> Self {
        Self {
            entry_type,
            german: german.into(),
            ..Self::default()
        }
    }

    /// Classify raw lines into rows
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Self> {
        super::input::classify(lines)
            .into_iter()
            .map(Self::from)
            .collect()
    }

    /// Whether the lexical source answered for this row
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    fn apply(&mut self, entry: LexicalEntry, columns: OutputColumns) {
        if !entry.lemma.trim().is_empty() {
            self.german = entry.lemma;
        }
        if let Some(tag) = entry.entry_type {
            self.entry_type = Some(tag);
        }

        self.translation = entry.translation;
        self.second_translation = entry.second_translation.filter(|_| columns.second_translation);
        self.example = entry.example.filter(|_| columns.example);
        self.meaning = entry.meaning.filter(|_| columns.meaning);
        self.failure = None;
        self.fetched = true;
    }

    /// Record for the store; validation happens on insert
    pub fn to_new_entry(&self) -> NewEntry {
        NewEntry {
            entry_type: self.entry_type.clone().unwrap_or_default(),
            german: self.german.clone(),
            translation: self.translation.clone(),
            second_translation: self.second_translation.clone(),
            example: self.example.clone(),
            meaning: self.meaning.clone(),
            ..NewEntry::default()
        }
    }
}

impl From<(Option<String>, String)> for BatchRow {
    fn from((entry_type, german): (Option<String>, String)) -> Self {
        Self::new(entry_type, german)
    }
}

/// Outcome of one batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Rows in input order; hard misses are dropped, rows a cancel skipped are kept
    pub rows: Vec<BatchRow>,
    /// Rows the source answered for
    pub success_count: usize,
    /// Words submitted, including any left unprocessed by a cancel
    pub total_word_count: usize,
    /// `word (reason)` for every failed or skipped lookup
    pub failed_words: Vec<String>,
    /// Optional columns decided at batch start
    pub columns: OutputColumns,
    /// False when the batch was cancelled before the last row
    pub completed: bool,
}

impl BatchReport {
    /// A batch succeeds when at least one word was found
    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }

    /// Records to write back; rows that failed transiently are left out
    pub fn entries(&self) -> Vec<NewEntry> {
        self.rows
            .iter()
            .filter(|row| row.is_fetched())
            .map(BatchRow::to_new_entry)
            .collect()
    }

    /// Rows kept after a transient failure, ready for another batch
    pub fn retry_rows(&self) -> Vec<BatchRow> {
        self.rows
            .iter()
            .filter(|row| !row.is_fetched())
            .cloned()
            .collect()
    }
}

/// Clears the running flag when the batch ends, however it ends
struct RunningGuard(Arc<AtomicBool>);

impl RunningGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, BatchError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BatchError::AlreadyRunning)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A batch running on its own task
#[derive(Debug)]
pub struct BatchHandle {
    /// `(done, total)` after every row
    pub progress: mpsc::UnboundedReceiver<(usize, usize)>,
    cancel: CancellationToken,
    task: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Stop before the next row; the row in flight completes
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this batch
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the report
    pub async fn finish(self) -> Result<BatchReport, BatchError> {
        self.task
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))
    }
}

/// Sequential batch translator over a lexical source
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// Dictionary backend
    source: Arc<dyn LexicalSource>,
    /// Set while a batch is in flight
    running: Arc<AtomicBool>,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(source: Arc<dyn LexicalSource>) -> Self {
        Self {
            source,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a batch is in flight
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run a batch on the current task
    ///
    /// # Arguments
    /// * `rows` - Classified and tagged rows
    /// * `options` - Languages and counts, read once
    /// * `cancel` - Checked before every row
    /// * `on_progress` - Called with `(done, total)` once per processed row
    pub async fn run_batch(
        &self,
        rows: Vec<BatchRow>,
        options: BatchOptions,
        cancel: CancellationToken,
        on_progress: impl Fn(usize, usize) + Send + Sync,
    ) -> Result<BatchReport, BatchError> {
        let _guard = RunningGuard::acquire(&self.running)?;
        Ok(process(self.source.as_ref(), rows, &options, &cancel, &on_progress).await)
    }

    /// Run a batch on a new task; fails at once if another batch is running
    pub fn spawn(&self, rows: Vec<BatchRow>, options: BatchOptions) -> Result<BatchHandle, BatchError> {
        let guard = RunningGuard::acquire(&self.running)?;
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let source = Arc::clone(&self.source);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let _guard = guard;
            let report_progress = move |done: usize, total: usize| {
                // The receiver may be gone; progress is best effort
                let _ = progress_tx.send((done, total));
            };
            process(source.as_ref(), rows, &options, &task_cancel, &report_progress).await
        });

        Ok(BatchHandle {
            progress: progress_rx,
            cancel,
            task,
        })
    }
}

async fn process(
    source: &dyn LexicalSource,
    mut rows: Vec<BatchRow>,
    options: &BatchOptions,
    cancel: &CancellationToken,
    on_progress: &(dyn Fn(usize, usize) + Send + Sync),
) -> BatchReport {
    let columns = options.output_columns();
    let total = rows.len();
    let mut hard_misses = vec![false; total];
    let mut failed_words = Vec::new();
    let mut success_count = 0;
    let mut processed = 0;

    info!("Looking up {} words", total);

    for (index, row) in rows.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            info!("Batch cancelled after {} of {} words", processed, total);
            break;
        }

        debug!("Looking up '{}' ({}/{})", row.german, index + 1, total);
        let result = source
            .fetch(&row.german, row.entry_type.as_deref(), options)
            .await;
        on_progress(index + 1, total);
        processed = index + 1;

        match result {
            Ok(entry) => {
                row.apply(entry, columns);
                success_count += 1;
            }
            Err(e) => {
                warn!("{}", e);
                failed_words.push(format!("{} ({})", row.german, e.reason()));
                if e.is_hard_miss() {
                    hard_misses[index] = true;
                } else {
                    row.failure = Some(e.reason());
                }
            }
        }
    }

    for row in rows.iter_mut().skip(processed) {
        failed_words.push(format!("{} (cancelled)", row.german));
        row.failure = Some("cancelled".to_string());
    }

    let rows = rows
        .into_iter()
        .zip(hard_misses)
        .filter_map(|(row, missed)| (!missed).then_some(row))
        .collect();

    info!("Found {} of {} words", success_count, total);

    BatchReport {
        rows,
        success_count,
        total_word_count: total,
        failed_words,
        columns,
        completed: processed == total,
    }
}
