/*!
 * In-memory working set over the record store.
 *
 * The working set mirrors the rows currently shown to the user. Mutations
 * go through to the store first; creates and deletes rebuild the mirror,
 * single-row edits patch the affected row in place. Filters are always
 * derived from the full store, while sorting only reorders the mirror.
 */

use std::cmp::Ordering;
use std::fmt;

use log::{debug, info, warn};

use crate::database::models::{
    EntryPatch, Filter, NewEntry, QueryMode, RecordDraft, Score, VocabularyEntry,
};
use crate::database::Repository;
use crate::errors::{RecordError, StoreError, ValidationError};

/// Columns the working set can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    /// Store id; newest first by default
    Index,
    Type,
    German,
    Translation,
    SecondTranslation,
    Example,
    Meaning,
    Score,
}

impl SortColumn {
    /// Direction used when the column is first selected
    pub fn default_ascending(self) -> bool {
        !matches!(self, SortColumn::Index)
    }

    fn text<'a>(self, entry: &'a VocabularyEntry) -> Option<&'a str> {
        match self {
            SortColumn::Type => Some(&entry.entry_type),
            SortColumn::German => Some(&entry.german),
            SortColumn::Translation => entry.translation.as_deref(),
            SortColumn::SecondTranslation => entry.second_translation.as_deref(),
            SortColumn::Example => entry.example.as_deref(),
            SortColumn::Meaning => entry.meaning.as_deref(),
            SortColumn::Index | SortColumn::Score => None,
        }
    }

    /// Compare two rows; missing values always sort after present ones
    fn compare(self, a: &VocabularyEntry, b: &VocabularyEntry, ascending: bool) -> Ordering {
        let directed = |o: Ordering| if ascending { o } else { o.reverse() };
        match self {
            SortColumn::Index => directed(a.id.cmp(&b.id)),
            SortColumn::Score => directed(a.score.value().cmp(&b.score.value())),
            text_column => match (text_column.text(a), text_column.text(b)) {
                (Some(x), Some(y)) => directed(x.to_lowercase().cmp(&y.to_lowercase())),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortColumn::Index => "index",
            SortColumn::Type => "type",
            SortColumn::German => "german",
            SortColumn::Translation => "translation",
            SortColumn::SecondTranslation => "second_translation",
            SortColumn::Example => "example",
            SortColumn::Meaning => "meaning",
            SortColumn::Score => "score",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SortColumn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "index" | "id" => Ok(SortColumn::Index),
            "type" => Ok(SortColumn::Type),
            "german" => Ok(SortColumn::German),
            "translation" => Ok(SortColumn::Translation),
            "second_translation" => Ok(SortColumn::SecondTranslation),
            "example" => Ok(SortColumn::Example),
            "meaning" => Ok(SortColumn::Meaning),
            "score" => Ok(SortColumn::Score),
            other => Err(ValidationError::UnknownSortColumn(other.to_string())),
        }
    }
}

/// The sort currently applied to the working set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub ascending: bool,
}

/// Outcome of writing a finished batch into the store
#[derive(Debug, Default)]
pub struct WriteBackReport {
    /// Ids of the inserted rows, in input order
    pub inserted: Vec<i64>,
    /// Headwords that could not be saved, with the reason
    pub failed: Vec<(String, RecordError)>,
}

/// UI-facing mirror of the record store
pub struct WorkingSet {
    repo: Repository,
    rows: Vec<VocabularyEntry>,
    view: QueryMode,
    active_sort: Option<SortState>,
}

impl WorkingSet {
    /// Open a working set holding every stored row
    pub async fn open(repo: Repository) -> Result<Self, RecordError> {
        let mut set = Self {
            repo,
            rows: Vec::new(),
            view: QueryMode::All,
            active_sort: None,
        };
        set.refresh().await?;
        Ok(set)
    }

    /// Rows currently held, in display order
    pub fn rows(&self) -> &[VocabularyEntry] {
        &self.rows
    }

    /// Number of rows currently held
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row is held
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Query the rows were loaded with
    pub fn view(&self) -> &QueryMode {
        &self.view
    }

    /// Active filter, if the view is a filter
    pub fn active_filter(&self) -> Option<&Filter> {
        match &self.view {
            QueryMode::Filter(filter) => Some(filter),
            _ => None,
        }
    }

    /// Active sort, if any
    pub fn active_sort(&self) -> Option<SortState> {
        self.active_sort
    }

    /// Row with the given id, if it is in the working set
    pub fn get(&self, id: i64) -> Option<&VocabularyEntry> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Reload every row from the store and clear any filter
    pub async fn refresh(&mut self) -> Result<(), RecordError> {
        self.load(QueryMode::All).await
    }

    /// Replace the working set with the rows of a store query
    ///
    /// The query always runs against the full store; the last active sort is
    /// re-applied to the result.
    pub async fn load(&mut self, mode: QueryMode) -> Result<(), RecordError> {
        let rows = self.repo.query(&mode).await.map_err(StoreError::from)?;
        debug!("Loaded {} rows for {:?}", rows.len(), mode);
        self.rows = rows;
        self.view = mode;
        self.reapply_sort();
        Ok(())
    }

    /// Filter by column values; `None` or an empty filter shows every row
    pub async fn apply_filter(&mut self, filter: Option<Filter>) -> Result<(), RecordError> {
        match filter {
            Some(filter) if !filter.is_empty() => self.load(QueryMode::Filter(filter)).await,
            _ => self.refresh().await,
        }
    }

    /// Validate and insert a record, then rebuild the working set
    pub async fn create_record(&mut self, entry: NewEntry) -> Result<i64, RecordError> {
        let entry = entry.validated()?;
        let id = self.repo.insert(entry).await.map_err(StoreError::from)?;
        info!("Created record {}", id);
        self.refresh().await?;
        Ok(id)
    }

    /// Create a record from the free-text add form
    pub async fn create_from_draft(&mut self, draft: RecordDraft) -> Result<i64, RecordError> {
        let entry = draft.into_new_entry()?;
        self.create_record(entry).await
    }

    /// Apply a patch to one row and mirror it onto the working set.
    ///
    /// Returns `false` when the id does not exist in the store or the patch is empty.
    pub async fn update_record(&mut self, id: i64, patch: EntryPatch) -> Result<bool, RecordError> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            debug!("Nothing to update for row {}", id);
            return Ok(false);
        }

        let changed = self
            .repo
            .update(id, patch.clone())
            .await
            .map_err(StoreError::from)?;
        if changed == 0 {
            warn!("Update target not found: row {}", id);
            return Ok(false);
        }

        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            patch.apply_to(row);
        }
        Ok(true)
    }

    /// Update from column-name/value pairs; keys that are not columns are dropped
    pub async fn update_fields<K, V, I>(&mut self, id: i64, fields: I) -> Result<bool, RecordError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (patch, unknown) = EntryPatch::from_fields(fields)?;
        if !unknown.is_empty() {
            warn!("Ignoring unknown columns for row {}: {}", id, unknown.join(", "));
        }
        self.update_record(id, patch).await
    }

    /// Remove rows locally, then from the store; an empty list does nothing
    pub async fn delete_rows(&mut self, ids: &[i64]) -> Result<usize, RecordError> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.rows.retain(|r| !ids.contains(&r.id));
        let deleted = match self.repo.delete(ids.to_vec()).await {
            Ok(deleted) => deleted,
            Err(e) => {
                // The rows removed above are still in the store
                if let Err(refresh_error) = self.refresh().await {
                    warn!("Failed to reload rows after a failed delete: {}", refresh_error);
                }
                return Err(StoreError::from(e).into());
            }
        };
        info!("Deleted {} of {} requested rows", deleted, ids.len());

        self.refresh().await?;
        Ok(deleted)
    }

    /// Sort with an explicit direction; re-selecting the active column flips its direction
    pub fn sort(&mut self, column: SortColumn, ascending: bool) -> SortState {
        let state = match self.active_sort {
            Some(active) if active.column == column => SortState {
                column,
                ascending: !active.ascending,
            },
            _ => SortState { column, ascending },
        };
        self.active_sort = Some(state);
        self.reapply_sort();
        state
    }

    /// Sort as a column-header click does: flip if active, else the column's default direction
    pub fn select_sort(&mut self, column: SortColumn) -> SortState {
        self.sort(column, column.default_ascending())
    }

    fn reapply_sort(&mut self) {
        if let Some(SortState { column, ascending }) = self.active_sort {
            self.rows.sort_by(|a, b| column.compare(a, b, ascending));
        }
    }

    /// Write several scores at once, then rebuild the working set
    pub async fn update_scores(&mut self, updates: Vec<(i64, Score)>) -> Result<usize, RecordError> {
        if updates.is_empty() {
            return Ok(0);
        }

        let changed = self
            .repo
            .update_scores(updates)
            .await
            .map_err(StoreError::from)?;
        self.refresh().await?;
        Ok(changed)
    }

    /// Insert finished batch rows one at a time; one failure does not stop the rest
    pub async fn add_translated(&mut self, entries: Vec<NewEntry>) -> Result<WriteBackReport, RecordError> {
        let mut report = WriteBackReport::default();

        for entry in entries {
            let german = entry.german.clone();
            let inserted = match entry.validated() {
                Ok(entry) => self
                    .repo
                    .insert(entry)
                    .await
                    .map_err(|e| RecordError::Store(StoreError::from(e))),
                Err(e) => Err(RecordError::Validation(e)),
            };

            match inserted {
                Ok(id) => report.inserted.push(id),
                Err(e) => {
                    warn!("Could not save '{}': {}", german, e);
                    report.failed.push((german, e));
                }
            }
        }

        self.refresh().await?;
        Ok(report)
    }

    /// Count rows in the store for a query mode
    pub async fn count(&self, mode: &QueryMode) -> Result<i64, RecordError> {
        Ok(self.repo.count(mode).await.map_err(StoreError::from)?)
    }
}
