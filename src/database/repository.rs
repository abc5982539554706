/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API over the `vocabulary` table,
 * abstracting away the SQL details and providing type-safe access.
 * Every call is its own unit of work; bulk score updates and bulk deletes
 * run inside one transaction and apply all-or-nothing.
 */

use anyhow::Result;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::connection::DatabaseConnection;
use super::models::{Filter, NewEntry, QueryMode, Score, SpecialFilter, VocabularyEntry, EntryPatch};
use crate::category::{classified_types, WordClass};

const SELECT_ENTRY: &str = "SELECT id, type, german, translation, second_translation, example, meaning, score FROM vocabulary";

const DUPLICATES_CLAUSE: &str = "(type, german) IN (SELECT type, german FROM vocabulary GROUP BY type, german HAVING COUNT(*) > 1)";

const NULLS_CLAUSE: &str = "translation IS NULL";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

/// A WHERE clause and its bound values
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// SQL condition, without the `WHERE` keyword
    pub clause: String,
    /// Positional parameters for the clause
    pub values: Vec<Value>,
}

impl Selection {
    fn everything() -> Self {
        Self {
            clause: "1 = 1".to_string(),
            values: Vec::new(),
        }
    }

    fn raw(clause: &str) -> Self {
        Self {
            clause: clause.to_string(),
            values: Vec::new(),
        }
    }

    fn column_in(column: &str, values: Vec<Value>) -> Self {
        Self::membership(column, values, false)
    }

    fn column_not_in(column: &str, values: Vec<Value>) -> Self {
        Self::membership(column, values, true)
    }

    fn membership(column: &str, values: Vec<Value>, negate: bool) -> Self {
        let placeholders = vec!["?"; values.len()].join(", ");
        let op = if negate { "NOT IN" } else { "IN" };
        Self {
            clause: format!("{} {} ({})", column, op, placeholders),
            values,
        }
    }

    /// OR the parts together; an empty list selects everything
    fn any(parts: Vec<Selection>) -> Self {
        if parts.is_empty() {
            return Self::everything();
        }
        let clause = parts
            .iter()
            .map(|p| format!("({})", p.clause))
            .collect::<Vec<_>>()
            .join(" OR ");
        let values = parts.into_iter().flat_map(|p| p.values).collect();
        Self { clause, values }
    }

    /// Build the selection for a query mode; rows and counts share this definition
    pub fn for_mode(mode: &QueryMode) -> Self {
        match mode {
            QueryMode::All => Self::everything(),
            QueryMode::New => Self::column_in("score", scores(&[Score::New])),
            QueryMode::Repeat => Self::column_in("score", scores(&[Score::Repeat, Score::Hard])),
            QueryMode::Learnt => Self::column_in("score", scores(&[Score::Good, Score::Easy])),
            QueryMode::Nouns => Self::for_class(WordClass::Noun),
            QueryMode::Verbs => Self::for_class(WordClass::Verb),
            QueryMode::Adjectives => Self::for_class(WordClass::Adjective),
            QueryMode::Other => Self::for_class(WordClass::Other),
            QueryMode::Duplicates => Self::raw(DUPLICATES_CLAUSE),
            QueryMode::Nulls => Self::raw(NULLS_CLAUSE),
            QueryMode::Filter(filter) => Self::for_filter(filter),
        }
    }

    fn for_class(class: WordClass) -> Self {
        match class {
            WordClass::Other => Self::column_not_in("type", texts(&classified_types())),
            named => Self::column_in("type", texts(named.members())),
        }
    }

    fn for_filter(filter: &Filter) -> Self {
        if filter.is_empty() {
            return Self::everything();
        }
        match filter {
            Filter::Type(values) => Self::column_in(
                "type",
                values.iter().map(|v| Value::Text(v.clone())).collect(),
            ),
            Filter::Score(values) => Self::column_in("score", scores(values)),
            Filter::WordClass(classes) => {
                Self::any(classes.iter().map(|c| Self::for_class(*c)).collect())
            }
            Filter::Special(specials) => Self::any(
                specials
                    .iter()
                    .map(|s| match s {
                        SpecialFilter::Duplicates => Self::raw(DUPLICATES_CLAUSE),
                        SpecialFilter::Nulls => Self::raw(NULLS_CLAUSE),
                    })
                    .collect(),
            ),
        }
    }
}

fn texts(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::Text(v.to_string())).collect()
}

fn scores(values: &[Score]) -> Vec<Value> {
    values.iter().map(|s| Value::Integer(s.value())).collect()
}

fn entry_from_row(row: &Row) -> rusqlite::Result<VocabularyEntry> {
    Ok(VocabularyEntry {
        id: row.get(0)?,
        entry_type: row.get(1)?,
        german: row.get(2)?,
        translation: row.get(3)?,
        second_translation: row.get(4)?,
        example: row.get(5)?,
        meaning: row.get(6)?,
        score: row.get(7)?,
    })
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Insert one record and return its new id
    pub async fn insert(&self, entry: NewEntry) -> Result<i64> {
        self.db
            .execute_async(move |conn| Self::insert_sync(conn, &entry))
            .await
    }

    fn insert_sync(conn: &Connection, entry: &NewEntry) -> Result<i64> {
        conn.execute(
            r#"
            INSERT INTO vocabulary (type, german, translation, second_translation, example, meaning, score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                entry.entry_type,
                entry.german,
                entry.translation,
                entry.second_translation,
                entry.example,
                entry.meaning,
                entry.score,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted '{}' as row {}", entry.german, id);
        Ok(id)
    }

    /// Get a record by id
    pub async fn get(&self, id: i64) -> Result<Option<VocabularyEntry>> {
        self.db
            .execute_async(move |conn| {
                let entry = conn
                    .query_row(&format!("{} WHERE id = ?1", SELECT_ENTRY), [id], entry_from_row)
                    .optional()?;
                Ok(entry)
            })
            .await
    }

    /// Apply a patch to one row; returns the number of rows changed (0 or 1)
    pub async fn update(&self, id: i64, patch: EntryPatch) -> Result<usize> {
        self.db
            .execute_async(move |conn| {
                let assignments = patch.assignments();
                if assignments.is_empty() {
                    return Ok(0);
                }

                let set_clause = assignments
                    .iter()
                    .enumerate()
                    .map(|(i, (column, _))| format!("{} = ?{}", column.name(), i + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE vocabulary SET {} WHERE id = ?{}",
                    set_clause,
                    assignments.len() + 1
                );

                let mut values: Vec<&dyn rusqlite::ToSql> =
                    assignments.iter().map(|(_, v)| v.as_ref() as &dyn rusqlite::ToSql).collect();
                values.push(&id);

                let changed = conn.execute(&sql, values.as_slice())?;
                Ok(changed)
            })
            .await
    }

    /// Set the score of several rows at once; all updates commit or none do
    pub async fn update_scores(&self, updates: Vec<(i64, Score)>) -> Result<usize> {
        if updates.is_empty() {
            return Ok(0);
        }

        self.db
            .transaction_async(move |tx| {
                let mut changed = 0;
                {
                    let mut stmt = tx.prepare("UPDATE vocabulary SET score = ?1 WHERE id = ?2")?;
                    for (id, score) in &updates {
                        changed += stmt.execute(params![score, id])?;
                    }
                }
                Ok(changed)
            })
            .await
    }

    /// Delete rows by id; all deletes commit or none do
    pub async fn delete(&self, ids: Vec<i64>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        self.db
            .transaction_async(move |tx| {
                let mut deleted = 0;
                {
                    let mut stmt = tx.prepare("DELETE FROM vocabulary WHERE id = ?1")?;
                    for id in &ids {
                        deleted += stmt.execute([id])?;
                    }
                }
                Ok(deleted)
            })
            .await
    }

    /// Rows matching the mode, in ascending id order
    pub async fn query(&self, mode: &QueryMode) -> Result<Vec<VocabularyEntry>> {
        let selection = Selection::for_mode(mode);

        self.db
            .execute_async(move |conn| {
                let sql = format!("{} WHERE {} ORDER BY id ASC", SELECT_ENTRY, selection.clause);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(selection.values.iter()), entry_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    /// Number of rows matching the mode
    pub async fn count(&self, mode: &QueryMode) -> Result<i64> {
        let selection = Selection::for_mode(mode);

        self.db
            .execute_async(move |conn| {
                let sql = format!("SELECT COUNT(*) FROM vocabulary WHERE {}", selection.clause);
                let count: i64 =
                    conn.query_row(&sql, params_from_iter(selection.values.iter()), |row| row.get(0))?;
                Ok(count)
            })
            .await
    }
}
