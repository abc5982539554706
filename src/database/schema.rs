/*!
 * Database schema definitions and migrations.
 *
 * The store holds a single `vocabulary` table. Earlier installations kept the
 * same columns without an explicit id and addressed rows through SQLite's
 * implicit rowid; those tables are migrated in place so existing ids survive.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_VOCABULARY: &str = r#"
    CREATE TABLE IF NOT EXISTS vocabulary (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        german TEXT NOT NULL,
        translation TEXT,
        second_translation TEXT,
        example TEXT,
        meaning TEXT,
        score INTEGER NOT NULL DEFAULT 0 CHECK (score BETWEEN -1 AND 3)
    );

    CREATE INDEX IF NOT EXISTS idx_vocabulary_type ON vocabulary(type);
    CREATE INDEX IF NOT EXISTS idx_vocabulary_type_german ON vocabulary(type, german);
"#;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_version_table(conn)?;
        if has_legacy_table(conn)? {
            info!("Migrating legacy vocabulary table to schema v{}", SCHEMA_VERSION);
            migrate_legacy_table(conn)?;
        } else {
            info!("Initializing database schema v{}", SCHEMA_VERSION);
            conn.execute_batch(CREATE_VOCABULARY)
                .context("Failed to create vocabulary table")?;
        }
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version != SCHEMA_VERSION {
        return Err(anyhow::anyhow!(
            "Unsupported schema version: v{} (expected v{})",
            current_version,
            SCHEMA_VERSION
        ));
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// A `vocabulary` table that exists but has no `id` column
fn has_legacy_table(conn: &Connection) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('vocabulary')")?;
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(!columns.is_empty() && !columns.iter().any(|c| c == "id"))
}

/// Copy legacy rows into the current layout, keeping each row's rowid as its id
fn migrate_legacy_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        BEGIN;
        ALTER TABLE vocabulary RENAME TO vocabulary_legacy;
        "#,
    )?;

    let result = conn
        .execute_batch(CREATE_VOCABULARY)
        .and_then(|_| {
            conn.execute(
                r#"
                INSERT INTO vocabulary (id, type, german, translation, second_translation, example, meaning, score)
                SELECT rowid, type, german, translation, second_translation, example, meaning,
                       CASE WHEN score BETWEEN -1 AND 3 THEN score ELSE 0 END
                FROM vocabulary_legacy
                ORDER BY rowid
                "#,
                [],
            )
        })
        .and_then(|copied| {
            conn.execute_batch("DROP TABLE vocabulary_legacy;")?;
            Ok(copied)
        });

    match result {
        Ok(copied) => {
            conn.execute_batch("COMMIT;")?;
            info!("Migrated {} legacy vocabulary rows", copied);
            Ok(())
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK;")?;
            Err(e).context("Failed to migrate legacy vocabulary table")
        }
    }
}
