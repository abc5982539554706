/*!
 * Tests for the record store on database files
 */

use anyhow::Result;
use wortschatz::database::models::{EntryPatch, NewEntry, QueryMode, Score};
use wortschatz::database::{DatabaseConnection, Repository};
use wortschatz::errors::StoreError;
use wortschatz::working_set::WorkingSet;

use crate::common;

async fn seed(repo: &Repository) -> Result<Vec<i64>> {
    let rows = [
        NewEntry::new("das", "Haus").with_translation("house"),
        NewEntry::new("der", "Tisch").with_translation("table").with_score(Score::Good),
        NewEntry::new("VERB", "laufen").with_translation("run").with_score(Score::Repeat),
        NewEntry::new("ADJ", "schnell").with_score(Score::Easy),
        NewEntry::new("CCONJ", "und").with_translation("and").with_score(Score::Hard),
        NewEntry::new("der", "Tisch"),
    ];
    let mut ids = Vec::new();
    for row in rows {
        ids.push(repo.insert(row).await?);
    }
    Ok(ids)
}

/// Test that rows survive closing and reopening the database file
#[tokio::test]
async fn test_repository_reopened_shouldSeePersistedRows() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let (repo, path) = common::open_file_repository(&dir)?;
    let ids = seed(&repo).await?;
    drop(repo);

    let reopened = Repository::new(DatabaseConnection::new(&path)?);
    assert_eq!(reopened.count(&QueryMode::All).await?, ids.len() as i64);

    let haus = reopened.get(ids[0]).await?.expect("row should exist");
    assert_eq!(haus.german, "Haus");
    assert_eq!(haus.translation.as_deref(), Some("house"));
    Ok(())
}

/// Test that ids of deleted rows are never handed out again
#[tokio::test]
async fn test_insert_afterDeletingNewestRow_shouldNotReuseId() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let (repo, _path) = common::open_file_repository(&dir)?;
    let ids = seed(&repo).await?;
    let newest = *ids.last().unwrap();

    assert_eq!(repo.delete(vec![newest]).await?, 1);
    let next = repo.insert(NewEntry::new("die", "Lampe")).await?;

    assert!(next > newest);
    Ok(())
}

/// Test that counts agree with materialised queries for every mode
#[tokio::test]
async fn test_count_forEveryMode_shouldMatchQueryLength() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    seed(&repo).await?;

    for name in [
        "all", "new", "repeat", "learnt", "nouns", "verbs", "adjectives", "other",
        "duplicates", "nulls",
    ] {
        let mode: QueryMode = name.parse()?;
        let rows = repo.query(&mode).await?;
        assert_eq!(repo.count(&mode).await?, rows.len() as i64, "mode {}", name);
    }
    Ok(())
}

/// Test that the word-class buckets and "other" partition the store
#[tokio::test]
async fn test_query_wordClassBuckets_shouldPartitionAllRows() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    seed(&repo).await?;

    let mut total = 0;
    for mode in [QueryMode::Nouns, QueryMode::Verbs, QueryMode::Adjectives, QueryMode::Other] {
        total += repo.count(&mode).await?;
    }
    assert_eq!(total, repo.count(&QueryMode::All).await?);

    let other = repo.query(&QueryMode::Other).await?;
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].german, "und");
    Ok(())
}

/// Test that updating a missing id changes nothing
#[tokio::test]
async fn test_update_withMissingId_shouldChangeNothing() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    seed(&repo).await?;

    let changed = repo.update(9999, EntryPatch::translation("nothing")).await?;
    assert_eq!(changed, 0);
    Ok(())
}

/// Test that deleting unknown ids is silently ignored
#[tokio::test]
async fn test_delete_withUnknownIds_shouldIgnoreThem() -> Result<()> {
    let repo = Repository::new_in_memory()?;
    let ids = seed(&repo).await?;

    let deleted = repo.delete(vec![ids[0], 4242, 4243]).await?;
    assert_eq!(deleted, 1);
    assert_eq!(repo.count(&QueryMode::All).await?, ids.len() as i64 - 1);
    Ok(())
}

/// Test that a constraint violation is reported as an integrity error
#[test]
fn test_storeError_fromConstraintViolation_shouldBeIntegrity() -> Result<()> {
    let db = DatabaseConnection::new_in_memory()?;
    let result = db.execute(|conn| {
        conn.execute(
            "INSERT INTO vocabulary (type, german, score) VALUES ('der', 'Tisch', 7)",
            [],
        )?;
        Ok(())
    });

    let error = StoreError::from(result.unwrap_err());
    assert!(matches!(error, StoreError::Integrity(_)), "{:?}", error);
    Ok(())
}

/// Test that a delete the store refuses leaves the working set matching the store
#[tokio::test]
async fn test_deleteRows_storeRefuses_shouldRestoreRows() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let (repo, path) = common::open_file_repository(&dir)?;
    let ids = seed(&repo).await?;
    let mut set = WorkingSet::open(repo).await?;

    let other = rusqlite::Connection::open(&path)?;
    other.execute_batch(
        "CREATE TRIGGER refuse_delete BEFORE DELETE ON vocabulary \
         BEGIN SELECT RAISE(ABORT, 'rows are locked'); END;",
    )?;

    assert!(set.delete_rows(&ids[..2]).await.is_err());
    assert_eq!(set.len(), ids.len());
    assert!(set.get(ids[0]).is_some());
    assert!(set.get(ids[1]).is_some());
    Ok(())
}
