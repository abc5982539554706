/*!
 * Tests for the working-set manager
 */

use anyhow::Result;
use std::collections::BTreeSet;
use wortschatz::database::models::{EntryPatch, Filter, NewEntry, QueryMode, RecordDraft, Score};
use wortschatz::errors::{RecordError, ValidationError};
use wortschatz::working_set::{SortColumn, SortState, WorkingSet};

use crate::common;

async fn seeded() -> Result<WorkingSet> {
    let mut set = common::open_working_set().await?;
    let rows = [
        NewEntry::new("das", "Haus").with_translation("house").with_score(Score::Good),
        NewEntry::new("der", "Tisch").with_translation("table"),
        NewEntry::new("die", "Lampe").with_score(Score::Easy),
        NewEntry::new("VERB", "laufen").with_translation("run").with_score(Score::Good),
        NewEntry::new("ADJ", "schnell").with_translation("fast").with_score(Score::Repeat),
    ];
    for row in rows {
        set.create_record(row).await?;
    }
    Ok(set)
}

fn ids(set: &WorkingSet) -> BTreeSet<i64> {
    set.rows().iter().map(|r| r.id).collect()
}

/// Test that a created record shows up exactly once with score 0
#[tokio::test]
async fn test_createRecord_thenQueryAll_shouldContainRowOnceWithNewScore() -> Result<()> {
    let mut set = seeded().await?;
    let id = set.create_record(NewEntry::new("der", "Baum")).await?;

    let matches: Vec<_> = set
        .rows()
        .iter()
        .filter(|r| r.entry_type == "der" && r.german == "Baum")
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, id);
    assert_eq!(matches[0].score, Score::New);
    Ok(())
}

/// Test that blank required fields are rejected before the store is touched
#[tokio::test]
async fn test_createRecord_withBlankGerman_shouldFailValidation() -> Result<()> {
    let mut set = seeded().await?;
    let before = set.count(&QueryMode::All).await?;

    for blank in ["", " ", "-"] {
        let result = set.create_record(NewEntry::new("der", blank)).await;
        assert!(matches!(
            result,
            Err(RecordError::Validation(ValidationError::BlankRequiredField("german")))
        ));
    }
    assert_eq!(set.count(&QueryMode::All).await?, before);
    Ok(())
}

/// Test that the free-text form normalises placeholder fields to null
#[tokio::test]
async fn test_createFromDraft_withPlaceholders_shouldStoreNulls() -> Result<()> {
    let mut set = common::open_working_set().await?;
    let id = set
        .create_from_draft(RecordDraft {
            entry_type: "die".to_string(),
            german: "Katze".to_string(),
            translation: "cat".to_string(),
            second_translation: "-".to_string(),
            example: " ".to_string(),
            meaning: String::new(),
            score: Score::New,
        })
        .await?;

    let row = set.get(id).expect("row should be in the working set");
    assert_eq!(row.translation.as_deref(), Some("cat"));
    assert_eq!(row.second_translation, None);
    assert_eq!(row.example, None);
    assert_eq!(row.meaning, None);
    Ok(())
}

/// Test that deleting one row removes it and lowers the count by one
#[tokio::test]
async fn test_deleteRows_singleId_shouldRemoveRowAndDecrementCount() -> Result<()> {
    let mut set = seeded().await?;
    let id = set.rows()[1].id;
    let before = set.count(&QueryMode::All).await?;

    assert_eq!(set.delete_rows(&[id]).await?, 1);

    assert!(set.get(id).is_none());
    assert_eq!(set.count(&QueryMode::All).await?, before - 1);
    Ok(())
}

/// Test that an empty delete does nothing
#[tokio::test]
async fn test_deleteRows_withNoIds_shouldBeNoOp() -> Result<()> {
    let mut set = seeded().await?;
    assert_eq!(set.delete_rows(&[]).await?, 0);
    assert_eq!(set.len(), 5);
    Ok(())
}

/// Test that an update changes only the named field
#[tokio::test]
async fn test_updateRecord_translation_shouldRoundTripAndKeepOtherFields() -> Result<()> {
    let mut set = seeded().await?;
    let original = set.rows()[0].clone();

    assert!(set.update_record(original.id, EntryPatch::translation("X")).await?);

    let local = set.get(original.id).expect("row should be in the working set").clone();
    set.refresh().await?;
    let stored = set.get(original.id).expect("row should be in the store").clone();

    for row in [local, stored] {
        assert_eq!(row.translation.as_deref(), Some("X"));
        assert_eq!(row.entry_type, original.entry_type);
        assert_eq!(row.german, original.german);
        assert_eq!(row.second_translation, original.second_translation);
        assert_eq!(row.example, original.example);
        assert_eq!(row.meaning, original.meaning);
        assert_eq!(row.score, original.score);
    }
    Ok(())
}

/// Test that unknown update keys are dropped and the known ones applied
#[tokio::test]
async fn test_updateFields_withUnknownKey_shouldApplyKnownColumns() -> Result<()> {
    let mut set = seeded().await?;
    let id = set.rows()[0].id;

    let changed = set
        .update_fields(id, [("meaning", "Gebäude"), ("colour", "red")])
        .await?;

    assert!(changed);
    assert_eq!(set.get(id).unwrap().meaning.as_deref(), Some("Gebäude"));
    Ok(())
}

/// Test that updating a missing id reports false instead of failing
#[tokio::test]
async fn test_updateRecord_withMissingId_shouldReturnFalse() -> Result<()> {
    let mut set = seeded().await?;
    assert!(!set.update_record(4242, EntryPatch::translation("X")).await?);
    Ok(())
}

/// Test that re-selecting a column flips the direction and a new column resets it
#[tokio::test]
async fn test_sort_sameColumnTwice_shouldToggleAndNewColumnShouldReset() -> Result<()> {
    let mut set = seeded().await?;

    assert!(set.sort(SortColumn::Score, true).ascending);
    assert_eq!(
        set.sort(SortColumn::Score, true),
        SortState { column: SortColumn::Score, ascending: false }
    );
    assert_eq!(
        set.sort(SortColumn::German, true),
        SortState { column: SortColumn::German, ascending: true }
    );

    let german: Vec<&str> = set.rows().iter().map(|r| r.german.as_str()).collect();
    assert_eq!(german, vec!["Haus", "Lampe", "laufen", "schnell", "Tisch"]);
    Ok(())
}

/// Test that the index column defaults to newest first
#[tokio::test]
async fn test_selectSort_indexColumn_shouldDefaultToDescending() -> Result<()> {
    let mut set = seeded().await?;

    let state = set.select_sort(SortColumn::Index);
    assert!(!state.ascending);
    let ids: Vec<i64> = set.rows().iter().map(|r| r.id).collect();
    let mut expected = ids.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, expected);
    Ok(())
}

/// Test that rows without a value sort last
#[tokio::test]
async fn test_sort_byTranslation_shouldPutMissingValuesLast() -> Result<()> {
    let mut set = seeded().await?;

    set.sort(SortColumn::Translation, true);
    assert_eq!(set.rows().last().unwrap().german, "Lampe");

    set.sort(SortColumn::Translation, true);
    assert_eq!(set.rows().last().unwrap().german, "Lampe");
    Ok(())
}

/// Test that filters are derived from the full store and do not stack
#[tokio::test]
async fn test_applyFilter_typeThenScore_shouldEqualScoreFilterAlone() -> Result<()> {
    let mut set = seeded().await?;

    set.apply_filter(Filter::from_parts("type", &["der", "die", "das"])?).await?;
    assert_eq!(set.len(), 3);
    set.apply_filter(Filter::from_parts("score", &["2", "3"])?).await?;
    let composed = ids(&set);

    let mut direct = seeded().await?;
    direct.apply_filter(Filter::from_parts("score", &["2", "3"])?).await?;

    assert_eq!(composed.len(), 3);
    assert_eq!(composed, ids(&direct));
    assert!(set.rows().iter().all(|r| matches!(r.score, Score::Good | Score::Easy)));
    Ok(())
}

/// Test that an empty filter resets to every row
#[tokio::test]
async fn test_applyFilter_withNoValues_shouldShowEveryRow() -> Result<()> {
    let mut set = seeded().await?;
    set.apply_filter(Filter::from_parts("class", &["verb"])?).await?;
    assert_eq!(set.len(), 1);

    let empty: [&str; 0] = [];
    set.apply_filter(Filter::from_parts("type", &empty)?).await?;
    assert_eq!(set.len(), 5);
    assert!(set.active_filter().is_none());
    Ok(())
}

/// Test that the active sort is re-applied after a filter change
#[tokio::test]
async fn test_applyFilter_afterSort_shouldKeepSortOrder() -> Result<()> {
    let mut set = seeded().await?;
    set.sort(SortColumn::German, false);

    set.apply_filter(Filter::from_parts("class", &["noun", "adjective"])?).await?;

    let german: Vec<&str> = set.rows().iter().map(|r| r.german.as_str()).collect();
    assert_eq!(german, vec!["Tisch", "schnell", "Lampe", "Haus"]);
    Ok(())
}

/// Test that bulk score updates land in the store
#[tokio::test]
async fn test_updateScores_bulk_shouldRefreshWithNewScores() -> Result<()> {
    let mut set = seeded().await?;
    let first = set.rows()[0].id;
    let second = set.rows()[1].id;

    let changed = set
        .update_scores(vec![(first, Score::Repeat), (second, Score::Easy)])
        .await?;

    assert_eq!(changed, 2);
    assert_eq!(set.get(first).unwrap().score, Score::Repeat);
    assert_eq!(set.get(second).unwrap().score, Score::Easy);
    assert_eq!(set.count(&QueryMode::Repeat).await?, 2);
    Ok(())
}
