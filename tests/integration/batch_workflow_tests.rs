/*!
 * Batch lookups against a scripted lexical source
 */

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use wortschatz::errors::{BatchError, FetchError};
use wortschatz::lexicon::LexicalSource;
use wortschatz::translation::{
    BatchRow, BatchTranslator, HeuristicTagger, infer_missing_types, split_bulk_input,
};

use crate::common::{self, ScriptedSource};

fn tagged_rows(raw: &str) -> Vec<BatchRow> {
    let mut rows = BatchRow::from_lines(&split_bulk_input(raw));
    infer_missing_types(&mut rows, &HeuristicTagger);
    rows
}

/// Test the everyday scenario: three resolvable words, English only
#[tokio::test]
async fn test_runBatch_threeKnownWords_shouldSucceedForAll() -> Result<()> {
    common::init_test_logging();
    let source = Arc::new(common::everyday_source());
    let translator = BatchTranslator::new(source.clone());
    let progress = Mutex::new(Vec::new());

    let report = translator
        .run_batch(
            tagged_rows("Haus\nder Tisch\nlaufen"),
            common::english_options(1, 1),
            CancellationToken::new(),
            |done, total| progress.lock().unwrap().push((done, total)),
        )
        .await?;

    assert!(report.completed);
    assert_eq!(report.success_count, 3);
    assert_eq!(report.total_word_count, 3);
    assert!(report.failed_words.is_empty());
    assert!(!report.columns.second_translation);
    assert_eq!(report.rows.len(), 3);
    assert!(report.rows.iter().all(|r| r.translation.is_some()));
    assert!(report.rows.iter().all(|r| r.second_translation.is_none()));
    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);

    // The hint decides the lookup: tagger output for bare words, the article otherwise
    assert_eq!(
        source.calls(),
        vec![
            ("Haus".to_string(), Some("NOUN".to_string())),
            ("Tisch".to_string(), Some("der".to_string())),
            ("laufen".to_string(), Some("VERB".to_string())),
        ]
    );
    // The canonical article from the source replaces the tagger's guess
    assert_eq!(report.rows[0].entry_type.as_deref(), Some("das"));
    Ok(())
}

/// Test the not-found scenario: the row is dropped and the batch counts as failed
#[tokio::test]
async fn test_runBatch_unknownWord_shouldDropRowAndReportFailure() -> Result<()> {
    let translator = BatchTranslator::new(Arc::new(ScriptedSource::new()));

    let report = translator
        .run_batch(
            tagged_rows("xyzxyzxyz"),
            common::english_options(1, 1),
            CancellationToken::new(),
            |_, _| {},
        )
        .await?;

    assert!(report.completed);
    assert_eq!(report.success_count, 0);
    assert_eq!(report.total_word_count, 1);
    assert!(report.rows.is_empty());
    assert_eq!(report.failed_words.len(), 1);
    assert!(report.failed_words[0].starts_with("xyzxyzxyz ("));
    assert!(!report.is_success());
    Ok(())
}

/// Test that transient failures keep the row for another attempt
#[tokio::test]
async fn test_runBatch_transientFailure_shouldKeepRowForRetry() -> Result<()> {
    let source = common::everyday_source().with_error(
        "Tisch",
        FetchError::Transport {
            word: "Tisch".to_string(),
            message: "timed out after 15s".to_string(),
        },
    );
    let translator = BatchTranslator::new(Arc::new(source));

    let report = translator
        .run_batch(
            tagged_rows("Haus, der Tisch, xyzxyzxyz"),
            common::english_options(1, 0),
            CancellationToken::new(),
            |_, _| {},
        )
        .await?;

    assert_eq!(report.success_count, 1);
    assert_eq!(report.total_word_count, 3);
    // Each failure names its own reason, so misses and outages read differently
    assert_eq!(
        report.failed_words,
        vec![
            "Tisch (request failed: timed out after 15s)".to_string(),
            "xyzxyzxyz (not found in dictionary)".to_string(),
        ]
    );
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.entries().len(), 1);

    let retry = report.retry_rows();
    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].german, "Tisch");
    assert_eq!(retry[0].entry_type.as_deref(), Some("der"));
    assert!(retry[0].failure.as_deref().unwrap().contains("timed out"));

    // Meanings were switched off for this batch
    assert!(report.rows[0].meaning.is_none());
    Ok(())
}

/// Test cooperative cancellation between rows
#[tokio::test]
async fn test_runBatch_cancelledDuringSecondWord_shouldStopAfterIt() -> Result<()> {
    let cancel = CancellationToken::new();
    let source = common::everyday_source().cancelling_on("Tisch", cancel.clone());
    let translator = BatchTranslator::new(Arc::new(source));
    let progress = Mutex::new(Vec::new());

    let report = translator
        .run_batch(
            tagged_rows("Haus\nder Tisch\nlaufen"),
            common::english_options(1, 1),
            cancel,
            |done, total| progress.lock().unwrap().push((done, total)),
        )
        .await?;

    assert!(!report.completed);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.total_word_count, 3);
    assert_eq!(report.rows.len(), 3);
    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3)]);

    // The skipped word stays reported and can be retried
    assert_eq!(report.failed_words, vec!["laufen (cancelled)".to_string()]);
    assert_eq!(report.entries().len(), 2);
    let retry = report.retry_rows();
    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].german, "laufen");
    assert_eq!(retry[0].entry_type.as_deref(), Some("VERB"));
    Ok(())
}

/// Test that a second batch is refused while the first is running
#[tokio::test]
async fn test_spawn_overlapping_shouldRefuseSecondBatch() -> Result<()> {
    let source = common::everyday_source().with_delay(Duration::from_millis(30));
    let translator = BatchTranslator::new(Arc::new(source));

    let first = translator.spawn(tagged_rows("Haus, laufen"), common::english_options(1, 1))?;
    let overlapping = translator
        .run_batch(
            tagged_rows("der Tisch"),
            common::english_options(1, 1),
            CancellationToken::new(),
            |_, _| {},
        )
        .await;
    assert_eq!(overlapping.unwrap_err(), BatchError::AlreadyRunning);

    let report = first.finish().await?;
    assert_eq!(report.success_count, 2);

    let second = translator.spawn(tagged_rows("der Tisch"), common::english_options(1, 1))?;
    assert_eq!(second.finish().await?.success_count, 1);
    Ok(())
}

/// Test that a spawned batch can be cancelled through its handle
#[tokio::test]
async fn test_spawn_cancelledThroughHandle_shouldReportIncomplete() -> Result<()> {
    let source = common::everyday_source().with_delay(Duration::from_millis(20));
    let translator = BatchTranslator::new(Arc::new(source));

    let mut handle = translator.spawn(
        tagged_rows("Haus\nder Tisch\nlaufen"),
        common::english_options(1, 1),
    )?;
    assert_eq!(handle.progress.recv().await, Some((1, 3)));
    handle.cancel();

    let report = handle.finish().await?;
    assert!(!report.completed);
    assert!(report.success_count < 3);
    assert!(!translator.is_running());
    Ok(())
}

/// Test that the scripted source tells hard misses from transient failures
#[test]
fn test_scriptedSource_missAndTransport_shouldClassifyFailures() {
    let source = ScriptedSource::new().with_error(
        "Tisch",
        FetchError::Status {
            word: "Tisch".to_string(),
            status: 503,
        },
    );
    let options = common::english_options(1, 1);

    let miss = tokio_test::block_on(source.fetch("xyzxyzxyz", None, &options)).unwrap_err();
    assert!(miss.is_hard_miss());
    assert_eq!(miss.word(), "xyzxyzxyz");

    let transient = tokio_test::block_on(source.fetch("Tisch", Some("der"), &options)).unwrap_err();
    assert!(!transient.is_hard_miss());
    assert_eq!(source.calls().len(), 2);
}
