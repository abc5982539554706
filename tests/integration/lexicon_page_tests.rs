/*!
 * Dictionary page extraction on fixture pages
 */

use anyhow::Result;
use wortschatz::lexicon::page::{parse_entry_page, parse_word_list};
use wortschatz::lexicon::verben::entry_from_page;

use crate::common;

fn fixture(name: &str) -> Result<String> {
    Ok(std::fs::read_to_string(common::test_resource_path(name))?)
}

/// Test a full verb page with two languages and truncated examples
#[test]
fn test_entryFromPage_verbPage_shouldExtractTruncatedFields() -> Result<()> {
    let html = fixture("verb_laufen.html")?;
    let mut options = common::english_options(2, 1);
    options.second_language = Some("fr".to_string());

    let page = parse_entry_page(&html, &options.languages())?;
    let entry = entry_from_page("lief", &page, &options)?;

    assert_eq!(entry.lemma, "laufen");
    // The info line marks the verb; the title tail is a conjugated form
    assert_eq!(page.verb_label.as_deref(), Some("VERB"));
    assert_eq!(entry.entry_type.as_deref(), Some("VERB"));
    assert_eq!(entry.translation.as_deref(), Some("run, walk, go, work"));
    assert_eq!(entry.second_translation.as_deref(), Some("courir, marcher, aller"));
    assert_eq!(
        entry.example.as_deref(),
        Some("Er läuft schnell.; Die Maschine läuft.")
    );
    assert_eq!(entry.meaning.as_deref(), Some("sich auf den Füßen fortbewegen"));
    Ok(())
}

/// Test that six examples with a count of two keep the first two in page order
#[test]
fn test_examples_sixOnPage_countTwo_shouldKeepFirstTwo() -> Result<()> {
    let page = parse_entry_page(&fixture("verb_laufen.html")?, &["en"])?;

    assert_eq!(page.examples.len(), 6);
    assert_eq!(
        page.examples(2).as_deref(),
        Some("Er läuft schnell.; Die Maschine läuft.")
    );
    assert_eq!(page.examples(0), None);
    Ok(())
}

/// Test that only the first heading of a section names it
#[test]
fn test_meanings_sectionWithTwoHeadings_shouldUseFirst() -> Result<()> {
    let page = parse_entry_page(&fixture("verb_laufen.html")?, &["en"])?;
    assert_eq!(
        page.meanings,
        vec!["sich auf den Füßen fortbewegen", "gehen", "in Betrieb sein"]
    );
    Ok(())
}

/// Test that a page without the definition heading is a hard miss
#[test]
fn test_entryFromPage_notFoundPage_shouldBeHardMiss() -> Result<()> {
    let options = common::english_options(1, 1);
    let page = parse_entry_page(&fixture("not_found.html")?, &options.languages())?;

    let error = entry_from_page("xyzxyzxyz", &page, &options).unwrap_err();
    assert!(error.is_hard_miss());
    assert_eq!(error.word(), "xyzxyzxyz");
    Ok(())
}

/// Test candidate extraction from the declension sample page
#[test]
fn test_parseWordList_declensionSample_shouldDecodeLinkTexts() -> Result<()> {
    let words = parse_word_list(&fixture("declension_sample.html")?)?;
    assert_eq!(words, vec!["Haus", "Tisch", "Mädchen"]);
    Ok(())
}
