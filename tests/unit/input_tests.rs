/*!
 * Tests for input splitting, classification and tagging
 */

use wortschatz::translation::{
    BatchRow, HeuristicTagger, PosTagger, classify, infer_missing_types, split_bulk_input,
};

/// Test that classification gives the same answer every time
#[test]
fn test_classify_repeated_shouldBeIdempotent() {
    for _ in 0..3 {
        assert_eq!(
            classify(&["der Baum"]),
            vec![(Some("der".to_string()), "Baum".to_string())]
        );
        assert_eq!(classify(&["Baum"]), vec![(None, "Baum".to_string())]);
    }
}

/// Test that a classified word classifies to itself again
#[test]
fn test_classify_ofOwnOutput_shouldBeStable() {
    let (_, word) = classify(&["DAS  Haus"]).remove(0);
    assert_eq!(classify(&[word.as_str()]), vec![(None, "Haus".to_string())]);
}

/// Test the path from pasted text to tagged rows
#[test]
fn test_pastedText_toTaggedRows_shouldTagOnlyMissingTypes() {
    let lines = split_bulk_input("Haus\nder Tisch, laufen;\n\n");
    let mut rows = BatchRow::from_lines(&lines);
    infer_missing_types(&mut rows, &HeuristicTagger);

    let rows: Vec<(Option<&str>, &str)> = rows
        .iter()
        .map(|r| (r.entry_type.as_deref(), r.german.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Some("NOUN"), "Haus"),
            (Some("der"), "Tisch"),
            (Some("VERB"), "laufen"),
        ]
    );
}

/// Test that custom taggers plug into the inference step
#[test]
fn test_inferMissingTypes_withCustomTagger_shouldUseIt() {
    #[derive(Debug)]
    struct Constant;

    impl PosTagger for Constant {
        fn tag(&self, _text: &str) -> String {
            "PROPN".to_string()
        }
    }

    let mut rows = vec![BatchRow::new(None, "Berlin")];
    infer_missing_types(&mut rows, &Constant);
    assert_eq!(rows[0].entry_type.as_deref(), Some("PROPN"));
}
