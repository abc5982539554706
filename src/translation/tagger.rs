/*!
 * Part-of-speech tagging for rows entered without an article.
 */

use std::fmt::Debug;

use log::debug;

use super::batch::BatchRow;

/// Produces one best-guess universal POS tag for a short German string
pub trait PosTagger: Send + Sync + Debug {
    /// Tag of the first token of `text`
    fn tag(&self, text: &str) -> String;
}

const COORDINATING: &[&str] = &["und", "oder", "aber", "denn", "sondern", "doch", "sowie"];

const SUBORDINATING: &[&str] = &[
    "weil", "dass", "ob", "wenn", "als", "obwohl", "damit", "während", "bevor", "nachdem",
    "falls", "seit", "seitdem", "sobald", "solange", "bis", "indem", "sodass",
];

const ADPOSITIONS: &[&str] = &[
    "in", "an", "auf", "mit", "nach", "von", "zu", "bei", "aus", "für", "über", "unter", "vor",
    "hinter", "neben", "zwischen", "durch", "gegen", "ohne", "um", "trotz", "wegen", "seit",
];

const ADVERBS: &[&str] = &[
    "sehr", "hier", "dort", "da", "heute", "gestern", "morgen", "oft", "immer", "nie", "schon",
    "noch", "bald", "gern", "gerne", "leider", "vielleicht", "auch", "nur", "fast",
];

const AUXILIARIES: &[&str] = &[
    "sein", "haben", "werden", "können", "müssen", "dürfen", "sollen", "wollen", "mögen",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "lich", "ig", "isch", "bar", "sam", "haft", "los", "voll", "reich",
];

const VERB_SUFFIXES: &[&str] = &["en", "ern", "eln"];

/// Rule-based tagger using German orthography and closed word classes
///
/// Capitalised words are nouns; closed classes are looked up; otherwise the
/// infinitive and adjective endings decide. Anything left is `X`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicTagger;

impl PosTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> String {
        let Some(token) = text.split_whitespace().next() else {
            return "X".to_string();
        };

        if token.chars().next().is_some_and(char::is_uppercase) {
            return "NOUN".to_string();
        }

        let lower = token.to_lowercase();
        let word = lower.as_str();
        let tag = if COORDINATING.contains(&word) {
            "CCONJ"
        } else if SUBORDINATING.contains(&word) {
            "SCONJ"
        } else if AUXILIARIES.contains(&word) {
            "AUX"
        } else if ADPOSITIONS.contains(&word) {
            "ADP"
        } else if ADVERBS.contains(&word) {
            "ADV"
        } else if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            "ADJ"
        } else if VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            "VERB"
        } else {
            "X"
        };
        tag.to_string()
    }
}

/// Fill the type of every row that has none with the tag of its first token
pub fn infer_missing_types(rows: &mut [BatchRow], tagger: &dyn PosTagger) {
    for row in rows.iter_mut().filter(|r| r.entry_type.is_none()) {
        let tag = tagger.tag(&row.german);
        debug!("Tagged '{}' as {}", row.german, tag);
        row.entry_type = Some(tag);
    }
}
