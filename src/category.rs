/*!
 * Grammatical categories.
 *
 * A vocabulary entry's `type` is either a German noun article (`der`, `die`,
 * `das`) or a part-of-speech tag as produced by the tagger or the lexical
 * source (`NOUN`, `VERB`, `ADJ`, ...). The bucket lists below are the single
 * definition used by the record store for both row queries and row counts.
 */

/// Noun articles recognised at the start of an input line
pub const ARTICLES: &[&str] = &["der", "die", "das"];

/// Types counted as nouns
pub const NOUN_TYPES: &[&str] = &["NOUN", "PROPN", "der", "die", "das"];

/// Types counted as verbs
pub const VERB_TYPES: &[&str] = &["VERB", "AUX"];

/// Types counted as adjectives (adverbs and adpositions share the bucket)
pub const ADJECTIVE_TYPES: &[&str] = &["ADJ", "ADP", "ADV"];

/// Types looked up through the conjunction endpoint
pub const CONJUNCTION_TYPES: &[&str] = &["CONJ", "CCONJ", "SCONJ"];

/// Types looked up through the noun endpoint; `X` is the tagger's "unknown" and
/// is most often a capitalised noun it could not place
pub const NOUN_LOOKUP_TYPES: &[&str] = &["der", "die", "das", "NOUN", "PROPN", "X"];

/// Word-class buckets offered for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    /// Nouns, proper nouns and article-tagged entries
    Noun,
    /// Verbs and auxiliaries
    Verb,
    /// Adjectives, adverbs and adpositions
    Adjective,
    /// Everything not in the three buckets above
    Other,
}

impl WordClass {
    /// Member types of the bucket; `Other` has none and is defined by exclusion
    pub fn members(self) -> &'static [&'static str] {
        match self {
            WordClass::Noun => NOUN_TYPES,
            WordClass::Verb => VERB_TYPES,
            WordClass::Adjective => ADJECTIVE_TYPES,
            WordClass::Other => &[],
        }
    }

    /// Classify a stored type value
    pub fn of(entry_type: &str) -> Self {
        if NOUN_TYPES.contains(&entry_type) {
            WordClass::Noun
        } else if VERB_TYPES.contains(&entry_type) {
            WordClass::Verb
        } else if ADJECTIVE_TYPES.contains(&entry_type) {
            WordClass::Adjective
        } else {
            WordClass::Other
        }
    }
}

impl std::fmt::Display for WordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WordClass::Noun => write!(f, "noun"),
            WordClass::Verb => write!(f, "verb"),
            WordClass::Adjective => write!(f, "adjective"),
            WordClass::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for WordClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "noun" | "nouns" => Ok(WordClass::Noun),
            "verb" | "verbs" => Ok(WordClass::Verb),
            "adjective" | "adjectives" => Ok(WordClass::Adjective),
            "other" => Ok(WordClass::Other),
            _ => Err(anyhow::anyhow!("Invalid word class: {}", s)),
        }
    }
}

/// Every type that belongs to a named bucket; `Other` is the complement of this list
pub fn classified_types() -> Vec<&'static str> {
    NOUN_TYPES
        .iter()
        .chain(VERB_TYPES)
        .chain(ADJECTIVE_TYPES)
        .copied()
        .collect()
}

/// Which endpoint of the lexical source answers for a category hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// Noun declension pages
    Noun,
    /// Conjunction pages
    Conjunction,
    /// Generic word lookup
    General,
}

impl LookupKind {
    /// Pick the lookup for a hint; a missing hint uses the generic lookup
    pub fn for_hint(hint: Option<&str>) -> Self {
        match hint {
            Some(h) if NOUN_LOOKUP_TYPES.contains(&h) => LookupKind::Noun,
            Some(h) if CONJUNCTION_TYPES.contains(&h) => LookupKind::Conjunction,
            _ => LookupKind::General,
        }
    }
}

/// Return the canonical article if `token` is one, case-insensitively
pub fn as_article(token: &str) -> Option<&'static str> {
    let lower = token.to_lowercase();
    ARTICLES.iter().copied().find(|a| *a == lower)
}

/// An article or an upper-case part-of-speech tag; conjugated forms from a
/// verb title block are neither
pub fn is_category_tag(tag: &str) -> bool {
    ARTICLES.contains(&tag)
        || (!tag.is_empty() && tag.chars().all(|c| c.is_ascii_uppercase()))
}
