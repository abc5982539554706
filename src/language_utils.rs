use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The lexical source tags its translations with ISO 639-1 codes, so every
/// configured language is normalized to that form before it is used in a
/// lookup. The second language may be switched off with a sentinel.

/// Sentinel for "no second language"
pub const NO_LANGUAGE: &str = "none";

/// Older settings files stored the disabled language as "nn"
const LEGACY_NO_LANGUAGE: &str = "nn";

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// True for the values that mean "no language configured"
pub fn is_no_language(code: &str) -> bool {
    let normalized = code.trim().to_lowercase();
    normalized.is_empty() || normalized == NO_LANGUAGE || normalized == LEGACY_NO_LANGUAGE
}

/// Resolve a language code to an ISO 639-1 code, or `None` for the sentinels
/// and codes without a two-letter form
pub fn optional_language(code: &str) -> Option<String> {
    if is_no_language(code) {
        return None;
    }
    normalize_to_part1(code).ok()
}

fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == normalized)
                .map(|(_, t)| *t)
                .unwrap_or(normalized.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format
pub fn normalize_to_part1(code: &str) -> Result<String> {
    lookup(code)
        .and_then(|lang| lang.to_639_1())
        .map(|c| c.to_string())
        .ok_or_else(|| anyhow!("Language has no two-letter code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}
