/*!
 * Raw input normalization.
 *
 * Pasted word lists are split into lines, then every line is classified into
 * an optional noun article and the word itself.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category;

// Commas, semicolons, tabs and newlines all separate words in a pasted list
static BULK_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,\n;\t]+").unwrap()
});

/// Split pasted text into trimmed, non-empty lines
pub fn split_bulk_input(raw: &str) -> Vec<String> {
    BULK_SEPARATOR
        .split(raw)
        .map(|part| part.trim().replace('\r', ""))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Classify one line into `(article, word)`.
///
/// A leading noun article (any case) is split off and lowercased; runs of
/// whitespace in the remainder collapse to single spaces. A line that is only
/// an article has no remainder and is treated as a plain word.
pub fn classify_line(line: &str) -> (Option<String>, String) {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.split_first() {
        Some((first, rest)) if !rest.is_empty() => match category::as_article(first) {
            Some(article) => (Some(article.to_string()), rest.join(" ")),
            None => (None, tokens.join(" ")),
        },
        _ => (None, tokens.join(" ")),
    }
}

/// Classify every line; empty lines are expected to be filtered out beforehand
pub fn classify<S: AsRef<str>>(lines: &[S]) -> Vec<(Option<String>, String)> {
    lines.iter().map(|line| classify_line(line.as_ref())).collect()
}
