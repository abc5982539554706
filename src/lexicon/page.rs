/*!
 * Extraction of dictionary entries from lexical-reference pages.
 *
 * Pages are streamed once through `lol_html`; element handlers open a new
 * capture buffer for every matched element and text handlers append to the
 * most recent one. Everything is collected first and interpreted afterwards.
 */

use std::cell::RefCell;

use lol_html::{element, text, HtmlRewriter, Settings};
use once_cell::sync::Lazy;
use regex::Regex;

/// Delimiter between joined example sentences and meanings
pub const FIELD_DELIMITER: &str = "; ";

/// Delimiter between translation alternatives
pub const TRANSLATION_DELIMITER: &str = ", ";

/// Translation alternatives kept per language
pub const MAX_TRANSLATIONS: usize = 4;

/// Links to the example-sentence service start with this prefix
pub const EXAMPLE_LINK_PREFIX: &str = "https://www.satzapp.de/?t=";

/// Heading of the meanings section
const MEANINGS_HEADING: &str = "Bedeutungen";

/// Heading prefix that marks a defined entry
const PRESENCE_MARKER: &str = "Definition";

/// Word-class label of a verb entry in the info line
const VERB_LABEL_SELECTOR: &str = r#"section.rBox span.rInf span[title="Verb"]"#;

static LIST_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-e]\.\s*").unwrap()
});

/// One `section.rBox` with its first heading and definition items
#[derive(Debug, Default, Clone)]
struct Section {
    heading: Option<String>,
    headings_seen: usize,
    items: Vec<String>,
}

/// Raw captures of one entry page
#[derive(Debug, Default)]
struct EntryCapture {
    headings: Vec<String>,
    titles: Vec<String>,
    boxes: usize,
    sections: Vec<Section>,
    example_links: Vec<String>,
    verb_labels: Vec<String>,
    /// Span texts of the first `dd[lang]` per requested language
    translations: Vec<(String, Vec<String>)>,
}

/// Structured view of a dictionary entry page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPage {
    /// The page carries the "Definition" heading of a defined entry
    pub has_definition: bool,
    /// The page has the site's regular box layout at all
    pub has_site_layout: bool,
    /// Text of the title block, e.g. `"Haus, das"`
    pub title: Option<String>,
    /// Word-class label of the info line when it names a verb, upper-cased
    pub verb_label: Option<String>,
    /// Translation alternatives per language code, in page order
    pub translations: Vec<(String, Vec<String>)>,
    /// Example sentences, in link order
    pub examples: Vec<String>,
    /// Definition fragments with list markers stripped, in page order
    pub meanings: Vec<String>,
}

fn decode(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    htmlescape::decode_html(&collapsed).unwrap_or(collapsed)
}

/// Language codes end up in a selector; anything else is never looked up
fn is_selector_safe(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// The `t` query parameter of an example-sentence link, URL-decoded
fn example_from_link(href: &str) -> Option<String> {
    let href = htmlescape::decode_html(href).unwrap_or_else(|_| href.to_string());
    let parsed = url::Url::parse(&href).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "t")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn meaning_fragments(item: &str) -> Vec<String> {
    let stripped = LIST_MARKER.replace(item.trim(), "");
    stripped
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse an entry page, looking up translations for the given language codes
pub fn parse_entry_page(html: &str, languages: &[&str]) -> anyhow::Result<EntryPage> {
    let capture = RefCell::new(EntryCapture::default());
    let languages: Vec<String> = languages
        .iter()
        .filter(|code| is_selector_safe(code))
        .map(|code| code.to_string())
        .collect();
    // Number of `dd[lang]` elements seen so far, per language
    let dd_seen: Vec<RefCell<usize>> = languages.iter().map(|_| RefCell::new(0)).collect();

    {
        let mut handlers = vec![
            element!("h1", {
                let capture = &capture;
                move |_| {
                    capture.borrow_mut().headings.push(String::new());
                    Ok(())
                }
            }),
            text!("h1", {
                let capture = &capture;
                move |chunk| {
                    if let Some(last) = capture.borrow_mut().headings.last_mut() {
                        last.push_str(chunk.as_str());
                    }
                    Ok(())
                }
            }),
            element!("div.rCntr.rClear", {
                let capture = &capture;
                move |_| {
                    capture.borrow_mut().titles.push(String::new());
                    Ok(())
                }
            }),
            text!("div.rCntr.rClear", {
                let capture = &capture;
                move |chunk| {
                    if let Some(last) = capture.borrow_mut().titles.last_mut() {
                        last.push_str(chunk.as_str());
                    }
                    Ok(())
                }
            }),
            element!(".rBox", {
                let capture = &capture;
                move |_| {
                    capture.borrow_mut().boxes += 1;
                    Ok(())
                }
            }),
            element!("section.rBox.rBoxWht", {
                let capture = &capture;
                move |_| {
                    capture.borrow_mut().sections.push(Section::default());
                    Ok(())
                }
            }),
            element!("section.rBox.rBoxWht h2", {
                let capture = &capture;
                move |_| {
                    if let Some(section) = capture.borrow_mut().sections.last_mut() {
                        section.headings_seen += 1;
                        if section.headings_seen == 1 {
                            section.heading = Some(String::new());
                        }
                    }
                    Ok(())
                }
            }),
            text!("section.rBox.rBoxWht h2", {
                let capture = &capture;
                move |chunk| {
                    let mut capture = capture.borrow_mut();
                    if let Some(section) = capture.sections.last_mut() {
                        // Only the first heading of a section counts
                        if section.headings_seen == 1 {
                            if let Some(heading) = section.heading.as_mut() {
                                heading.push_str(chunk.as_str());
                            }
                        }
                    }
                    Ok(())
                }
            }),
            element!("section.rBox.rBoxWht dl.wNrn dd", {
                let capture = &capture;
                move |_| {
                    if let Some(section) = capture.borrow_mut().sections.last_mut() {
                        section.items.push(String::new());
                    }
                    Ok(())
                }
            }),
            text!("section.rBox.rBoxWht dl.wNrn dd", {
                let capture = &capture;
                move |chunk| {
                    let mut capture = capture.borrow_mut();
                    if let Some(item) = capture.sections.last_mut().and_then(|s| s.items.last_mut()) {
                        item.push_str(chunk.as_str());
                    }
                    Ok(())
                }
            }),
            element!(VERB_LABEL_SELECTOR, {
                let capture = &capture;
                move |_| {
                    capture.borrow_mut().verb_labels.push(String::new());
                    Ok(())
                }
            }),
            text!(VERB_LABEL_SELECTOR, {
                let capture = &capture;
                move |chunk| {
                    if let Some(last) = capture.borrow_mut().verb_labels.last_mut() {
                        last.push_str(chunk.as_str());
                    }
                    Ok(())
                }
            }),
            element!("a[href]", {
                let capture = &capture;
                move |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if href.starts_with(EXAMPLE_LINK_PREFIX) {
                            capture.borrow_mut().example_links.push(href);
                        }
                    }
                    Ok(())
                }
            }),
        ];

        for (code, seen) in languages.iter().zip(&dd_seen) {
            capture.borrow_mut().translations.push((code.clone(), Vec::new()));
            let dd_selector = format!("dd[lang=\"{}\"]", code);
            let span_selector = format!("{} span", dd_selector);
            let lang = code.clone();
            let text_lang = code.clone();

            // Spans are collected for the first matching definition element only
            handlers.push(element!(&dd_selector, {
                move |_| {
                    *seen.borrow_mut() += 1;
                    Ok(())
                }
            }));
            handlers.push(element!(&span_selector, {
                let capture = &capture;
                move |_| {
                    if *seen.borrow() == 1 {
                        let mut capture = capture.borrow_mut();
                        if let Some((_, spans)) = capture.translations.iter_mut().find(|(c, _)| *c == lang) {
                            spans.push(String::new());
                        }
                    }
                    Ok(())
                }
            }));
            handlers.push(text!(&span_selector, {
                let capture = &capture;
                move |chunk| {
                    if *seen.borrow() == 1 {
                        let mut capture = capture.borrow_mut();
                        if let Some(span) = capture
                            .translations
                            .iter_mut()
                            .find(|(c, _)| *c == text_lang)
                            .and_then(|(_, spans)| spans.last_mut())
                        {
                            span.push_str(chunk.as_str());
                        }
                    }
                    Ok(())
                }
            }));
        }

        let settings = Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        };

        let mut rewriter = HtmlRewriter::new(settings, |_c: &[u8]| {});
        rewriter
            .write(html.as_bytes())
            .map_err(|e| anyhow::anyhow!("HTML parsing error: {}", e))?;
        rewriter
            .end()
            .map_err(|e| anyhow::anyhow!("HTML parsing end error: {}", e))?;
    }

    Ok(EntryPage::from_capture(capture.into_inner()))
}

impl EntryPage {
    fn from_capture(capture: EntryCapture) -> Self {
        let has_definition = capture
            .headings
            .iter()
            .any(|h| decode(h).starts_with(PRESENCE_MARKER));

        let title = capture
            .titles
            .first()
            .map(|t| decode(t))
            .filter(|t| !t.is_empty());

        let verb_label = capture
            .verb_labels
            .first()
            .map(|label| decode(label).to_uppercase())
            .filter(|label| !label.is_empty());

        let translations = capture
            .translations
            .into_iter()
            .map(|(code, spans)| {
                let alternatives = spans
                    .get(1)
                    .map(|span| {
                        decode(span)
                            .split(',')
                            .map(str::trim)
                            .filter(|w| !w.is_empty())
                            .take(MAX_TRANSLATIONS)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                (code, alternatives)
            })
            .collect();

        let examples = capture
            .example_links
            .iter()
            .filter_map(|href| example_from_link(href))
            .collect();

        let meanings = capture
            .sections
            .iter()
            .find(|s| s.heading.as_deref().map(decode).as_deref() == Some(MEANINGS_HEADING))
            .map(|s| {
                s.items
                    .iter()
                    .flat_map(|item| meaning_fragments(&decode(item)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            has_definition,
            has_site_layout: capture.boxes > 0,
            title,
            verb_label,
            translations,
            examples,
            meanings,
        }
    }

    /// Lemma and grammatical tag from the title block.
    ///
    /// The first comma segment is the lemma and the last one is the tag;
    /// a title without a comma carries no tag.
    pub fn lemma_and_tag(&self) -> Option<(String, Option<String>)> {
        let title = self.title.as_deref()?;
        let segments: Vec<&str> = title.split(',').map(str::trim).collect();
        let lemma = segments.first().filter(|s| !s.is_empty())?.to_string();
        let tag = if segments.len() > 1 {
            segments.last().filter(|s| !s.is_empty()).map(|s| s.to_string())
        } else {
            None
        };
        Some((lemma, tag))
    }

    /// Up to four translation alternatives for a language, joined
    pub fn translation(&self, language: &str) -> Option<String> {
        self.translations
            .iter()
            .find(|(code, _)| code == language)
            .map(|(_, alternatives)| alternatives)
            .filter(|alternatives| !alternatives.is_empty())
            .map(|alternatives| alternatives.join(TRANSLATION_DELIMITER))
    }

    /// The first `count` example sentences, joined
    pub fn examples(&self, count: usize) -> Option<String> {
        join_first(&self.examples, count)
    }

    /// The first `count` meaning fragments, joined
    pub fn meanings(&self, count: usize) -> Option<String> {
        join_first(&self.meanings, count)
    }
}

fn join_first(values: &[String], count: usize) -> Option<String> {
    if count == 0 || values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .take(count)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(FIELD_DELIMITER),
    )
}

/// Candidate words from the last paragraph of the last navigation box
pub fn parse_word_list(html: &str) -> anyhow::Result<Vec<String>> {
    // nav -> paragraphs -> link texts
    let navs: RefCell<Vec<Vec<Vec<String>>>> = RefCell::new(Vec::new());

    {
        let settings = Settings {
            element_content_handlers: vec![
                element!("nav.rBox.rBoxWht", {
                    let navs = &navs;
                    move |_| {
                        navs.borrow_mut().push(Vec::new());
                        Ok(())
                    }
                }),
                element!("nav.rBox.rBoxWht p", {
                    let navs = &navs;
                    move |_| {
                        if let Some(nav) = navs.borrow_mut().last_mut() {
                            nav.push(Vec::new());
                        }
                        Ok(())
                    }
                }),
                element!("nav.rBox.rBoxWht p a", {
                    let navs = &navs;
                    move |_| {
                        if let Some(p) = navs.borrow_mut().last_mut().and_then(|n| n.last_mut()) {
                            p.push(String::new());
                        }
                        Ok(())
                    }
                }),
                text!("nav.rBox.rBoxWht p a", {
                    let navs = &navs;
                    move |chunk| {
                        if let Some(a) = navs
                            .borrow_mut()
                            .last_mut()
                            .and_then(|n| n.last_mut())
                            .and_then(|p| p.last_mut())
                        {
                            a.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
            ],
            ..Settings::default()
        };

        let mut rewriter = HtmlRewriter::new(settings, |_c: &[u8]| {});
        rewriter
            .write(html.as_bytes())
            .map_err(|e| anyhow::anyhow!("HTML parsing error: {}", e))?;
        rewriter
            .end()
            .map_err(|e| anyhow::anyhow!("HTML parsing end error: {}", e))?;
    }

    let words = navs
        .into_inner()
        .pop()
        .and_then(|mut paragraphs| paragraphs.pop())
        .unwrap_or_default()
        .iter()
        .map(|a| decode(a))
        .filter(|w| !w.is_empty())
        .collect();

    Ok(words)
}
