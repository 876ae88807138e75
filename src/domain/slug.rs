//! Deterministic slug generation for permalinks and heading anchors.
//!
//! Two distinct algorithms live here. Permalink slugs bridge ASCII
//! slugification (`slug` crate) with Chinese transliteration (`pinyin`
//! crate) so inputs like “基础教程” become `ji-chu-jiao-cheng`. Heading
//! anchors use a stricter character-by-character scheme that concatenates
//! pinyin readings with no separator at all; the same anchor algorithm runs
//! in the render pipeline and in the raw-source outline scan, so its exact
//! output is load-bearing for published anchor links and must not change.

use std::collections::HashSet;

use pinyin::ToPinyin;
use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while deriving a permalink slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a permalink slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Suffix `base` with a monotonic counter (`-2`, `-3`, …) until the supplied
/// predicate reports it as unused.
pub fn ensure_unique_slug<F>(base: String, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Produce a permalink slug that does not collide according to the supplied
/// predicate.
///
/// The `is_unique` closure must return `true` when the provided slug does not
/// already exist in the collection being built.
pub fn generate_unique_slug<F>(input: &str, is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    ensure_unique_slug(derive_slug(input)?, is_unique)
}

/// Derive the candidate anchor id for a single heading.
///
/// Inline markup is stripped first (`**`, `*`, backticks, then `[...]` spans
/// whose bracketed text is dropped entirely). The cleaned text is then
/// transliterated character by character: CJK ideographs become their
/// toneless pinyin reading, ASCII letters and digits are lowercased, each
/// whitespace run contributes at most one hyphen, and everything else is
/// dropped without a separator. Consecutive ideograph readings are
/// concatenated directly, so “React最佳实践” yields `reactzuijiashijian`.
/// The result may be empty; uniqueness and fallbacks are the
/// [`AnchorSlugger`]'s job.
pub fn anchor_candidate(text: &str) -> String {
    let cleaned = strip_inline_markup(text);
    let mut out = String::with_capacity(cleaned.len());

    for ch in cleaned.chars() {
        if ('\u{4e00}'..='\u{9fa5}').contains(&ch) {
            if let Some(reading) = ch.to_pinyin() {
                push_reading(&mut out, reading.plain());
            }
        } else if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }
    }

    collapse_hyphens(&out)
}

/// Anchor ids stay ASCII: `ü` uses the conventional `v` substitution and
/// any other non-ASCII letter in a reading is dropped.
fn push_reading(out: &mut String, reading: &str) {
    for ch in reading.chars() {
        match ch {
            'ü' => out.push('v'),
            _ if ch.is_ascii_alphanumeric() => out.push(ch.to_ascii_lowercase()),
            _ => {}
        }
    }
}

fn strip_inline_markup(text: &str) -> String {
    let cleaned = text.replace("**", "").replace('*', "").replace('`', "");
    drop_bracketed_spans(&cleaned)
}

/// Remove every `[...]` span together with its brackets. Empty `[]` pairs
/// and unmatched brackets survive untouched.
fn drop_bracketed_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let (head, tail) = rest.split_at(open);
        out.push_str(head);
        match tail[1..].find(']') {
            Some(close) if close > 0 => rest = &tail[close + 2..],
            _ => {
                out.push('[');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn collapse_hyphens(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches('-').to_string()
}

/// Issues unique heading anchor ids within a single document session.
///
/// Headings processed in order receive monotonic suffixes when duplicates
/// occur (`setup`, `setup-1`, `setup-2`), and headings whose candidate is
/// empty receive numbered `heading-{n}` fallbacks counted separately from
/// the rest of the session. One instance covers exactly one document; either
/// construct a fresh slugger per document or call [`reset`](Self::reset)
/// between documents. Never share an instance across in-flight documents.
#[derive(Debug, Default)]
pub struct AnchorSlugger {
    issued: HashSet<String>,
    fallbacks: usize,
}

impl AnchorSlugger {
    /// Create a new slugger instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the anchor id for the provided heading text, unique within
    /// this slugger's current session.
    pub fn anchor_for(&mut self, heading: &str) -> String {
        let candidate = anchor_candidate(heading);
        let candidate = if candidate.is_empty() {
            self.fallbacks += 1;
            format!("heading-{}", self.fallbacks)
        } else {
            candidate
        };

        if self.issued.insert(candidate.clone()) {
            return candidate;
        }

        let mut counter = 1usize;
        loop {
            let suffixed = format!("{candidate}-{counter}");
            if self.issued.insert(suffixed.clone()) {
                return suffixed;
            }
            counter += 1;
        }
    }

    /// Forget every issued id and start a fresh session. Equivalent to
    /// constructing a new instance.
    pub fn reset(&mut self) {
        self.issued.clear();
        self.fallbacks = 0;
    }
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(reading) => {
                if !output.is_empty() && !output.ends_with(' ') {
                    output.push(' ');
                }
                output.push_str(reading.plain());
            }
            None if ch.is_whitespace() => output.push(' '),
            // Leave unhandled characters for slugify to filter.
            None => output.push(ch),
        }
    }

    output
}
