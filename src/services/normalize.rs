//! Text normalization for raw article bodies.
//!
//! Feed descriptions arrive as untrusted HTML fragments: entity-encoded,
//! full of tags and erratic whitespace, and sometimes without any sentence
//! punctuation at all. Everything here is total over `&str`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::decode_html_entities;

/// Inputs longer than this with no sentence boundary are chunked instead.
pub const RUN_ON_THRESHOLD: usize = 180;
/// Window size (in characters) used when chunking run-on text.
pub const RUN_ON_CHUNK: usize = 160;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script.*?>.*?</script>|<style.*?>.*?</style>").unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").unwrap());

/// Sentence-ending punctuation, the whitespace after it, and the first
/// character of the next clause. Group 1 is the gap to cut out.
static SENTENCE_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?](\s+)[A-Z0-9"']"#).unwrap());

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z']+").unwrap());

/// Strip markup from raw article text.
///
/// Entities are decoded first, so encoded markup (`&lt;b&gt;`) is removed
/// along with real tags. `<script>` and `<style>` blocks are dropped with
/// their content, other tags become a single space, control characters are
/// treated as whitespace, and all whitespace runs collapse to one space.
pub fn strip_html(raw: &str) -> String {
    let text = decode_html_entities(raw);
    let text = SCRIPT_STYLE_RE.replace_all(&text, " ");
    let text = TAG_RE.replace_all(&text, " ");
    let text: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Split normalized text into sentence-like units, in original order.
///
/// A boundary is `.`, `!` or `?` followed by whitespace and then a capital
/// letter, digit or quote. Text longer than [`RUN_ON_THRESHOLD`] characters
/// that yields at most one unit is cut into [`RUN_ON_CHUNK`]-character
/// windows instead.
pub fn sent_tokenize(text: &str) -> Vec<String> {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let text = collapsed.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let parts = split_sentences(text);
    if parts.len() <= 1 && text.chars().count() > RUN_ON_THRESHOLD {
        return chunk_chars(text, RUN_ON_CHUNK);
    }
    parts
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for caps in SENTENCE_BOUNDARY_RE.captures_iter(text) {
        if let Some(gap) = caps.get(1) {
            parts.push(text[start..gap.start()].to_string());
            start = gap.end();
        }
    }
    parts.push(text[start..].to_string());
    parts
}

fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

/// Iterate lowercase word tokens (letters and apostrophes, at least two
/// characters, starting with a letter).
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Count lowercase words longer than two characters.
pub fn word_freq(text: &str) -> HashMap<String, usize> {
    let mut freq = HashMap::new();
    for word in words(text).filter(|w| w.len() > 2) {
        *freq.entry(word).or_insert(0) += 1;
    }
    freq
}
