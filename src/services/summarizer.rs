//! Extractive, frequency-based article summarization.

use super::normalize::{sent_tokenize, strip_html, word_freq};

/// Sentence count used when the caller does not ask for one.
pub const DEFAULT_MAX_SENTENCES: usize = 3;

/// Score multiplier for the first sentence; news ledes carry the key facts.
const LEAD_BONUS: f64 = 1.15;

/// Summarize raw article text by picking its most representative sentences.
///
/// Each sentence scores the sum of corpus-wide counts of its distinct words,
/// with the lead sentence boosted by [`LEAD_BONUS`]. The top `max_sentences`
/// (ties broken by position) are returned in their original order, joined by
/// single spaces. Text with no countable words falls back to its first
/// `max_sentences` sentences.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    let text = strip_html(text);
    let sentences = sent_tokenize(&text);
    if sentences.is_empty() {
        return String::new();
    }

    let corpus = sentences.join(" ");
    let freq = word_freq(&corpus);
    let take = max_sentences.min(sentences.len());
    if freq.is_empty() {
        return sentences[..take].join(" ");
    }

    let mut scored: Vec<(f64, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let relevance: usize = word_freq(sentence)
                .keys()
                .map(|w| freq.get(w).copied().unwrap_or(0))
                .sum();
            let mut score = relevance as f64;
            if i == 0 {
                score *= LEAD_BONUS;
            }
            (score, i)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut selected: Vec<usize> = scored.into_iter().take(take).map(|(_, i)| i).collect();
    selected.sort_unstable();

    selected
        .into_iter()
        .map(|i| sentences[i].as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
