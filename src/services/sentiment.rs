//! Lexicon-based sentiment scoring for financial headlines and summaries.
//!
//! Tokens are reduced with a crude suffix-stripping stemmer and matched
//! against finance-domain positive and negative stem sets. A negation word
//! flips the polarity of the next sentiment-bearing token, however many
//! neutral words sit between them.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::normalize::words;

/// Suffixes tried in order; only the first match is stripped.
const SUFFIXES: [&str; 5] = ["ies", "ing", "ed", "es", "s"];

/// Words of this many characters or fewer are never stemmed.
const MIN_STEM_LEN: usize = 4;

const POSITIVE_WORDS: &[&str] = &[
    "beat", "beats", "beating",
    "gain", "gains", "gained", "gaining",
    "surge", "surges", "surged", "soar", "soars", "soared",
    "jump", "jumps", "jumped", "rally", "rallies", "rallied",
    "record", "outperform", "outperforms", "outperformed",
    "upgrade", "upgrades", "upgraded",
    "strong", "strength", "growth", "expand", "expands", "expanded",
    "improve", "improves", "improved",
    "profit", "profits", "profitable", "margin", "margins",
    "guidance-raise", "raise", "raises", "raised",
    "bullish", "buy", "overweight", "positive", "optimistic",
];

const NEGATIVE_WORDS: &[&str] = &[
    "miss", "misses", "missed", "misses-estimates",
    "fall", "falls", "fell", "plunge", "plunges", "plunged",
    "drop", "drops", "dropped", "slump", "slumps", "slumped",
    "loss", "losses", "loss-making", "profit-warning",
    "downgrade", "downgrades", "downgraded",
    "underperform", "underperforms", "underperformed",
    "weak", "weakness", "slow", "slows", "slowed", "slowdown",
    "decline", "declines", "declined",
    "lawsuit", "probe", "investigation", "fine", "fines", "penalty", "penalties",
    "fraud", "recall", "layoff", "layoffs",
    "bearish", "sell", "underweight", "negative", "pessimistic",
    "struggle", "struggles", "struggled", "headwind", "headwinds",
    "cut", "cuts", "cutting",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "without", "hardly", "barely", "seldom"];

/// Process-wide lexicon, built once from the word lists above.
static LEXICON: LazyLock<SentimentLexicon> =
    LazyLock::new(|| SentimentLexicon::new(POSITIVE_WORDS, NEGATIVE_WORDS, NEGATIONS));

/// Reduce a word to its stem: lowercase, then strip the first matching
/// suffix from [`SUFFIXES`] if the word is longer than four characters.
pub fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.chars().count() > MIN_STEM_LEN {
        for suffix in SUFFIXES {
            if let Some(base) = lower.strip_suffix(suffix) {
                return base.to_string();
            }
        }
    }
    lower
}

/// Positive and negative stem sets plus negation triggers.
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    negations: HashSet<String>,
}

impl SentimentLexicon {
    /// Build a lexicon, stemming every positive and negative word.
    ///
    /// # Panics
    ///
    /// Panics if any stem lands in both the positive and negative sets.
    pub fn new(positive: &[&str], negative: &[&str], negations: &[&str]) -> Self {
        let positive: HashSet<String> = positive.iter().map(|w| stem(w)).collect();
        let negative: HashSet<String> = negative.iter().map(|w| stem(w)).collect();

        let mut overlap: Vec<&String> = positive.intersection(&negative).collect();
        overlap.sort();
        assert!(
            overlap.is_empty(),
            "sentiment lexicon stems are both positive and negative: {:?}",
            overlap
        );

        Self {
            positive,
            negative,
            negations: negations.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// The built-in finance lexicon.
    pub fn finance() -> &'static SentimentLexicon {
        &LEXICON
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    /// +1 for a positive stem, -1 for a negative stem, 0 otherwise.
    pub fn polarity(&self, stem: &str) -> i32 {
        if self.positive.contains(stem) {
            1
        } else if self.negative.contains(stem) {
            -1
        } else {
            0
        }
    }

    pub fn positive_len(&self) -> usize {
        self.positive.len()
    }

    pub fn negative_len(&self) -> usize {
        self.negative.len()
    }

    /// Score text into [-1.0, 1.0].
    pub fn score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = words(text).map(|w| stem(&w)).collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let mut score: i64 = 0;
        let mut negate = false;
        for token in &tokens {
            if self.is_negation(token) {
                negate = true;
                continue;
            }

            let val = i64::from(self.polarity(token));
            if val != 0 {
                score += if negate { -val } else { val };
                negate = false;
            }
        }

        let denom = (tokens.len() / 6).clamp(3, 15) as f64;
        (score as f64 / denom).clamp(-1.0, 1.0)
    }
}

/// Score text with the built-in finance lexicon. Always in [-1.0, 1.0].
pub fn quick_sentiment(text: &str) -> f64 {
    LEXICON.score(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_rules() {
        assert_eq!(stem("Rallies"), "rall");
        assert_eq!(stem("gaining"), "gain");
        assert_eq!(stem("jumped"), "jump");
        assert_eq!(stem("surges"), "surg");
        assert_eq!(stem("profits"), "profit");
        // Length four or less is left alone.
        assert_eq!(stem("cuts"), "cuts");
        assert_eq!(stem("loss"), "loss");
        // Only the first matching suffix is stripped.
        assert_eq!(stem("misses"), "miss");
        assert_eq!(stem("raised"), "rais");
    }

    #[test]
    fn test_lexicon_builds_disjoint() {
        let lex = SentimentLexicon::finance();
        assert!(lex.positive_len() > 20);
        assert!(lex.negative_len() > 20);
        assert_eq!(lex.polarity("jump"), 1);
        assert_eq!(lex.polarity("plung"), -1);
        assert_eq!(lex.polarity("company"), 0);
    }

    #[test]
    #[should_panic(expected = "both positive and negative")]
    fn test_overlapping_lexicon_rejected() {
        SentimentLexicon::new(&["gain", "rally"], &["gains"], &[]);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(quick_sentiment(""), 0.0);
        assert_eq!(quick_sentiment("   "), 0.0);
        assert_eq!(quick_sentiment("1 2 3 $"), 0.0);
    }

    #[test]
    fn test_single_words() {
        assert!((quick_sentiment("strong") - 1.0 / 3.0).abs() < 1e-9);
        assert!((quick_sentiment("plunged") + 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negation_flip() {
        assert!(quick_sentiment("strong") > 0.0);
        assert!(quick_sentiment("not strong") <= 0.0);
        assert!((quick_sentiment("not strong") + 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negation_survives_neutral_words() {
        let score = quick_sentiment("never a particularly strong quarter");
        assert!(score < 0.0);
    }

    #[test]
    fn test_negation_applies_once() {
        // "not" flips "weak" only; "gains" counts normally.
        let score = quick_sentiment("not weak gains");
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_unit_interval() {
        let text = "surge rally jump gains record profit beat";
        assert_eq!(quick_sentiment(text), 1.0);
        let text = "plunge slump fraud lawsuit layoffs losses missed";
        assert_eq!(quick_sentiment(text), -1.0);
    }

    #[test]
    fn test_denominator_scales_with_length() {
        // 24 tokens => denominator 4.
        let mut text = String::from("profit ");
        text.push_str(&"company ".repeat(23));
        assert!((quick_sentiment(&text) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_headline() {
        let score = quick_sentiment(
            "Earnings beat expectations Shares jumped after the company posted record profits",
        );
        assert!(score > 0.5);
    }

    #[test]
    fn test_always_in_range() {
        for text in [
            "",
            "not",
            "no no no no",
            "cut cut cut cut cut cut cut cut cut cut cut cut cut cut cut cut cut",
            "<p>&amp;</p>",
            "miss beat miss beat not miss",
        ] {
            let s = quick_sentiment(text);
            assert!((-1.0..=1.0).contains(&s), "{} out of range for {:?}", s, text);
        }
    }
}
