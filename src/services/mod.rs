//! Text-processing services.
//!
//! - `normalize`: markup stripping, sentence splitting and word counting
//! - `summarizer`: extractive frequency-based summaries
//! - `sentiment`: lexicon-based polarity scoring
//! - `search`: composes the above over provider results

pub mod normalize;
pub mod search;
pub mod sentiment;
pub mod summarizer;

pub use normalize::{sent_tokenize, strip_html, word_freq};
pub use search::{build_article, build_articles};
pub use sentiment::{quick_sentiment, SentimentLexicon};
pub use summarizer::{summarize, DEFAULT_MAX_SENTENCES};
