//! Text Pipeline Tests
//!
//! Runs noisy, HTML-laden article bodies through the public summarization and
//! sentiment API the way the search endpoint does.

use finnews::models::RawArticle;
use finnews::services::{build_articles, quick_sentiment, sent_tokenize, strip_html, summarize};

const EARNINGS_HTML: &str = r#"
<html><head><style>.x { color: red; }</style><script>track("view");</script></head>
<body>
<h1>Acme Corp beats estimates</h1>
<p>Acme Corp reported record quarterly revenue on Tuesday&nbsp;as cloud sales surged.</p>
<p>Acme Corp raised its full-year guidance, citing strong demand for cloud services.</p>
<p>The weather in the city was mild.</p>
<p>Analysts said Acme Corp cloud revenue growth could continue into next year!</p>
</body></html>
"#;

#[test]
fn strips_markup_scripts_and_entities() {
    let text = strip_html(EARNINGS_HTML);
    assert!(!text.contains('<'));
    assert!(!text.contains("track("));
    assert!(!text.contains("color: red"));
    assert!(!text.contains("&nbsp;"));
    assert!(text.contains("Acme Corp reported record quarterly revenue on Tuesday as cloud sales surged."));
    assert!(!text.contains("  "));
}

#[test]
fn summary_keeps_document_order_and_limit() {
    let summary = summarize(EARNINGS_HTML, 2);
    let sentences = sent_tokenize(&summary);
    assert_eq!(sentences.len(), 2);
    assert!(!summary.contains("weather"));

    let full = strip_html(EARNINGS_HTML);
    let first = full.find(sentences[0].as_str()).unwrap();
    let second = full.find(sentences[1].as_str()).unwrap();
    assert!(first < second);
}

#[test]
fn summary_of_short_text_is_the_text() {
    assert_eq!(summarize("Shares rose 3%.", 3), "Shares rose 3%.");
    assert_eq!(summarize("", 3), "");
    assert_eq!(summarize("<p></p>", 3), "");
}

#[test]
fn run_on_text_still_summarizes() {
    let run_on = "stocks rallied on strong earnings and upbeat guidance ".repeat(20);
    let summary = summarize(&run_on, 1);
    assert!(!summary.is_empty());
    assert!(summary.chars().count() < run_on.chars().count());
}

#[test]
fn sentiment_direction_and_bounds() {
    let bullish = quick_sentiment("Shares surge after record profit and upgrade");
    let bearish = quick_sentiment("Shares plunge after loss and downgrade");
    assert!(bullish > 0.0);
    assert!(bearish < 0.0);
    assert_eq!(quick_sentiment(""), 0.0);

    for text in [EARNINGS_HTML, "not not not bad", "gain gain gain gain gain gain"] {
        let score = quick_sentiment(text);
        assert!((-1.0..=1.0).contains(&score), "{} out of range", score);
    }
}

#[test]
fn negation_flips_polarity() {
    assert!(quick_sentiment("profits did not fall") > 0.0);
    assert!(quick_sentiment("results were not strong") < 0.0);
}

#[test]
fn articles_get_summary_and_sentiment() {
    let raw = vec![
        RawArticle {
            title: "  Acme Corp beats estimates  ".to_string(),
            url: String::new(),
            description: EARNINGS_HTML.to_string(),
            source: String::new(),
            ..Default::default()
        },
        RawArticle {
            title: "Quiet day".to_string(),
            url: "https://example.org/quiet".to_string(),
            description: String::new(),
            source: "Wire".to_string(),
            ..Default::default()
        },
    ];

    let articles = build_articles(raw, 1);
    assert_eq!(articles.len(), 2);

    let acme = &articles[0];
    assert_eq!(acme.title, "Acme Corp beats estimates");
    assert_eq!(acme.url, "https://example.com");
    assert_eq!(acme.source, "Unknown");
    assert_eq!(sent_tokenize(&acme.summary).len(), 1);
    assert!(acme.sentiment.unwrap() > 0.0);

    let quiet = &articles[1];
    assert_eq!(quiet.summary, "");
    assert_eq!(quiet.sentiment, Some(0.0));
}
