//! Summarize command: run the text pipeline over a file or stdin.

use std::path::Path;

use anyhow::Context;
use console::style;
use tokio::io::AsyncReadExt;

use crate::services::{quick_sentiment, strip_html, summarize};

pub async fn cmd_summarize(file: Option<&Path>, sentences: usize) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let summary = summarize(&text, sentences);
    let score = quick_sentiment(&strip_html(&text));

    if summary.is_empty() {
        println!("{}", style("(no summary)").dim());
    } else {
        println!("{}", summary);
    }
    println!();
    println!("{} {:+.3}", style("Sentiment:").bold(), score);
    Ok(())
}
