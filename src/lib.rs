//! finnews - financial news aggregation with extractive summaries and
//! lexicon-based sentiment.
//!
//! The text pipeline lives in [`services`]; everything else feeds it
//! (providers) or serves its results (server, CLI).

pub mod cli;
pub mod config;
pub mod events;
pub mod models;
pub mod providers;
pub mod rate_limit;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
pub mod utils;
