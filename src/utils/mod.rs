//! Shared utility functions.
//!
//! - `html`: HTML entity decoding for feed and article text

mod html;

pub use html::decode_html_entities;
