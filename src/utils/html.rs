//! HTML entity decoding.

/// Decode HTML character references (`&amp;`, `&eacute;`, `&#39;`, `&#x2014;`, ...).
///
/// Follows the HTML5 rules: the full named-entity table, legacy names
/// without a trailing semicolon (`&amp`, `&copy`), and numeric references
/// 128 to 159 read as Windows-1252. Unknown references are left untouched.
pub fn decode_html_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    htmlize::unescape(s).into_owned()
}
