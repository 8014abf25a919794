// src/table/clean.rs

use once_cell::sync::Lazy;
use regex::Regex;

static NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n:\x{A0}]").expect("noise pattern should compile"));

/// Trim surrounding whitespace, then drop tabs, newlines, colons and non-breaking spaces.
pub fn clean_str(raw: &str) -> String {
    NOISE.replace_all(raw.trim(), "").into_owned()
}

/// Make `name` safe to use as a single path component.
pub fn file_name_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}
