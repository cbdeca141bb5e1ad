//! Publication-date normalization
//!
//! Providers report publication dates in whatever shape their catalog
//! holds. Everything is reduced to a 4-digit year or nothing.

use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-[0-9]{2}-[0-9]{2}$").expect("valid regex"));
static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("valid regex"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// How much freedom the parser takes with the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearParsing {
    /// Only `YYYY-MM-DD` and `YYYY`
    #[default]
    Strict,
    /// Strict forms, then any 4-digit run next to a space or hyphen
    /// ("Feb 1999", "1999-02", "March 3, 1999")
    Freeform,
}

/// Extract a publication year from a loosely formatted date string
pub fn parse_year(raw: Option<&str>, mode: YearParsing) -> Option<i32> {
    let raw = raw?.trim();

    // Only the shape matters; catalogs use placeholders such as `1999-00-00`
    if let Some(caps) = ISO_DATE.captures(raw) {
        return caps[1].parse().ok();
    }
    if BARE_YEAR.is_match(raw) {
        return raw.parse().ok();
    }

    match mode {
        YearParsing::Strict => None,
        YearParsing::Freeform => freeform_year(raw),
    }
}

fn freeform_year(raw: &str) -> Option<i32> {
    let separator = |c: Option<char>| matches!(c, Some(' ') | Some('-'));

    DIGIT_RUN
        .find_iter(raw)
        .filter(|m| m.len() == 4)
        .find(|m| {
            let before = raw[..m.start()].chars().next_back();
            let after = raw[m.end()..].chars().next();
            separator(before) || separator(after)
        })
        .and_then(|m| m.as_str().parse().ok())
}
