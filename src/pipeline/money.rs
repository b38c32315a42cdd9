//! Amount and spending-category extraction.

use regex::Regex;
use std::sync::LazyLock;

use super::normalize::contains_word;

// First numeric token plus an optional glued magnitude suffix. The suffix
// must sit on the same token: "45k" scales, "45 km" does not.
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d.,]*)(k|nghin|trieu|tr|m)?\b").unwrap());

const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("an", "Food"),
    ("cafe", "Food"),
    ("xe", "Transport"),
    ("xang", "Transport"),
    ("sach", "Study"),
    ("course", "Study"),
    ("dien", "Bills"),
    ("nuoc", "Bills"),
];

pub const DEFAULT_CATEGORY: &str = "General";

/// Pull the first numeric token out of normalized text and scale it by its
/// magnitude suffix. Returns the absolute amount; direction is decided by
/// verbs, never by sign.
pub fn extract_amount(normalized: &str) -> Option<f64> {
    let caps = AMOUNT_RE.captures(normalized)?;
    let value = parse_numeric_token(&caps[1])?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("k") | Some("nghin") => 1_000.0,
        Some("tr") | Some("trieu") | Some("m") => 1_000_000.0,
        _ => 1.0,
    };
    Some((value * multiplier).abs())
}

/// Map the first category keyword in the text to its spending category.
pub fn infer_category(normalized: &str) -> String {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| contains_word(normalized, keyword))
        .map(|(_, category)| (*category).to_string())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

/// Interpret separators in a numeric token. Dots and commas that group
/// exactly three digits are thousand separators ("45.000"); a single
/// shorter group is a decimal fraction ("1.5").
fn parse_numeric_token(token: &str) -> Option<f64> {
    let parts: Vec<&str> = token.split(['.', ',']).collect();
    let cleaned = if parts.len() == 1 {
        token.to_string()
    } else if parts[1..].iter().all(|group| group.len() == 3) {
        parts.concat()
    } else if parts.len() == 2 {
        format!("{}.{}", parts[0], parts[1])
    } else {
        parts.concat()
    };
    cleaned.parse::<f64>().ok()
}
