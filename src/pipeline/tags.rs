//! Tag inference from normalized text.

use std::collections::BTreeSet;

use super::normalize::contains_word;

pub const DEFAULT_TAG: &str = "quick-add";

const URGENT_CUES: &[&str] = &["urgent", "khan cap", "gap"];
const HIGH_CUES: &[&str] = &["quan trong", "important", "high"];
const LOW_CUES: &[&str] = &["low", "thap"];

const TOPIC_CUES: &[(&[&str], &str)] = &[
    (&["study", "hoc", "ielts", "thi"], "study"),
    (&["work", "cong viec"], "work"),
    (&["personal", "ca nhan"], "personal"),
    (&["lai xe", "xe"], "transport"),
];

/// Urgency cues are exclusive (first family wins); topic cues are additive.
/// An input with no cues at all still gets the marker tag so downstream
/// filters can find quick-added items.
pub fn infer_tags(normalized: &str) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    if any_word(normalized, URGENT_CUES) {
        tags.insert("urgent".to_string());
        tags.insert("high".to_string());
    } else if any_word(normalized, HIGH_CUES) {
        tags.insert("high".to_string());
    } else if any_word(normalized, LOW_CUES) {
        tags.insert("low".to_string());
    }

    for (cues, tag) in TOPIC_CUES {
        if any_word(normalized, cues) {
            tags.insert((*tag).to_string());
        }
    }

    if tags.is_empty() {
        tags.insert(DEFAULT_TAG.to_string());
    }
    tags
}

fn any_word(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| contains_word(text, word))
}
