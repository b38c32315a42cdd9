//! Intent classification and title cleanup.
//!
//! Direction verbs are checked income-first: "thu 2tr luong" must read as
//! income even though "chi"/"mua" style expense verbs are more common.
//! The weekday guard exists because folded "thu 5" (Thursday) and "thu"
//! (collect) collide; a weekday phrase without an independent money cue
//! blocks the transaction reading.

use regex::Regex;
use std::sync::LazyLock;

use super::normalize::{contains_word, remove_word};
use crate::models::enums::{Direction, IntentKind};

pub const INCOME_KEYWORDS: &[&str] = &["thu", "nhan", "luong"];
pub const EXPENSE_KEYWORDS: &[&str] = &["chi", "mua", "tra", "thanh toan", "an", "uong", "cafe"];

// Verbs that are money evidence on their own. "thu" is absent: it doubles
// as the weekday marker and must not defeat the weekday guard.
const MONEY_VERBS: &[&str] = &["chi", "mua", "tra", "uong", "an", "cafe", "luong", "nhan"];

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d[\d.,]*\s?(k|nghin|trieu|tr|vnd|dong|d)\b|\$").unwrap()
});

static WEEKDAY_CUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(thu\s?[2-7]|t[2-7]|cn|chu nhat)\b").unwrap());

static THU_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bthu\b").unwrap());

static WEEKDAY_DIGIT_AFTER_THU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s?[2-7]\b").unwrap());

// Removed from titles on top of whatever the temporal stage consumed, so
// cleanup works even when a phrase lost the precedence race.
const TITLE_TIME_WORDS: &[&str] = &[
    "hom nay",
    "ngay mai",
    "mai",
    "tuan nay",
    "tuan sau",
    "tuan toi",
    "buoi sang",
    "sang",
    "buoi trua",
    "trua",
    "buoi chieu",
    "chieu",
    "buoi toi",
    "toi",
    "thu hai",
    "thu 2",
    "t2",
    "thu ba",
    "thu 3",
    "t3",
    "thu tu",
    "thu 4",
    "t4",
    "thu nam",
    "thu 5",
    "t5",
    "thu sau",
    "thu 6",
    "t6",
    "thu bay",
    "thu 7",
    "t7",
    "chu nhat",
    "cn",
];

static TITLE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}(/\d{4})?").unwrap());

static TITLE_CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}(pm|am|gio|h|:\d{2})").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: IntentKind,
    pub direction: Option<Direction>,
}

/// Income verbs first, then expense verbs. "thu" only counts as income
/// evidence when it stands alone; as part of "thu 5" it is a weekday.
pub fn detect_direction(normalized: &str) -> Option<Direction> {
    if has_income_cue(normalized) {
        return Some(Direction::Income);
    }
    if EXPENSE_KEYWORDS.iter().any(|k| contains_word(normalized, k)) {
        return Some(Direction::Expense);
    }
    None
}

fn has_income_cue(normalized: &str) -> bool {
    INCOME_KEYWORDS.iter().any(|keyword| match *keyword {
        "thu" => has_standalone_thu(normalized),
        other => contains_word(normalized, other),
    })
}

// "thu 2tr" keeps its "thu" (the digit is glued to a magnitude suffix, so
// it is no weekday); "thu 5" loses it.
fn has_standalone_thu(normalized: &str) -> bool {
    THU_RE
        .find_iter(normalized)
        .any(|m| !WEEKDAY_DIGIT_AFTER_THU_RE.is_match(&normalized[m.end()..]))
}

pub fn has_currency_token(normalized: &str) -> bool {
    CURRENCY_RE.is_match(normalized)
}

pub fn has_weekday_cue(normalized: &str) -> bool {
    WEEKDAY_CUE_RE.is_match(normalized)
}

/// A currency token or an unambiguous money verb.
pub fn has_explicit_money_cue(normalized: &str) -> bool {
    has_currency_token(normalized)
        || MONEY_VERBS.iter().any(|verb| contains_word(normalized, verb))
}

/// Gate used when an external parser proposes a transaction: weekday
/// phrases without independent money evidence read as scheduling, and a
/// transaction with no amount needs an explicit cue to survive.
pub fn should_treat_as_finance(normalized: &str, amount: Option<f64>) -> bool {
    let explicit = has_explicit_money_cue(normalized);
    if has_weekday_cue(normalized) && !explicit {
        return false;
    }
    if amount.filter(|a| *a != 0.0).is_none() && !explicit {
        return false;
    }
    true
}

/// Local classification: a transaction needs a direction verb plus money
/// evidence and must clear the weekday guard; otherwise an event marker
/// picks Event and everything else is a Task. A zero amount is not money
/// evidence.
pub fn classify(normalized: &str, amount: Option<f64>) -> Classification {
    let direction = detect_direction(normalized);
    let has_money = has_currency_token(normalized) || amount.filter(|a| *a > 0.0).is_some();
    let weekday_blocked = has_weekday_cue(normalized) && !has_explicit_money_cue(normalized);

    if direction.is_some() && has_money && !weekday_blocked {
        return Classification {
            kind: IntentKind::Transaction,
            direction,
        };
    }

    let kind = if is_event_marker(normalized) {
        IntentKind::Event
    } else {
        IntentKind::Task
    };
    Classification {
        kind,
        direction: None,
    }
}

pub fn is_event_marker(normalized: &str) -> bool {
    contains_word(normalized, "event") || contains_word(normalized, "su kien")
}

/// Strip consumed temporal phrases, the static time-word list, and
/// date/clock tokens from the normalized text. An input that is nothing
/// but temporal phrases keeps its raw form as the title.
pub fn clean_title(raw: &str, normalized: &str, consumed: &[String]) -> String {
    let mut title = normalized.to_string();
    for phrase in consumed {
        title = remove_word(&title, phrase);
    }
    for word in TITLE_TIME_WORDS {
        title = remove_word(&title, word);
    }
    let title = TITLE_DATE_RE.replace_all(&title, " ");
    let title = TITLE_CLOCK_RE.replace_all(&title, " ");

    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        raw.trim().to_string()
    } else {
        collapsed
    }
}
