//! Strict parsing of the model's JSON draft and reconciliation with the
//! local extractors.
//!
//! The model is useful for titles and categories but unreliable about
//! dates and finance classification, so local evidence wins wherever the
//! two disagree: a local date cue overrides the draft date, the finance
//! gate can demote a claimed transaction, and direction always comes from
//! verbs before the draft's amount sign.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::error::Category;
use std::collections::BTreeSet;

use super::AssistedError;
use crate::models::enums::{Direction, IntentKind, ParseSource};
use crate::models::ParsedIntent;
use crate::pipeline::{classify, money, tags, temporal};

pub const ASSISTED_NOTE: &str = "Đã sử dụng AI để parse.";

#[derive(Debug, Deserialize)]
struct RawDraft {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default, rename = "isEvent")]
    is_event: Option<bool>,
}

/// A draft that passed schema validation. Fields are cleaned (trimmed,
/// empties dropped) but not yet reconciled with local extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct AiDraft {
    pub kind: IntentKind,
    pub title: Option<String>,
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_event: bool,
}

/// Parse one completion into a validated draft.
///
/// Malformed JSON and schema violations are separate errors: the first
/// means the model ignored the output contract, the second that it
/// produced JSON of the wrong shape. Both send the caller to the
/// fallback parser.
pub fn parse_ai_draft(completion: &str) -> Result<AiDraft, AssistedError> {
    let trimmed = completion.trim();
    if trimmed.is_empty() {
        return Err(AssistedError::EmptyCompletion);
    }

    let body = strip_code_fences(trimmed);
    let raw: RawDraft = serde_json::from_str(body).map_err(|e| match e.classify() {
        Category::Data => AssistedError::SchemaMismatch(e.to_string()),
        _ => AssistedError::InvalidJson(e.to_string()),
    })?;

    let kind: IntentKind = raw
        .kind
        .trim()
        .to_uppercase()
        .parse()
        .map_err(|_| AssistedError::SchemaMismatch(format!("unknown type: {}", raw.kind)))?;

    Ok(AiDraft {
        kind,
        title: raw.title.filter(|t| !t.trim().is_empty()),
        date: raw.date.filter(|d| !d.trim().is_empty()),
        amount: raw.amount,
        category: raw.category.filter(|c| !c.trim().is_empty()),
        tags: raw
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        is_event: raw.is_event.unwrap_or(false),
    })
}

/// Merge a validated draft with local extraction into the final record.
pub fn build_intent(
    draft: &AiDraft,
    raw: &str,
    normalized: &str,
    now: NaiveDateTime,
) -> ParsedIntent {
    let is_event_hint = draft.is_event || draft.kind == IntentKind::Event;
    let local = temporal::resolve(normalized, is_event_hint, now);

    // Draft amounts are advisory: take the absolute value, treat zero as
    // missing, and fall back to local extraction when the draft has none.
    let fin_amount = draft
        .amount
        .map(f64::abs)
        .filter(|a| *a > 0.0)
        .or_else(|| money::extract_amount(normalized).filter(|a| *a > 0.0));

    let mut kind = draft.kind;
    if kind == IntentKind::Transaction
        && (!classify::should_treat_as_finance(normalized, draft.amount) || fin_amount.is_none())
    {
        // claimed transaction without money evidence reads as scheduling
        kind = if is_event_hint {
            IntentKind::Event
        } else {
            IntentKind::Task
        };
    }

    let mut assumptions = vec![ASSISTED_NOTE.to_string()];

    let occurs_at = if local.explicit_date {
        local.timestamp_or(now.time())
    } else if let Some(draft_at) = draft
        .date
        .as_deref()
        .and_then(|d| parse_draft_date(d, local.time))
    {
        if is_event_hint {
            draft_at.date().and_time(NaiveTime::MIN)
        } else {
            draft_at
        }
    } else {
        assumptions.extend(local.assumptions.iter().cloned());
        local.timestamp_or(now.time())
    };

    let (amount, direction, category) = if kind == IntentKind::Transaction {
        let direction = classify::detect_direction(normalized)
            .or_else(|| {
                draft
                    .amount
                    .filter(|a| *a < 0.0)
                    .map(|_| Direction::Income)
            })
            .unwrap_or(Direction::Expense);
        let category = draft
            .category
            .clone()
            .unwrap_or_else(|| money::infer_category(normalized));
        (fin_amount, Some(direction), Some(category))
    } else {
        (None, None, None)
    };

    let tag_set: BTreeSet<String> = if draft.tags.is_empty() {
        tags::infer_tags(normalized)
    } else {
        draft.tags.iter().cloned().collect()
    };

    let title = draft
        .title
        .clone()
        .unwrap_or_else(|| classify::clean_title(raw, normalized, &local.consumed));

    let due_or_end_at = if kind == IntentKind::Task {
        Some(occurs_at)
    } else {
        None
    };

    ParsedIntent {
        kind,
        title,
        occurs_at,
        due_or_end_at,
        amount,
        direction,
        category,
        tags: tag_set,
        confidence_notes: assumptions,
        source: ParseSource::Assisted,
    }
}

fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Accept RFC 3339, naive datetime, or a bare date. A bare date borrows
/// the locally detected time when there is one.
fn parse_draft_date(value: &str, local_time: Option<NaiveTime>) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d.and_time(local_time.unwrap_or(NaiveTime::MIN)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::normalize::normalize;
    use chrono::NaiveDate;

    // Tuesday
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn build(draft: &AiDraft, raw: &str) -> ParsedIntent {
        build_intent(draft, raw, &normalize(raw), now())
    }

    fn transaction_draft() -> AiDraft {
        AiDraft {
            kind: IntentKind::Transaction,
            title: Some("ăn sáng".to_string()),
            date: None,
            amount: Some(45_000.0),
            category: Some("Food".to_string()),
            tags: vec!["food".to_string()],
            is_event: false,
        }
    }

    #[test]
    fn parses_full_draft() {
        let draft = parse_ai_draft(
            r#"{"type":"TRANSACTION","title":"ăn sáng","date":"2026-03-11T08:00:00","amount":45000,"category":"Food","tags":["food"],"isEvent":false}"#,
        )
        .unwrap();
        assert_eq!(draft.kind, IntentKind::Transaction);
        assert_eq!(draft.title.as_deref(), Some("ăn sáng"));
        assert_eq!(draft.amount, Some(45_000.0));
        assert_eq!(draft.tags, vec!["food".to_string()]);
    }

    #[test]
    fn accepts_fenced_json() {
        let draft = parse_ai_draft("```json\n{\"type\":\"TASK\",\"title\":\"hop\"}\n```").unwrap();
        assert_eq!(draft.kind, IntentKind::Task);
    }

    #[test]
    fn rejects_non_json() {
        let result = parse_ai_draft("I think this is a TASK about breakfast");
        assert!(matches!(result, Err(AssistedError::InvalidJson(_))));
    }

    #[test]
    fn rejects_mistyped_amount() {
        let result = parse_ai_draft(r#"{"type":"TRANSACTION","title":"x","amount":"45k"}"#);
        assert!(matches!(result, Err(AssistedError::SchemaMismatch(_))));
    }

    #[test]
    fn rejects_unknown_kind() {
        let result = parse_ai_draft(r#"{"type":"REMINDER","title":"x"}"#);
        assert!(matches!(result, Err(AssistedError::SchemaMismatch(_))));
    }

    #[test]
    fn rejects_missing_kind() {
        let result = parse_ai_draft(r#"{"title":"x"}"#);
        assert!(matches!(result, Err(AssistedError::SchemaMismatch(_))));
    }

    #[test]
    fn rejects_empty_completion() {
        assert!(matches!(
            parse_ai_draft("   "),
            Err(AssistedError::EmptyCompletion)
        ));
    }

    #[test]
    fn local_date_cue_overrides_draft_date() {
        let mut draft = transaction_draft();
        draft.date = Some("2026-12-25T00:00:00".to_string());

        let intent = build(&draft, "chi 45k ăn sáng mai");
        // "mai" wins over the draft's December date; "sáng" sets the hour
        assert_eq!(
            intent.occurs_at,
            NaiveDate::from_ymd_opt(2026, 3, 11)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap()
        );
        assert_eq!(intent.kind, IntentKind::Transaction);
        assert_eq!(intent.amount, Some(45_000.0));
    }

    #[test]
    fn draft_date_used_without_local_cue() {
        let draft = AiDraft {
            kind: IntentKind::Task,
            title: Some("họp khách".to_string()),
            date: Some("2026-03-20T14:00:00".to_string()),
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "họp với khách");
        assert_eq!(
            intent.occurs_at,
            NaiveDate::from_ymd_opt(2026, 3, 20)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
        // no default-date assumption when the draft supplied the date
        assert_eq!(intent.confidence_notes, vec![ASSISTED_NOTE.to_string()]);
    }

    #[test]
    fn bare_draft_date_borrows_local_time() {
        let draft = AiDraft {
            kind: IntentKind::Task,
            title: None,
            date: Some("2026-03-20".to_string()),
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "gọi khách hàng 3pm");
        assert_eq!(
            intent.occurs_at,
            NaiveDate::from_ymd_opt(2026, 3, 20)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn missing_dates_default_to_today_with_note() {
        let draft = AiDraft {
            kind: IntentKind::Task,
            title: Some("viết báo cáo".to_string()),
            date: None,
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "viết báo cáo");
        assert_eq!(intent.occurs_at, now());
        assert!(intent
            .confidence_notes
            .contains(&temporal::DEFAULT_DATE_ASSUMPTION.to_string()));
    }

    #[test]
    fn weekday_transaction_claim_is_demoted() {
        let draft = AiDraft {
            kind: IntentKind::Transaction,
            title: Some("họp".to_string()),
            date: None,
            amount: Some(5.0),
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "họp thứ 5");
        assert_eq!(intent.kind, IntentKind::Task);
        assert_eq!(intent.amount, None);
        assert_eq!(intent.direction, None);
    }

    #[test]
    fn amountless_transaction_claim_is_demoted() {
        let draft = AiDraft {
            kind: IntentKind::Transaction,
            title: None,
            date: None,
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "mua vé xem phim");
        assert_eq!(intent.kind, IntentKind::Task);
        assert_eq!(intent.amount, None);
    }

    #[test]
    fn claim_with_zero_extracted_amount_is_demoted() {
        let draft = AiDraft {
            kind: IntentKind::Transaction,
            title: None,
            date: None,
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        // "0k" extracts as zero; that must not rescue the claim
        let intent = build(&draft, "chi 0k ăn vặt");
        assert_eq!(intent.kind, IntentKind::Task);
        assert_eq!(intent.amount, None);
        assert_eq!(intent.direction, None);
    }

    #[test]
    fn negative_draft_amount_reads_as_income() {
        let draft = AiDraft {
            kind: IntentKind::Transaction,
            title: Some("hoàn tiền".to_string()),
            date: None,
            amount: Some(-200_000.0),
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "hoàn tiền 200k");
        assert_eq!(intent.kind, IntentKind::Transaction);
        assert_eq!(intent.direction, Some(Direction::Income));
        assert_eq!(intent.amount, Some(200_000.0));
    }

    #[test]
    fn verbs_outrank_draft_amount_sign() {
        let mut draft = transaction_draft();
        draft.amount = Some(-45_000.0);

        let intent = build(&draft, "chi 45k ăn sáng");
        assert_eq!(intent.direction, Some(Direction::Expense));
        assert_eq!(intent.amount, Some(45_000.0));
    }

    #[test]
    fn event_hint_forces_midnight() {
        let draft = AiDraft {
            kind: IntentKind::Event,
            title: Some("khai trương".to_string()),
            date: Some("2026-03-15T19:00:00".to_string()),
            amount: None,
            category: None,
            tags: vec![],
            is_event: true,
        };

        let intent = build(&draft, "sự kiện khai trương");
        assert_eq!(intent.kind, IntentKind::Event);
        assert_eq!(
            intent.occurs_at,
            NaiveDate::from_ymd_opt(2026, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(intent.due_or_end_at, None);
    }

    #[test]
    fn empty_draft_tags_fall_back_to_inference() {
        let draft = AiDraft {
            kind: IntentKind::Task,
            title: None,
            date: None,
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "thi lái xe sáng thứ 7");
        assert!(intent.tags.contains("transport"));
        assert!(intent.tags.contains("study"));
    }

    #[test]
    fn missing_title_falls_back_to_cleanup() {
        let mut draft = transaction_draft();
        draft.title = None;

        let intent = build(&draft, "chi 45k ăn sáng mai");
        assert_eq!(intent.title, "chi 45k an");
    }

    #[test]
    fn task_mirrors_due_date() {
        let draft = AiDraft {
            kind: IntentKind::Task,
            title: Some("nộp báo cáo".to_string()),
            date: None,
            amount: None,
            category: None,
            tags: vec![],
            is_event: false,
        };

        let intent = build(&draft, "nộp báo cáo mai");
        assert_eq!(intent.due_or_end_at, Some(intent.occurs_at));
    }
}
