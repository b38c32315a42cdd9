//! Deterministic parser used when no smart rule matches and the model is
//! unavailable, over quota, or returned garbage. Never fails: every input
//! produces a record, with notes flagging what was assumed.

use chrono::NaiveDateTime;

use crate::models::enums::{IntentKind, ParseSource};
use crate::models::ParsedIntent;
use crate::pipeline::normalize::normalize;
use crate::pipeline::{classify, money, tags, temporal};

pub const FALLBACK_NOTE: &str = "Đã sử dụng rule-based parsing (fallback).";

pub fn parse(raw: &str, now: NaiveDateTime) -> ParsedIntent {
    let normalized = normalize(raw);
    let is_event = classify::is_event_marker(&normalized);
    let local = temporal::resolve(&normalized, is_event, now);

    let extracted = money::extract_amount(&normalized).filter(|a| *a > 0.0);
    let classification = classify::classify(&normalized, extracted);

    // a currency cue alone ("$", "0k") can pick the transaction reading
    // while no positive amount survives extraction; that reads as scheduling
    let kind = if classification.kind == IntentKind::Transaction && extracted.is_none() {
        if is_event {
            IntentKind::Event
        } else {
            IntentKind::Task
        }
    } else {
        classification.kind
    };

    let (amount, direction, category) = if kind == IntentKind::Transaction {
        (
            extracted,
            classification.direction,
            Some(money::infer_category(&normalized)),
        )
    } else {
        (None, None, None)
    };

    let occurs_at = local.timestamp_or(now.time());
    let due_or_end_at = if kind == IntentKind::Task {
        Some(occurs_at)
    } else {
        None
    };

    let mut confidence_notes = vec![FALLBACK_NOTE.to_string()];
    confidence_notes.extend(local.assumptions.iter().cloned());

    ParsedIntent {
        kind,
        title: classify::clean_title(raw, &normalized, &local.consumed),
        occurs_at,
        due_or_end_at,
        amount,
        direction,
        category,
        tags: tags::infer_tags(&normalized),
        confidence_notes,
        source: ParseSource::Fallback,
    }
}
