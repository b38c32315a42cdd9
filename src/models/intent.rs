use super::enums::{Direction, IntentKind, ParseSource};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured record produced from one free-form quick-add sentence.
///
/// `occurs_at` is the primary timestamp (start for events, due date for
/// tasks, posting date for transactions). Tasks mirror it into
/// `due_or_end_at`; events and transactions leave that field empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub kind: IntentKind,
    pub title: String,
    pub occurs_at: NaiveDateTime,
    pub due_or_end_at: Option<NaiveDateTime>,
    pub amount: Option<f64>,
    pub direction: Option<Direction>,
    pub category: Option<String>,
    pub tags: BTreeSet<String>,
    pub confidence_notes: Vec<String>,
    pub source: ParseSource,
}

impl ParsedIntent {
    pub fn is_transaction(&self) -> bool {
        self.kind == IntentKind::Transaction
    }
}
