//! One sentence in, one structured record out.
//!
//! Resolution order: user-taught keyword rules first (free, no quota),
//! then the chat model under the daily budget, then the deterministic
//! fallback. Failures past the input check never surface to the caller;
//! every degraded path still returns a parsed record.

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::config::{self, QuickAddConfig};
use crate::db::repository::find_rule_match;
use crate::models::enums::{Direction, IntentKind, ParseSource};
use crate::models::{ParsedIntent, SmartRule, UsageSnapshot};
use crate::pipeline::assisted::{parser, prompt, AssistedError, GroqClient, LlmClient};
use crate::pipeline::normalize::normalize;
use crate::pipeline::{classify, fallback, money, tags, temporal};
use crate::quota::{QuotaGovernor, Reservation};

pub const QUOTA_EXHAUSTED_MESSAGE: &str =
    "Đã đạt giới hạn sử dụng AI hôm nay. Vui lòng thử lại vào ngày mai.";
pub const SMART_RULE_NOTE: &str = "Đã sử dụng Smart Learning để parse.";
pub const MISSING_AMOUNT_NOTE: &str = "Không tìm thấy số tiền trong nội dung.";

#[derive(Debug, Error)]
pub enum QuickAddError {
    #[error("Input must not be empty")]
    InvalidInput,
}

#[derive(Debug, Clone, Serialize)]
pub enum QuickAddOutcome {
    Parsed {
        intent: ParsedIntent,
        /// Present only when the assisted stage consumed a quota unit.
        usage: Option<UsageSnapshot>,
    },
    QuotaExhausted {
        usage: UsageSnapshot,
        message: String,
    },
}

pub struct QuickAddPipeline {
    llm: Option<Box<dyn LlmClient + Send + Sync>>,
    quota: QuotaGovernor,
}

impl QuickAddPipeline {
    pub fn new(llm: Option<Box<dyn LlmClient + Send + Sync>>, quota: QuotaGovernor) -> Self {
        Self { llm, quota }
    }

    pub fn from_config(config: &QuickAddConfig) -> Self {
        let llm = GroqClient::from_config(config)
            .map(|client| Box::new(client) as Box<dyn LlmClient + Send + Sync>);
        Self::new(llm, QuotaGovernor::new(config.daily_ai_limit))
    }

    pub fn quick_add(
        &self,
        conn: &Connection,
        raw: &str,
        user_id: &str,
    ) -> Result<QuickAddOutcome, QuickAddError> {
        self.quick_add_at(conn, raw, user_id, Local::now().naive_local())
    }

    pub fn quick_add_at(
        &self,
        conn: &Connection,
        raw: &str,
        user_id: &str,
        now: NaiveDateTime,
    ) -> Result<QuickAddOutcome, QuickAddError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuickAddError::InvalidInput);
        }
        let normalized = normalize(trimmed);

        match find_rule_match(conn, user_id, &normalized) {
            Ok(Some(rule)) => {
                tracing::info!(keyword = %rule.keyword, "Smart rule matched, skipping AI");
                return Ok(QuickAddOutcome::Parsed {
                    intent: build_rule_intent(&rule, trimmed, &normalized, now),
                    usage: None,
                });
            }
            Ok(None) => {}
            // Rule lookup is an optimization; a broken table must not
            // block parsing.
            Err(e) => tracing::warn!(error = %e, "Smart rule lookup failed, continuing"),
        }

        let Some(llm) = self.llm.as_deref() else {
            tracing::debug!("No chat client configured, using fallback parser");
            return Ok(QuickAddOutcome::Parsed {
                intent: fallback::parse(trimmed, now),
                usage: None,
            });
        };

        let day = now.date();
        let reservation = match self.quota.try_reserve(conn, user_id, day) {
            Ok(reservation) => reservation,
            Err(e) => {
                tracing::warn!(error = %e, "Quota check failed, using fallback parser");
                return Ok(QuickAddOutcome::Parsed {
                    intent: fallback::parse(trimmed, now),
                    usage: None,
                });
            }
        };

        let snapshot = match reservation {
            Reservation::Exhausted(usage) => {
                return Ok(QuickAddOutcome::QuotaExhausted {
                    usage,
                    message: QUOTA_EXHAUSTED_MESSAGE.to_string(),
                });
            }
            Reservation::Allowed(snapshot) => snapshot,
        };

        match try_assisted(llm, trimmed, &normalized, now) {
            Ok(intent) => Ok(QuickAddOutcome::Parsed {
                intent,
                usage: Some(snapshot),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Assisted parse failed, falling back");
                // The unit goes back so a bad completion does not burn
                // budget. Best effort.
                if let Err(release_err) = self.quota.release(conn, user_id, day) {
                    tracing::warn!(error = %release_err, "Could not release quota unit");
                }
                Ok(QuickAddOutcome::Parsed {
                    intent: fallback::parse(trimmed, now),
                    usage: None,
                })
            }
        }
    }
}

fn try_assisted(
    llm: &(dyn LlmClient + Send + Sync),
    raw: &str,
    normalized: &str,
    now: NaiveDateTime,
) -> Result<ParsedIntent, AssistedError> {
    let user_prompt = prompt::build_user_prompt(raw, now.date());
    let completion = llm.complete(
        prompt::QUICK_ADD_SYSTEM_PROMPT,
        &user_prompt,
        config::CHAT_TEMPERATURE,
    )?;
    let draft = parser::parse_ai_draft(&completion)?;
    Ok(parser::build_intent(&draft, raw, normalized, now))
}

/// A matched rule fixes the kind; everything else still comes from the
/// local extractors.
fn build_rule_intent(
    rule: &SmartRule,
    raw: &str,
    normalized: &str,
    now: NaiveDateTime,
) -> ParsedIntent {
    let is_event = rule.mapped_kind == IntentKind::Event;
    let local = temporal::resolve(normalized, is_event, now);

    let mut confidence_notes = vec![SMART_RULE_NOTE.to_string()];
    confidence_notes.extend(local.assumptions.iter().cloned());

    let (amount, direction, category) = if rule.mapped_kind == IntentKind::Transaction {
        let amount = money::extract_amount(normalized).filter(|a| *a > 0.0);
        if amount.is_none() {
            confidence_notes.push(MISSING_AMOUNT_NOTE.to_string());
        }
        let direction = classify::detect_direction(normalized).unwrap_or(Direction::Expense);
        let category = rule
            .mapped_category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| money::infer_category(normalized));
        (amount, Some(direction), Some(category))
    } else {
        (None, None, rule.mapped_category.clone())
    };

    let occurs_at = local.timestamp_or(now.time());
    let due_or_end_at = (rule.mapped_kind == IntentKind::Task).then_some(occurs_at);

    ParsedIntent {
        kind: rule.mapped_kind,
        title: classify::clean_title(raw, normalized, &local.consumed),
        occurs_at,
        due_or_end_at,
        amount,
        direction,
        category,
        tags: tags::infer_tags(normalized),
        confidence_notes,
        source: ParseSource::SmartRule,
    }
}
