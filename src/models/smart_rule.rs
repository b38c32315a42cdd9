use super::enums::IntentKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartRule {
    pub id: Uuid,
    pub user_id: String,
    pub keyword: String,
    pub mapped_kind: IntentKind,
    pub mapped_category: Option<String>,
    pub created_at: NaiveDateTime,
}
