use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Point-in-time view of one user's daily AI budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub day: NaiveDate,
    pub count: u32,
    pub limit: u32,
}

impl UsageSnapshot {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.limit
    }
}
