//! Daily budget for assisted parsing.
//!
//! Reservations are taken before the chat call and given back when the
//! call fails, so only completions that actually produced a record count
//! against the day. All arithmetic happens inside single SQLite UPDATEs;
//! the governor itself holds no mutable state and can be shared freely
//! across threads and connections.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::repository::{
    decrement_usage, read_usage_count, start_usage_day, try_increment_usage,
};
use crate::db::DatabaseError;
use crate::models::UsageSnapshot;

#[derive(Debug, Clone, Copy)]
pub struct QuotaGovernor {
    limit: u32,
}

/// Outcome of asking for one unit of the day's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Allowed(UsageSnapshot),
    Exhausted(UsageSnapshot),
}

impl QuotaGovernor {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Try to take one unit for `day`. The common path is a plain
    /// compare-and-increment; when that misses the row is either absent
    /// or stale, so the rollover insert runs, and one retry covers the
    /// case where a concurrent writer won the rollover first.
    pub fn try_reserve(
        &self,
        conn: &Connection,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Reservation, DatabaseError> {
        if self.limit == 0 {
            return Ok(Reservation::Exhausted(self.snapshot_with(0, day)));
        }

        if try_increment_usage(conn, user_id, day, self.limit)? {
            return Ok(Reservation::Allowed(self.usage_snapshot(conn, user_id, day)?));
        }

        if start_usage_day(conn, user_id, day)? {
            tracing::debug!(user_id, %day, "Opened usage counter for new day");
            return Ok(Reservation::Allowed(self.snapshot_with(1, day)));
        }

        // Another writer rolled the day over between the two statements.
        if try_increment_usage(conn, user_id, day, self.limit)? {
            return Ok(Reservation::Allowed(self.usage_snapshot(conn, user_id, day)?));
        }

        let snapshot = self.usage_snapshot(conn, user_id, day)?;
        tracing::info!(user_id, count = snapshot.count, "Daily AI quota exhausted");
        Ok(Reservation::Exhausted(snapshot))
    }

    /// Return a unit after a failed attempt. Best effort: a release that
    /// races a day rollover is silently dropped by the guard.
    pub fn release(
        &self,
        conn: &Connection,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<(), DatabaseError> {
        if decrement_usage(conn, user_id, day)? {
            tracing::debug!(user_id, "Released one AI quota unit");
        }
        Ok(())
    }

    pub fn usage_snapshot(
        &self,
        conn: &Connection,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<UsageSnapshot, DatabaseError> {
        Ok(self.snapshot_with(read_usage_count(conn, user_id, day)?, day))
    }

    fn snapshot_with(&self, count: u32, day: NaiveDate) -> UsageSnapshot {
        UsageSnapshot {
            day,
            count,
            limit: self.limit,
        }
    }
}
