use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Atomically take one unit of the day's budget. Returns false when the
/// counter row is missing, carries another day, or already sits at the
/// limit. The compare-and-increment runs inside a single UPDATE so two
/// concurrent callers can never both take the last unit.
pub fn try_increment_usage(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
    limit: u32,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE usage_counters
         SET count = count + 1, updated_at = datetime('now')
         WHERE user_id = ?1 AND day = ?2 AND count < ?3",
        params![user_id, day.format(DAY_FORMAT).to_string(), limit],
    )?;
    Ok(changed > 0)
}

/// Open the counter for a new day with one unit already taken. Returns
/// false when a row for the same day already exists, i.e. another writer
/// won the rollover race and this caller must retry the increment.
pub fn start_usage_day(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "INSERT INTO usage_counters (user_id, day, count) VALUES (?1, ?2, 1)
         ON CONFLICT(user_id) DO UPDATE SET
             day = excluded.day, count = 1, updated_at = datetime('now')
         WHERE usage_counters.day <> excluded.day",
        params![user_id, day.format(DAY_FORMAT).to_string()],
    )?;
    Ok(changed > 0)
}

/// Give one unit back after a failed AI attempt. The guard keeps the
/// count from going below zero and skips rows from another day.
pub fn decrement_usage(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE usage_counters
         SET count = count - 1, updated_at = datetime('now')
         WHERE user_id = ?1 AND day = ?2 AND count > 0",
        params![user_id, day.format(DAY_FORMAT).to_string()],
    )?;
    Ok(changed > 0)
}

/// Units consumed on the given day. A missing row or a row carrying a
/// different day both read as zero.
pub fn read_usage_count(
    conn: &Connection,
    user_id: &str,
    day: NaiveDate,
) -> Result<u32, DatabaseError> {
    let result = conn.query_row(
        "SELECT count FROM usage_counters WHERE user_id = ?1 AND day = ?2",
        params![user_id, day.format(DAY_FORMAT).to_string()],
        |row| row.get::<_, u32>(0),
    );

    match result {
        Ok(count) => Ok(count),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}
