use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{DatabaseError, RuleError};
use crate::models::enums::IntentKind;
use crate::models::SmartRule;
use crate::pipeline::normalize::normalize;

/// Insert or update a smart rule keyed by its normalized keyword.
///
/// Keywords are globally unique across users. Writing a keyword owned by
/// another user fails with `RuleError::OwnershipConflict` and leaves the
/// existing row untouched. Re-writing your own keyword updates the mapped
/// kind and category in place.
pub fn upsert_rule(
    conn: &Connection,
    user_id: &str,
    keyword: &str,
    mapped_kind: &IntentKind,
    mapped_category: Option<&str>,
) -> Result<SmartRule, RuleError> {
    let normalized = normalize(keyword);
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Err(RuleError::EmptyKeyword);
    }

    let id = Uuid::new_v4();
    let changed = conn.execute(
        "INSERT INTO smart_rules (id, user_id, keyword, mapped_kind, mapped_category)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(keyword) DO UPDATE SET
             mapped_kind = excluded.mapped_kind,
             mapped_category = excluded.mapped_category
         WHERE smart_rules.user_id = excluded.user_id",
        params![
            id.to_string(),
            user_id,
            normalized,
            mapped_kind.as_str(),
            mapped_category
        ],
    )?;
    if changed == 0 {
        return Err(RuleError::OwnershipConflict {
            keyword: normalized.to_string(),
        });
    }

    get_rule_by_keyword(conn, normalized)?.ok_or_else(|| {
        RuleError::Database(DatabaseError::ConstraintViolation(format!(
            "smart rule missing after upsert: {normalized}"
        )))
    })
}

/// Look up a rule by its stored (normalized) keyword.
pub fn get_rule_by_keyword(
    conn: &Connection,
    keyword: &str,
) -> Result<Option<SmartRule>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, user_id, keyword, mapped_kind, mapped_category, created_at
         FROM smart_rules WHERE keyword = ?1",
        params![keyword],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
            ))
        },
    );

    match result {
        Ok(row) => Ok(Some(rule_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find the user's rule whose keyword appears inside the normalized input.
/// The longest matching keyword wins; ties break on the smaller id so the
/// result is stable across calls.
pub fn find_rule_match(
    conn: &Connection,
    user_id: &str,
    normalized_input: &str,
) -> Result<Option<SmartRule>, DatabaseError> {
    let mut best: Option<(usize, SmartRule)> = None;

    for rule in list_rules(conn, user_id)? {
        // Keywords are stored normalized, but normalize again in case a
        // row predates normalization at write time.
        let keyword = normalize(&rule.keyword);
        let keyword = keyword.trim();
        if keyword.is_empty() || !normalized_input.contains(keyword) {
            continue;
        }

        let len = keyword.len();
        let replace = match &best {
            None => true,
            Some((best_len, best_rule)) => {
                len > *best_len || (len == *best_len && rule.id < best_rule.id)
            }
        };
        if replace {
            best = Some((len, rule));
        }
    }

    Ok(best.map(|(_, rule)| rule))
}

pub fn list_rules(conn: &Connection, user_id: &str) -> Result<Vec<SmartRule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, keyword, mapped_kind, mapped_category, created_at
         FROM smart_rules WHERE user_id = ?1 ORDER BY keyword",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    rule_rows_to_vec(rows)
}

/// Delete a rule owned by the given user. Returns false when the rule does
/// not exist or belongs to someone else.
pub fn delete_rule(
    conn: &Connection,
    user_id: &str,
    rule_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM smart_rules WHERE id = ?1 AND user_id = ?2",
        params![rule_id.to_string(), user_id],
    )?;
    Ok(changed > 0)
}

type RuleRow = (String, String, String, String, Option<String>, String);

fn rule_from_row(row: RuleRow) -> Result<SmartRule, DatabaseError> {
    let (id, user_id, keyword, mapped_kind, mapped_category, created_at) = row;
    Ok(SmartRule {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id,
        keyword,
        mapped_kind: mapped_kind.parse()?,
        mapped_category,
        created_at: NaiveDateTime::parse_from_str(&created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}

fn rule_rows_to_vec(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<RuleRow>>,
) -> Result<Vec<SmartRule>, DatabaseError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(rule_from_row(row?)?);
    }
    Ok(result)
}
