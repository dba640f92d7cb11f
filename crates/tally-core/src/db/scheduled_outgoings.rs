//! Scheduled outgoing operations

use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use tracing::info;

use super::{parse_datetime, Database};
use crate::dedupe;
use crate::error::{Error, Result};
use crate::models::{DedupeReport, NewScheduledOutgoing, ScheduledOutgoing};

/// Partial update for a scheduled outgoing; None fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduledOutgoingUpdate {
    pub day_of_month: Option<u32>,
    pub amount: Option<f64>,
    pub merchant: Option<String>,
    pub memo: Option<String>,
    pub subcategory: Option<String>,
}

impl ScheduledOutgoingUpdate {
    pub fn is_empty(&self) -> bool {
        self.day_of_month.is_none()
            && self.amount.is_none()
            && self.merchant.is_none()
            && self.memo.is_none()
            && self.subcategory.is_none()
    }
}

fn validate_day_of_month(day: u32) -> Result<()> {
    if !(1..=31).contains(&day) {
        return Err(Error::InvalidData(format!(
            "day_of_month must be between 1 and 31, got {}",
            day
        )));
    }
    Ok(())
}

impl Database {
    /// Create a scheduled outgoing
    pub fn insert_scheduled_outgoing(
        &self,
        outgoing: &NewScheduledOutgoing,
    ) -> Result<ScheduledOutgoing> {
        validate_day_of_month(outgoing.day_of_month)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO scheduled_outgoings (day_of_month, amount, merchant, memo, subcategory, account)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                outgoing.day_of_month,
                outgoing.amount,
                outgoing.merchant,
                outgoing.memo,
                outgoing.subcategory,
                outgoing.account,
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_scheduled_outgoing(id)?
            .ok_or_else(|| Error::NotFound(format!("Scheduled outgoing {} not found", id)))
    }

    /// List scheduled outgoings, optionally filtered by merchant
    pub fn list_scheduled_outgoings(
        &self,
        merchant: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<ScheduledOutgoing>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(-1);

        let outgoings = if let Some(merchant) = merchant {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, day_of_month, amount, merchant, memo, subcategory, account, created_at
                FROM scheduled_outgoings
                WHERE merchant LIKE ? COLLATE NOCASE
                ORDER BY day_of_month ASC, id ASC
                LIMIT ?
                "#,
            )?;
            let pattern = format!("%{}%", merchant.trim());
            let rows = stmt
                .query_map(params![pattern, limit], Self::row_to_scheduled_outgoing)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, day_of_month, amount, merchant, memo, subcategory, account, created_at
                FROM scheduled_outgoings
                ORDER BY day_of_month ASC, id ASC
                LIMIT ?
                "#,
            )?;
            let rows = stmt
                .query_map(params![limit], Self::row_to_scheduled_outgoing)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        };

        Ok(outgoings)
    }

    /// Get a single scheduled outgoing by ID
    pub fn get_scheduled_outgoing(&self, id: i64) -> Result<Option<ScheduledOutgoing>> {
        let conn = self.conn()?;

        let outgoing = conn
            .query_row(
                r#"
                SELECT id, day_of_month, amount, merchant, memo, subcategory, account, created_at
                FROM scheduled_outgoings
                WHERE id = ?
                "#,
                params![id],
                Self::row_to_scheduled_outgoing,
            )
            .optional()?;

        Ok(outgoing)
    }

    /// Apply a partial update to a scheduled outgoing
    pub fn update_scheduled_outgoing(
        &self,
        id: i64,
        update: &ScheduledOutgoingUpdate,
    ) -> Result<ScheduledOutgoing> {
        if update.is_empty() {
            return Err(Error::InvalidData("No fields to update provided".into()));
        }
        if let Some(day) = update.day_of_month {
            validate_day_of_month(day)?;
        }

        let existing = self
            .get_scheduled_outgoing(id)?
            .ok_or_else(|| Error::NotFound(format!("Scheduled outgoing {} not found", id)))?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE scheduled_outgoings
            SET day_of_month = ?, amount = ?, merchant = ?, memo = ?, subcategory = ?
            WHERE id = ?
            "#,
            params![
                update.day_of_month.unwrap_or(existing.day_of_month),
                update.amount.unwrap_or(existing.amount),
                update.merchant.as_ref().unwrap_or(&existing.merchant),
                update.memo.as_ref().unwrap_or(&existing.memo),
                update.subcategory.as_ref().unwrap_or(&existing.subcategory),
                id,
            ],
        )?;
        drop(conn);

        self.get_scheduled_outgoing(id)?
            .ok_or_else(|| Error::NotFound(format!("Scheduled outgoing {} not found", id)))
    }

    /// Delete a scheduled outgoing; returns false when it did not exist
    pub fn delete_scheduled_outgoing(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM scheduled_outgoings WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Run the duplicate resolver over all scheduled outgoings.
    ///
    /// The planned removals are applied inside a single transaction: either
    /// the whole batch is deleted or, on any failure, none of it is.
    pub fn remove_duplicate_outgoings(&self) -> Result<DedupeReport> {
        let outgoings = self.list_scheduled_outgoings(None, None)?;

        if outgoings.is_empty() {
            return Ok(DedupeReport {
                removed: Vec::new(),
                count: 0,
                message: "No outgoings to analyze".to_string(),
            });
        }

        let plan = dedupe::plan_removals(&outgoings);

        if !plan.removed.is_empty() {
            let mut conn = self.conn()?;
            let tx = conn.transaction()?;
            for removed in &plan.removed {
                let deleted =
                    tx.execute("DELETE FROM scheduled_outgoings WHERE id = ?", params![removed.id])?;
                if deleted == 0 {
                    // Row vanished underneath us; abort the whole batch
                    return Err(Error::NotFound(format!(
                        "Scheduled outgoing {} not found during de-duplication",
                        removed.id
                    )));
                }
            }
            tx.commit()?;
        }

        let count = plan.removed.len();
        info!(removed = count, "De-duplicated scheduled outgoings");

        Ok(DedupeReport {
            message: format!("Removed {} duplicate/cheaper outgoing(s)", count),
            removed: plan.removed,
            count,
        })
    }

    /// Count scheduled outgoings
    pub fn count_scheduled_outgoings(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM scheduled_outgoings", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    fn row_to_scheduled_outgoing(row: &rusqlite::Row) -> rusqlite::Result<ScheduledOutgoing> {
        let created_at_str: String = row.get(7)?;
        Ok(ScheduledOutgoing {
            id: row.get(0)?,
            day_of_month: row.get(1)?,
            amount: row.get(2)?,
            merchant: row.get(3)?,
            memo: row.get(4)?,
            subcategory: row.get(5)?,
            account: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
