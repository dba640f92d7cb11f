//! Balance snapshot and overdraft limit operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{BalanceSnapshot, OverdraftLimit};

impl Database {
    /// Record a balance snapshot; `recorded_at` defaults to now
    pub fn add_balance_snapshot(
        &self,
        name: &str,
        amount: f64,
        recorded_at: Option<DateTime<Utc>>,
    ) -> Result<BalanceSnapshot> {
        let recorded_at = recorded_at.unwrap_or_else(Utc::now);
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO balances (name, amount, recorded_at) VALUES (?, ?, ?)",
            params![name, amount, format_datetime(&recorded_at)],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_balance_snapshot(id)?
            .ok_or_else(|| Error::NotFound(format!("Balance snapshot {} not found", id)))
    }

    fn get_balance_snapshot(&self, id: i64) -> Result<Option<BalanceSnapshot>> {
        let conn = self.conn()?;
        let snapshot = conn
            .query_row(
                "SELECT id, name, amount, recorded_at, created_at FROM balances WHERE id = ?",
                params![id],
                Self::row_to_balance_snapshot,
            )
            .optional()?;
        Ok(snapshot)
    }

    /// List balance snapshots, most recently recorded first
    pub fn list_balance_snapshots(&self, limit: Option<i64>) -> Result<Vec<BalanceSnapshot>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(-1);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, amount, recorded_at, created_at
            FROM balances
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let snapshots = stmt
            .query_map(params![limit], Self::row_to_balance_snapshot)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    /// The most recently recorded balance snapshot, if any
    pub fn latest_balance_snapshot(&self) -> Result<Option<BalanceSnapshot>> {
        Ok(self.list_balance_snapshots(Some(1))?.into_iter().next())
    }

    /// Record an overdraft limit; `recorded_at` defaults to now
    pub fn add_overdraft_limit(
        &self,
        amount: f64,
        recorded_at: Option<DateTime<Utc>>,
    ) -> Result<OverdraftLimit> {
        let recorded_at = recorded_at.unwrap_or_else(Utc::now);
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO overdrafts (amount, recorded_at) VALUES (?, ?)",
            params![amount, format_datetime(&recorded_at)],
        )?;

        let id = conn.last_insert_rowid();

        let limit = conn
            .query_row(
                "SELECT id, amount, recorded_at, created_at FROM overdrafts WHERE id = ?",
                params![id],
                Self::row_to_overdraft_limit,
            )
            .optional()?;

        limit.ok_or_else(|| Error::NotFound(format!("Overdraft record {} not found", id)))
    }

    /// List overdraft limits, most recently recorded first
    pub fn list_overdraft_limits(&self, limit: Option<i64>) -> Result<Vec<OverdraftLimit>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(-1);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, amount, recorded_at, created_at
            FROM overdrafts
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let limits = stmt
            .query_map(params![limit], Self::row_to_overdraft_limit)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(limits)
    }

    /// The most recently recorded overdraft limit, if any
    pub fn latest_overdraft_limit(&self) -> Result<Option<OverdraftLimit>> {
        Ok(self.list_overdraft_limits(Some(1))?.into_iter().next())
    }

    fn row_to_balance_snapshot(row: &rusqlite::Row) -> rusqlite::Result<BalanceSnapshot> {
        let recorded_at_str: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;
        Ok(BalanceSnapshot {
            id: row.get(0)?,
            name: row.get(1)?,
            amount: row.get(2)?,
            recorded_at: parse_datetime(&recorded_at_str),
            created_at: parse_datetime(&created_at_str),
        })
    }

    fn row_to_overdraft_limit(row: &rusqlite::Row) -> rusqlite::Result<OverdraftLimit> {
        let recorded_at_str: String = row.get(2)?;
        let created_at_str: String = row.get(3)?;
        Ok(OverdraftLimit {
            id: row.get(0)?,
            amount: row.get(1)?,
            recorded_at: parse_datetime(&recorded_at_str),
            created_at: parse_datetime(&created_at_str),
        })
    }
}

/// Format a DateTime the way SQLite stores CURRENT_TIMESTAMP
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
