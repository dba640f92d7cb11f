//! Raw transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewRawTransaction, RawTransaction};

/// A year-month that has stored transaction data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementMonth {
    pub year: i32,
    pub month: u32,
}

impl Database {
    /// Insert a raw transaction (skips duplicates based on import_hash)
    ///
    /// Returns the new row id, or None when the transaction was already
    /// stored by a previous upload of the same statement.
    pub fn insert_raw_transaction(&self, tx: &NewRawTransaction) -> Result<Option<i64>> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM raw_transactions WHERE import_hash = ?",
                params![tx.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO raw_transactions (transaction_number, date, account, amount, subcategory, memo, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.transaction_number,
                tx.date.to_string(),
                tx.account,
                tx.amount,
                tx.subcategory,
                tx.memo,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Insert a parsed statement batch, returning (inserted, skipped) counts
    pub fn insert_raw_transactions(&self, txs: &[NewRawTransaction]) -> Result<(usize, usize)> {
        let mut inserted = 0;
        let mut skipped = 0;

        for tx in txs {
            match self.insert_raw_transaction(tx)? {
                Some(_) => inserted += 1,
                None => skipped += 1,
            }
        }

        debug!(inserted, skipped, "Stored statement batch");
        Ok((inserted, skipped))
    }

    /// List raw transactions, newest first
    pub fn list_raw_transactions(&self, limit: Option<i64>) -> Result<Vec<RawTransaction>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(-1); // SQLite: negative limit = no limit

        let mut stmt = conn.prepare(
            r#"
            SELECT id, transaction_number, date, account, amount, subcategory, override_subcategory, memo, import_hash, created_at
            FROM raw_transactions
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let transactions = stmt
            .query_map(params![limit], Self::row_to_raw_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single raw transaction by ID
    pub fn get_raw_transaction(&self, id: i64) -> Result<Option<RawTransaction>> {
        let conn = self.conn()?;

        let tx = conn
            .query_row(
                r#"
                SELECT id, transaction_number, date, account, amount, subcategory, override_subcategory, memo, import_hash, created_at
                FROM raw_transactions
                WHERE id = ?
                "#,
                params![id],
                Self::row_to_raw_transaction,
            )
            .optional()?;

        Ok(tx)
    }

    /// List raw transactions within an inclusive date range, oldest first
    pub fn raw_transactions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawTransaction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, transaction_number, date, account, amount, subcategory, override_subcategory, memo, import_hash, created_at
            FROM raw_transactions
            WHERE date >= ? AND date <= ?
            ORDER BY date ASC, id ASC
            "#,
        )?;

        let transactions = stmt
            .query_map(
                params![start.to_string(), end.to_string()],
                Self::row_to_raw_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// List raw transactions for a calendar month
    pub fn raw_transactions_by_month(&self, year: i32, month: u32) -> Result<Vec<RawTransaction>> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }

        let conn = self.conn()?;
        let month_key = format!("{:04}-{:02}", year, month);

        let mut stmt = conn.prepare(
            r#"
            SELECT id, transaction_number, date, account, amount, subcategory, override_subcategory, memo, import_hash, created_at
            FROM raw_transactions
            WHERE strftime('%Y-%m', date) = ?
            ORDER BY date ASC, id ASC
            "#,
        )?;

        let transactions = stmt
            .query_map(params![month_key], Self::row_to_raw_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Distinct year-months with stored data, newest first
    pub fn available_months(&self) -> Result<Vec<StatementMonth>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT strftime('%Y', date) AS year, strftime('%m', date) AS month
            FROM raw_transactions
            ORDER BY year DESC, month DESC
            "#,
        )?;

        let months = stmt
            .query_map([], |row| {
                let year: String = row.get(0)?;
                let month: String = row.get(1)?;
                Ok((year, month))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(months
            .into_iter()
            .filter_map(|(y, m)| {
                Some(StatementMonth {
                    year: y.parse().ok()?,
                    month: m.parse().ok()?,
                })
            })
            .collect())
    }

    /// Set or clear a transaction's override subcategory.
    ///
    /// This is the one mutation a stored transaction supports; the classifier
    /// reads the override on every subsequent pass.
    pub fn set_override_subcategory(
        &self,
        id: i64,
        override_subcategory: Option<&str>,
    ) -> Result<RawTransaction> {
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE raw_transactions SET override_subcategory = ? WHERE id = ?",
            params![override_subcategory, id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {} not found", id)));
        }

        drop(conn);
        self.get_raw_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {} not found", id)))
    }

    /// Count stored raw transactions
    pub fn count_raw_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM raw_transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub(crate) fn row_to_raw_transaction(row: &rusqlite::Row) -> rusqlite::Result<RawTransaction> {
        let date_str: String = row.get(2)?;
        let created_at_str: String = row.get(9)?;
        Ok(RawTransaction {
            id: row.get(0)?,
            transaction_number: row.get(1)?,
            date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            account: row.get(3)?,
            amount: row.get(4)?,
            subcategory: row.get(5)?,
            override_subcategory: row.get(6)?,
            memo: row.get(7)?,
            import_hash: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
